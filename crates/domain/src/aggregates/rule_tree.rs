//! Rule tree aggregate and its best-effort loader
//!
//! Rules are stored flat (tag -> record) and reassembled into a tree rooted at
//! the sentinel `root` node. Corrupt entries are dropped one node at a time and
//! reported as [`RuleLoadIssue`]s instead of failing the whole load.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::entities::{Rule, RuleRecord};
use crate::error::DomainError;
use crate::value_objects::RuleTag;

/// Why a persisted rule record was left out of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleIssueKind {
    /// No `root` record; an empty root was created.
    MissingRoot,
    /// Referenced as a child but no record exists.
    Missing,
    /// Reached a second time (cycle, or child of several rules).
    Repeated,
    /// Tag is malformed or disagrees with its key.
    InvalidTag,
    /// Non-root rule without a parent.
    NoParent,
    /// Declared parent differs from the rule that lists it as a child.
    ParentMismatch { declared: String, actual: String },
    /// Never reached from the root.
    Unreachable,
}

/// One dropped or repaired rule record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLoadIssue {
    pub tag: String,
    pub kind: RuleIssueKind,
}

impl fmt::Display for RuleLoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = &self.tag;
        match &self.kind {
            RuleIssueKind::MissingRoot => write!(f, "No root rule found; starting from an empty root"),
            RuleIssueKind::Missing => write!(f, "No such rule found: {tag:?}"),
            RuleIssueKind::Repeated => write!(
                f,
                "Rule recursion or repetition found: {tag:?} is a child of multiple rules"
            ),
            RuleIssueKind::InvalidTag => write!(f, "Invalid rule tag: {tag:?}"),
            RuleIssueKind::NoParent => write!(
                f,
                "Rule section inconsistency found; {tag:?} is not root but has no parent"
            ),
            RuleIssueKind::ParentMismatch { declared, actual } => write!(
                f,
                "Rule section inconsistency found; {tag:?} is listed under {actual:?} but its parent is {declared:?}"
            ),
            RuleIssueKind::Unreachable => write!(f, "Rule {tag:?} is not reachable from root"),
        }
    }
}

/// A well-formed tree of rules.
///
/// # Invariants
///
/// - `root` is always present and has no parent.
/// - Every other node is reachable from root and appears exactly once in
///   its parent's `children`; there are no cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTree {
    nodes: BTreeMap<RuleTag, Rule>,
}

impl Default for RuleTree {
    fn default() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(RuleTag::root(), Rule::root());
        Self { nodes }
    }
}

impl RuleTree {
    /// Rebuild a tree from its flat persisted form.
    ///
    /// Never fails: inconsistent records are dropped along with their
    /// subtrees and described in the returned issues.
    pub fn load(records: &BTreeMap<String, RuleRecord>) -> (Self, Vec<RuleLoadIssue>) {
        let mut issues = Vec::new();
        let root_record = match records.get(RuleTag::ROOT) {
            Some(record) => record.clone(),
            None => {
                issues.push(RuleLoadIssue {
                    tag: RuleTag::ROOT.to_string(),
                    kind: RuleIssueKind::MissingRoot,
                });
                RuleRecord::root()
            }
        };
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(RuleTag::ROOT);

        let mut nodes = BTreeMap::new();
        let root = Rule::new(
            RuleTag::root(),
            root_record.title.clone(),
            root_record.content.clone(),
            None,
        )
        .with_message(root_record.message);
        nodes.insert(RuleTag::root(), root);

        // Worklist of (tag, tag of the rule that listed it), popped in preorder.
        let mut stack: Vec<(&str, RuleTag)> = root_record
            .children
            .iter()
            .rev()
            .map(|child| (child.as_str(), RuleTag::root()))
            .collect();

        while let Some((tag, parent)) = stack.pop() {
            visited.insert(tag);
            let issue = |kind| RuleLoadIssue {
                tag: tag.to_string(),
                kind,
            };
            let Some(record) = records.get(tag) else {
                issues.push(issue(RuleIssueKind::Missing));
                continue;
            };
            let rule_tag = match RuleTag::new(tag) {
                Ok(rule_tag) if record.tag == tag => rule_tag,
                _ => {
                    issues.push(issue(RuleIssueKind::InvalidTag));
                    continue;
                }
            };
            if nodes.contains_key(&rule_tag) {
                issues.push(issue(RuleIssueKind::Repeated));
                continue;
            }
            match record.parent.as_deref() {
                None => {
                    issues.push(issue(RuleIssueKind::NoParent));
                    continue;
                }
                Some(declared) if declared != parent.as_str() => {
                    issues.push(issue(RuleIssueKind::ParentMismatch {
                        declared: declared.to_string(),
                        actual: parent.to_string(),
                    }));
                    continue;
                }
                Some(_) => {}
            }
            let rule = Rule::new(
                rule_tag.clone(),
                record.title.clone(),
                record.content.clone(),
                Some(parent),
            )
            .with_message(record.message);
            nodes.insert(rule_tag.clone(), rule);
            for child in record.children.iter().rev() {
                stack.push((child.as_str(), rule_tag.clone()));
            }
        }

        for tag in records.keys() {
            if !visited.contains(tag.as_str()) {
                issues.push(RuleLoadIssue {
                    tag: tag.clone(),
                    kind: RuleIssueKind::Unreachable,
                });
            }
        }

        // Children lists keep only retained nodes that name this node as parent, once each.
        let mut children_of: Vec<(RuleTag, Vec<RuleTag>)> = Vec::with_capacity(nodes.len());
        for tag in nodes.keys() {
            let listed = if tag.is_root() {
                &root_record.children
            } else {
                match records.get(tag.as_str()) {
                    Some(record) => &record.children,
                    None => continue,
                }
            };
            let mut kept: Vec<RuleTag> = Vec::new();
            for child in listed {
                let Ok(child) = RuleTag::new(child.as_str()) else {
                    continue;
                };
                let is_own = nodes
                    .get(&child)
                    .is_some_and(|node| node.parent() == Some(tag));
                if is_own && !kept.contains(&child) {
                    kept.push(child);
                }
            }
            children_of.push((tag.clone(), kept));
        }
        for (tag, kept) in children_of {
            if let Some(node) = nodes.get_mut(&tag) {
                *node.children_mut() = kept;
            }
        }

        (Self { nodes }, issues)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn root(&self) -> &Rule {
        self.nodes
            .get(RuleTag::ROOT)
            .expect("rule tree always contains root")
    }

    pub fn get(&self, tag: &str) -> Option<&Rule> {
        self.nodes.get(tag)
    }

    pub fn get_mut(&mut self, tag: &str) -> Option<&mut Rule> {
        self.nodes.get_mut(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.nodes.contains_key(tag)
    }

    /// Validate tags (format, then existence) before any mutation.
    pub fn check(&self, tags: &[&str]) -> Result<(), DomainError> {
        for tag in tags {
            RuleTag::new(*tag)?;
            if !self.contains(tag) {
                return Err(DomainError::not_found("rule", tag));
            }
        }
        Ok(())
    }

    /// Add a new rule as the last child of `parent`.
    pub fn add(
        &mut self,
        parent: &str,
        tag: &str,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<&Rule, DomainError> {
        let tag = RuleTag::new(tag)?;
        self.check(&[parent])?;
        if self.nodes.contains_key(&tag) {
            return Err(DomainError::duplicate("Rule", tag.as_str()));
        }
        let parent_tag = RuleTag::new(parent)?;
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children_mut().push(tag.clone());
        }
        self.nodes
            .insert(tag.clone(), Rule::new(tag.clone(), title, content, Some(parent_tag)));
        Ok(&self.nodes[&tag])
    }

    /// Remove a rule and its whole subtree. Returns the removed rules in preorder.
    pub fn remove(&mut self, tag: &str) -> Result<Vec<Rule>, DomainError> {
        self.check(&[tag])?;
        if tag == RuleTag::ROOT {
            return Err(DomainError::validation("The root rule cannot be removed"));
        }
        let doomed = self.preorder_from(tag);
        let parent = self.nodes.get(tag).and_then(|rule| rule.parent().cloned());
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p.as_str())) {
            parent.children_mut().retain(|child| child.as_str() != tag);
        }
        Ok(doomed
            .iter()
            .filter_map(|t| self.nodes.remove(t.as_str()))
            .collect())
    }

    /// All tags, root first, children in document order.
    pub fn preorder(&self) -> Vec<RuleTag> {
        self.preorder_from(RuleTag::ROOT)
    }

    fn preorder_from(&self, start: &str) -> Vec<RuleTag> {
        let mut order = Vec::new();
        let mut stack: Vec<&RuleTag> = match self.nodes.get_key_value(start) {
            Some((tag, _)) => vec![tag],
            None => return order,
        };
        while let Some(tag) = stack.pop() {
            order.push(tag.clone());
            if let Some(rule) = self.nodes.get(tag) {
                stack.extend(rule.children().iter().rev());
            }
        }
        order
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.nodes.values()
    }

    /// Flat persisted form, sorted by tag.
    pub fn export(&self) -> BTreeMap<String, RuleRecord> {
        self.nodes
            .iter()
            .map(|(tag, rule)| (tag.to_string(), rule.to_record()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: &str, parent: Option<&str>, children: &[&str]) -> (String, RuleRecord) {
        (
            tag.to_string(),
            RuleRecord {
                tag: tag.to_string(),
                title: Some(format!("{tag} title")),
                content: None,
                parent: parent.map(str::to_string),
                children: children.iter().map(|c| c.to_string()).collect(),
                message: None,
            },
        )
    }

    fn tags(tree: &RuleTree) -> Vec<String> {
        tree.preorder().into_iter().map(String::from).collect()
    }

    fn assert_well_formed(tree: &RuleTree) {
        let reachable = tree.preorder();
        assert_eq!(reachable.len(), tree.len(), "every node reachable from root");
        for rule in tree.iter() {
            if rule.is_root() {
                assert!(rule.parent().is_none());
                continue;
            }
            let parent = tree.get(rule.parent().unwrap().as_str()).unwrap();
            let appearances = parent
                .children()
                .iter()
                .filter(|c| *c == rule.tag())
                .count();
            assert_eq!(appearances, 1);
        }
    }

    #[test]
    fn loads_consistent_tree_in_document_order() {
        let records = BTreeMap::from([
            record("root", None, &["voting", "scoring"]),
            record("voting", Some("root"), &["quorum"]),
            record("quorum", Some("voting"), &[]),
            record("scoring", Some("root"), &[]),
        ]);
        let (tree, issues) = RuleTree::load(&records);
        assert!(issues.is_empty(), "{issues:?}");
        assert_eq!(tags(&tree), vec!["root", "voting", "quorum", "scoring"]);
        assert_well_formed(&tree);
    }

    #[test]
    fn missing_root_starts_empty() {
        let (tree, issues) = RuleTree::load(&BTreeMap::new());
        assert_eq!(tree.len(), 1);
        assert_eq!(issues[0].kind, RuleIssueKind::MissingRoot);
    }

    #[test]
    fn cycle_is_broken_without_recursion() {
        let records = BTreeMap::from([
            record("root", None, &["alpha"]),
            record("alpha", Some("root"), &["beta"]),
            record("beta", Some("alpha"), &["alpha"]),
        ]);
        let (tree, issues) = RuleTree::load(&records);
        assert_eq!(tags(&tree), vec!["root", "alpha", "beta"]);
        assert!(tree.get("beta").unwrap().children().is_empty());
        assert!(issues
            .iter()
            .any(|i| i.tag == "alpha" && i.kind == RuleIssueKind::Repeated));
        assert_well_formed(&tree);
    }

    #[test]
    fn parent_mismatch_drops_subtree() {
        let records = BTreeMap::from([
            record("root", None, &["alpha", "beta"]),
            record("alpha", Some("root"), &["gamma"]),
            record("beta", Some("root"), &[]),
            record("gamma", Some("beta"), &["delta"]),
            record("delta", Some("gamma"), &[]),
        ]);
        let (tree, issues) = RuleTree::load(&records);
        assert!(!tree.contains("gamma"));
        assert!(!tree.contains("delta"));
        assert!(tree.get("alpha").unwrap().children().is_empty());
        assert!(issues.iter().any(|i| i.tag == "gamma"
            && matches!(i.kind, RuleIssueKind::ParentMismatch { .. })));
        assert!(issues
            .iter()
            .any(|i| i.tag == "delta" && i.kind == RuleIssueKind::Unreachable));
        assert_well_formed(&tree);
    }

    #[test]
    fn multi_parent_keeps_declared_parent_only() {
        let records = BTreeMap::from([
            record("root", None, &["alpha", "beta"]),
            record("alpha", Some("root"), &["shared"]),
            record("beta", Some("root"), &["shared"]),
            record("shared", Some("beta"), &[]),
        ]);
        let (tree, _) = RuleTree::load(&records);
        assert_eq!(
            tree.get("shared").unwrap().parent().map(|p| p.as_str()),
            Some("beta")
        );
        assert!(tree.get("alpha").unwrap().children().is_empty());
        assert_well_formed(&tree);
    }

    #[test]
    fn missing_child_and_orphan_parent_are_dropped() {
        let records = BTreeMap::from([
            record("root", None, &["ghost", "lonely", "bad-Tag"]),
            record("lonely", None, &[]),
            record("bad-Tag", Some("root"), &[]),
        ]);
        let (tree, issues) = RuleTree::load(&records);
        assert_eq!(tree.len(), 1);
        assert!(tree.root().children().is_empty());
        let kinds: Vec<_> = issues.iter().map(|i| (i.tag.as_str(), &i.kind)).collect();
        assert!(kinds.contains(&("ghost", &RuleIssueKind::Missing)));
        assert!(kinds.contains(&("lonely", &RuleIssueKind::NoParent)));
        assert!(kinds.contains(&("bad-Tag", &RuleIssueKind::InvalidTag)));
    }

    #[test]
    fn duplicate_child_entry_is_listed_once() {
        let records = BTreeMap::from([
            record("root", None, &["alpha", "alpha"]),
            record("alpha", Some("root"), &[]),
        ]);
        let (tree, issues) = RuleTree::load(&records);
        assert_eq!(tree.root().children().len(), 1);
        assert_eq!(issues.len(), 1);
        assert_well_formed(&tree);
    }

    #[test]
    fn export_then_load_round_trips() {
        let mut tree = RuleTree::default();
        tree.add("root", "voting", Some("Voting".into()), None).unwrap();
        tree.add("voting", "quorum", None, Some("Half".into())).unwrap();
        tree.add("root", "scoring", None, None).unwrap();
        let (back, issues) = RuleTree::load(&tree.export());
        assert!(issues.is_empty());
        assert_eq!(back, tree);
    }

    #[test]
    fn add_validates_tag_parent_and_uniqueness() {
        let mut tree = RuleTree::default();
        assert!(matches!(
            tree.add("root", "Bad Tag", None, None),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            tree.add("nowhere", "voting", None, None),
            Err(DomainError::NotFound { .. })
        ));
        tree.add("root", "voting", None, None).unwrap();
        assert!(matches!(
            tree.add("root", "voting", None, None),
            Err(DomainError::Duplicate { .. })
        ));
    }

    #[test]
    fn remove_takes_whole_subtree() {
        let mut tree = RuleTree::default();
        tree.add("root", "voting", None, None).unwrap();
        tree.add("voting", "quorum", None, None).unwrap();
        tree.add("root", "scoring", None, None).unwrap();
        let removed = tree.remove("voting").unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(tags(&tree), vec!["root", "scoring"]);
        assert!(tree.remove("root").is_err());
        assert_well_formed(&tree);
    }
}
