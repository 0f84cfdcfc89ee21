//! Rule entity - one section of the amendable rules document

use serde::{Deserialize, Serialize};

use crate::ids::MessageId;
use crate::value_objects::RuleTag;

/// Persisted form of a rule node.
///
/// Tags are kept as raw strings so that a corrupt document can still be
/// loaded; `RuleTree::load` validates them node by node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub tag: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageId>,
}

impl RuleRecord {
    pub fn root() -> Self {
        Self {
            tag: RuleTag::ROOT.to_string(),
            title: None,
            content: None,
            parent: None,
            children: Vec::new(),
            message: None,
        }
    }
}

/// A node in the rule tree.
///
/// `parent` is a non-owning link resolved by tag through the owning
/// `RuleTree`; `children` is the ownership edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    tag: RuleTag,
    pub title: Option<String>,
    pub content: Option<String>,
    parent: Option<RuleTag>,
    children: Vec<RuleTag>,
    message: Option<MessageId>,
}

impl Rule {
    pub(crate) fn new(
        tag: RuleTag,
        title: Option<String>,
        content: Option<String>,
        parent: Option<RuleTag>,
    ) -> Self {
        Self {
            tag,
            title,
            content,
            parent,
            children: Vec::new(),
            message: None,
        }
    }

    pub(crate) fn root() -> Self {
        Self::new(RuleTag::root(), None, None, None)
    }

    #[inline]
    pub fn tag(&self) -> &RuleTag {
        &self.tag
    }

    #[inline]
    pub fn parent(&self) -> Option<&RuleTag> {
        self.parent.as_ref()
    }

    #[inline]
    pub fn children(&self) -> &[RuleTag] {
        &self.children
    }

    #[inline]
    pub fn message(&self) -> Option<MessageId> {
        self.message
    }

    pub fn is_root(&self) -> bool {
        self.tag.is_root()
    }

    pub fn set_message(&mut self, message: Option<MessageId>) {
        self.message = message;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<RuleTag> {
        &mut self.children
    }

    pub(crate) fn with_message(mut self, message: Option<MessageId>) -> Self {
        self.message = message;
        self
    }

    pub fn to_record(&self) -> RuleRecord {
        RuleRecord {
            tag: self.tag.to_string(),
            title: self.title.clone(),
            content: self.content.clone(),
            parent: self.parent.as_ref().map(|p| p.to_string()),
            children: self.children.iter().map(|c| c.to_string()).collect(),
            message: self.message,
        }
    }
}
