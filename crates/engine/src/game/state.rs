//! In-memory game state and its conversion to and from the stored document.

use nomic_domain::{
    ChannelBindings, GameFlags, GameSnapshot, PlayerDict, PlayerId, ProposalList, Quantity,
    QuantityRegistry, Rule, RuleLoadIssue, RuleTree,
};

/// Everything a game owns. Only reachable through a `GameGuard`.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub(crate) channels: ChannelBindings,
    pub(crate) flags: GameFlags,
    pub(crate) player_activity: PlayerDict<Option<i64>>,
    pub(crate) quantities: QuantityRegistry,
    pub(crate) proposals: ProposalList,
    pub(crate) rules: RuleTree,
}

/// Problems repaired while loading a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rule_issues: Vec<RuleLoadIssue>,
    /// Proposals whose stored number did not match their position.
    pub renumbered: usize,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.rule_issues.is_empty() && self.renumbered == 0
    }
}

impl GameState {
    pub fn from_snapshot(snapshot: GameSnapshot) -> (Self, LoadReport) {
        let (rules, rule_issues) = RuleTree::load(&snapshot.rules);
        let (proposals, renumbered) = ProposalList::load(snapshot.proposals);
        let player_activity = PlayerDict::from_entries(
            snapshot
                .player_activity
                .into_iter()
                .map(|(player, ts)| (player, Some(ts))),
            None,
        );
        let state = Self {
            channels: snapshot.channels,
            flags: snapshot.flags,
            player_activity,
            quantities: QuantityRegistry::load(snapshot.quantities),
            proposals,
            rules,
        };
        (
            state,
            LoadReport {
                rule_issues,
                renumbered,
            },
        )
    }

    /// Deterministic, key-sorted document.
    pub fn export(&self) -> GameSnapshot {
        GameSnapshot {
            channels: self.channels,
            flags: self.flags,
            player_activity: self
                .player_activity
                .iter()
                .filter_map(|(player, ts)| ts.map(|ts| (player, ts)))
                .collect(),
            quantities: self.quantities.export(),
            proposals: self.proposals.export(),
            rules: self.rules.export(),
        }
    }

    pub fn channels(&self) -> ChannelBindings {
        self.channels
    }

    pub fn flags(&self) -> GameFlags {
        self.flags
    }

    pub fn proposals(&self) -> &ProposalList {
        &self.proposals
    }

    pub fn quantities(&self) -> &QuantityRegistry {
        &self.quantities
    }

    pub fn rules(&self) -> &RuleTree {
        &self.rules
    }

    /// Case-insensitive lookup by name or alias.
    pub fn get_quantity(&self, name: &str) -> Option<&Quantity> {
        self.quantities.get(name)
    }

    pub fn get_rule(&self, tag: &str) -> Option<&Rule> {
        self.rules.get(tag)
    }

    /// Unix timestamp of the player's last recorded activity.
    pub fn last_activity(&self, player: PlayerId) -> Option<i64> {
        *self.player_activity.get(player)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::from_snapshot(GameSnapshot::default()).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use nomic_domain::{Amount, RuleIssueKind, RuleRecord};

    const ALICE: PlayerId = PlayerId::new(10);

    #[test]
    fn export_reload_round_trip() {
        let mut state = GameState::default();
        state.player_activity.set(ALICE, Some(1_700_000_000));
        state.quantities.add("points", &["pts"]).unwrap();
        state
            .quantities
            .set_value("points", ALICE, Amount::Int(3))
            .unwrap();
        state.proposals.submit(
            ALICE,
            "Rename points to gold.",
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        );
        state
            .rules
            .add("root", "scoring", Some("Scoring".into()), Some("Points win.".into()))
            .unwrap();

        let (reloaded, report) = GameState::from_snapshot(state.export());
        assert!(report.is_clean());
        assert_eq!(reloaded, state);
        assert_eq!(reloaded.export(), state.export());
    }

    #[test]
    fn load_repairs_numbering_and_rules() {
        let mut proposals = ProposalList::new();
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        proposals.submit(ALICE, "one", ts);
        proposals.submit(ALICE, "two", ts);
        let mut snapshot = GameSnapshot {
            proposals: proposals.export(),
            ..GameSnapshot::default()
        };
        snapshot.proposals.remove(0);
        snapshot.rules.insert(
            "orphan".into(),
            RuleRecord {
                tag: "orphan".into(),
                parent: Some("root".into()),
                ..RuleRecord::root()
            },
        );

        let (state, report) = GameState::from_snapshot(snapshot);
        assert_eq!(report.renumbered, 1);
        assert_eq!(state.proposals.get(1).unwrap().content(), "two");
        assert_eq!(report.rule_issues.len(), 1);
        assert_eq!(report.rule_issues[0].kind, RuleIssueKind::Unreachable);
        assert!(state.get_rule("orphan").is_none());
    }

    #[test]
    fn activity_without_timestamp_is_not_exported() {
        let mut state = GameState::default();
        state.player_activity.set(ALICE, Some(5));
        state.player_activity.set(PlayerId::new(11), None);
        let exported = state.export();
        assert_eq!(exported.player_activity.len(), 1);
        assert_eq!(state.last_activity(ALICE), Some(5));
    }
}
