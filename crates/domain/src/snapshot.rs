//! Persisted document shape of a game
//!
//! Every map is a `BTreeMap`, so serializing a snapshot always yields keys
//! in sorted order. Missing top-level keys load as their defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::{Proposal, QuantityRecord, RuleRecord};
use crate::ids::{ChannelId, PlayerId};
use crate::value_objects::RuleTag;

/// Per-game tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameFlags {
    /// Hours since last activity after which a player counts as inactive.
    pub player_activity_cutoff: u32,
    /// Hours after submission during which authors may remove their proposal.
    pub proposal_removal_grace: u32,
}

impl Default for GameFlags {
    fn default() -> Self {
        Self {
            player_activity_cutoff: 24,
            proposal_removal_grace: 6,
        }
    }
}

/// Designated channels for proposals and rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelBindings {
    pub proposals: Option<ChannelId>,
    pub rules: Option<ChannelId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    #[serde(default)]
    pub channels: ChannelBindings,
    #[serde(default)]
    pub flags: GameFlags,
    #[serde(default)]
    pub player_activity: BTreeMap<PlayerId, i64>,
    #[serde(default)]
    pub quantities: BTreeMap<String, QuantityRecord>,
    #[serde(default)]
    pub proposals: Vec<Proposal>,
    #[serde(default = "default_rules")]
    pub rules: BTreeMap<String, RuleRecord>,
}

fn default_rules() -> BTreeMap<String, RuleRecord> {
    BTreeMap::from([(RuleTag::ROOT.to_string(), RuleRecord::root())])
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            channels: ChannelBindings::default(),
            flags: GameFlags::default(),
            player_activity: BTreeMap::new(),
            quantities: BTreeMap::new(),
            proposals: Vec::new(),
            rules: default_rules(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_loads_defaults() {
        let snapshot: GameSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot, GameSnapshot::default());
        assert!(snapshot.rules.contains_key("root"));
    }

    #[test]
    fn serializes_in_key_order() {
        let json = serde_json::to_string(&GameSnapshot::default()).unwrap();
        assert!(json.starts_with(r#"{"channels":{"proposals":null,"rules":null},"flags":"#));
        assert!(json.contains(r#""player_activity":{},"quantities":{},"proposals":[],"rules":"#));
    }

    #[test]
    fn partial_flags_fill_in_defaults() {
        let flags: GameFlags = serde_json::from_str(r#"{"player_activity_cutoff": 48}"#).unwrap();
        assert_eq!(flags.player_activity_cutoff, 48);
        assert_eq!(flags.proposal_removal_grace, 6);
    }
}
