//! Nomic domain: proposals, rules, quantities and the invariants tying them together.
//!
//! This crate is synchronous and free of I/O. The engine crate wraps these
//! types in a lock and persists them.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod ids;
pub mod player_dict;
pub mod snapshot;
pub mod value_objects;

pub use aggregates::{ProposalList, QuantityRegistry, RuleIssueKind, RuleLoadIssue, RuleTree};
pub use entities::{
    Proposal, ProposalStatus, Quantity, QuantityRecord, Rule, RuleRecord, VoteAction, VoteType,
    Votes,
};
pub use error::DomainError;
pub use ids::{ChannelId, GuildId, MessageId, PlayerId};
pub use player_dict::PlayerDict;
pub use snapshot::{ChannelBindings, GameFlags, GameSnapshot};
pub use value_objects::{Amount, QuantityName, RuleTag};
