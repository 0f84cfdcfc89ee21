//! Aggregates - the collections a game owns
//!
//! Each aggregate guards one invariant of the game state:
//! - `ProposalList`: proposal numbers are contiguous positions
//! - `RuleTree`: rules form a single well-formed tree under `root`
//! - `QuantityRegistry`: quantity names and aliases are globally unique

pub mod proposal_list;
pub mod quantity_registry;
pub mod rule_tree;

pub use proposal_list::ProposalList;
pub use quantity_registry::QuantityRegistry;
pub use rule_tree::{RuleIssueKind, RuleLoadIssue, RuleTree};
