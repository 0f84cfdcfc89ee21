//! Entities - objects with identity inside a game

mod proposal;
mod quantity;
mod rule;

pub use proposal::{Proposal, ProposalStatus, VoteAction, VoteType, Votes};
pub use quantity::{Quantity, QuantityRecord};
pub use rule::{Rule, RuleRecord};
