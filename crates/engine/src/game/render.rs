//! Message bodies for proposals and rules.

use nomic_domain::{Proposal, ProposalStatus, Rule, VoteType};

use crate::infrastructure::ports::MessageContent;

/// Reaction added to every proposal message, one per vote type.
pub const VOTE_REACTIONS: [(VoteType, &str); 3] = [
    (VoteType::For, "👍"),
    (VoteType::Against, "👎"),
    (VoteType::Abstain, "🤷"),
];

pub fn vote_emoji(vote_type: VoteType) -> &'static str {
    match vote_type {
        VoteType::For => VOTE_REACTIONS[0].1,
        VoteType::Against => VOTE_REACTIONS[1].1,
        VoteType::Abstain => VOTE_REACTIONS[2].1,
    }
}

/// Posted first so that the proposal owns a message ID before it is rendered.
pub fn proposal_placeholder(n: u32) -> MessageContent {
    MessageContent::new(format!("Proposal #{n}"), "Preparing proposal...")
}

pub fn proposal(proposal: &Proposal) -> MessageContent {
    let status = match proposal.status() {
        ProposalStatus::Voting => "Voting in progress",
        ProposalStatus::Passed => "Passed",
        ProposalStatus::Failed => "Failed",
    };
    let tallies = VoteType::ALL
        .iter()
        .map(|t| format!("{} {}", vote_emoji(*t), proposal.tally(*t)))
        .collect::<Vec<_>>()
        .join("  ");
    MessageContent::new(
        format!("Proposal #{}", proposal.n()),
        proposal.content(),
    )
    .with_footer(format!("{status} | {tallies} | by <@{}>", proposal.author()))
}

pub fn rule(rule: &Rule) -> MessageContent {
    MessageContent::new(
        rule.title.clone().unwrap_or_else(|| rule.tag().to_string()),
        rule.content.clone().unwrap_or_default(),
    )
    .with_footer(rule.tag().as_str())
}
