//! Proposal entity - a numbered motion players vote on

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{MessageId, PlayerId};

/// Lifecycle status of a proposal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    #[default]
    Voting,
    Passed,
    Failed,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Voting => "voting",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three tallied vote kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    For,
    Against,
    Abstain,
}

impl VoteType {
    pub const ALL: [VoteType; 3] = [VoteType::For, VoteType::Against, VoteType::Abstain];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::For => "for",
            Self::Against => "against",
            Self::Abstain => "abstain",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a vote command asks for: cast a vote of some type, or withdraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Cast(VoteType),
    Remove,
}

impl FromStr for VoteAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "for" | "+" => Ok(Self::Cast(VoteType::For)),
            "against" | "-" => Ok(Self::Cast(VoteType::Against)),
            "abstain" => Ok(Self::Cast(VoteType::Abstain)),
            "remove" | "del" | "delete" | "rm" => Ok(Self::Remove),
            other => Err(DomainError::validation(format!(
                "Invalid vote type: {other:?}"
            ))),
        }
    }
}

/// Per-type vote counts. A player holds at most one vote type at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    #[serde(rename = "for", default)]
    for_: BTreeMap<PlayerId, u32>,
    #[serde(default)]
    against: BTreeMap<PlayerId, u32>,
    #[serde(default)]
    abstain: BTreeMap<PlayerId, u32>,
}

impl Votes {
    pub fn of_type(&self, vote_type: VoteType) -> &BTreeMap<PlayerId, u32> {
        match vote_type {
            VoteType::For => &self.for_,
            VoteType::Against => &self.against,
            VoteType::Abstain => &self.abstain,
        }
    }

    fn of_type_mut(&mut self, vote_type: VoteType) -> &mut BTreeMap<PlayerId, u32> {
        match vote_type {
            VoteType::For => &mut self.for_,
            VoteType::Against => &mut self.against,
            VoteType::Abstain => &mut self.abstain,
        }
    }

    /// Total count for one vote type. Widened so per-player counts of up to
    /// `u32::MAX` cannot overflow the sum.
    pub fn tally(&self, vote_type: VoteType) -> u64 {
        self.of_type(vote_type).values().copied().map(u64::from).sum()
    }

    /// The player's current vote, if any.
    pub fn vote_of(&self, player: PlayerId) -> Option<(VoteType, u32)> {
        VoteType::ALL
            .into_iter()
            .find_map(|t| self.of_type(t).get(&player).map(|count| (t, *count)))
    }

    /// Replace any existing vote by `player` with `count` votes of `vote_type`.
    /// A zero count withdraws the vote.
    pub fn cast(&mut self, player: PlayerId, vote_type: VoteType, count: u32) {
        self.withdraw(player);
        if count > 0 {
            self.of_type_mut(vote_type).insert(player, count);
        }
    }

    /// Returns true if the player had voted.
    pub fn withdraw(&mut self, player: PlayerId) -> bool {
        let mut removed = false;
        for vote_type in VoteType::ALL {
            removed |= self.of_type_mut(vote_type).remove(&player).is_some();
        }
        removed
    }
}

/// A numbered, timestamped motion.
///
/// # Invariants
///
/// - `n` is the proposal's 1-based position in its game; only
///   `ProposalList` renumbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    n: u32,
    author: PlayerId,
    #[serde(default)]
    content: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    timestamp: DateTime<Utc>,
    #[serde(default)]
    status: ProposalStatus,
    #[serde(default)]
    message: Option<MessageId>,
    #[serde(default)]
    votes: Votes,
}

impl Proposal {
    pub fn new(n: u32, author: PlayerId, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            n,
            author,
            content: content.into(),
            timestamp,
            status: ProposalStatus::Voting,
            message: None,
            votes: Votes::default(),
        }
    }

    #[inline]
    pub fn n(&self) -> u32 {
        self.n
    }

    #[inline]
    pub fn author(&self) -> PlayerId {
        self.author
    }

    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[inline]
    pub fn status(&self) -> ProposalStatus {
        self.status
    }

    #[inline]
    pub fn message(&self) -> Option<MessageId> {
        self.message
    }

    #[inline]
    pub fn votes(&self) -> &Votes {
        &self.votes
    }

    pub fn tally(&self, vote_type: VoteType) -> u64 {
        self.votes.tally(vote_type)
    }

    pub(crate) fn set_n(&mut self, n: u32) {
        self.n = n;
    }

    pub fn set_message(&mut self, message: Option<MessageId>) {
        self.message = message;
    }

    /// Returns false if the proposal already had this status.
    pub fn set_status(&mut self, status: ProposalStatus) -> bool {
        let changed = self.status != status;
        self.status = status;
        changed
    }

    /// Apply a vote action. Only open proposals accept votes.
    pub fn apply_vote(
        &mut self,
        player: PlayerId,
        action: VoteAction,
        count: u32,
    ) -> Result<(), DomainError> {
        if self.status != ProposalStatus::Voting {
            return Err(DomainError::invalid_state_transition(format!(
                "Proposal #{} is {} and no longer open for voting",
                self.n, self.status
            )));
        }
        match action {
            VoteAction::Cast(vote_type) => self.votes.cast(player, vote_type, count),
            VoteAction::Remove => {
                self.votes.withdraw(player);
            }
        }
        Ok(())
    }

    /// Age of the proposal at `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }

    /// Authors may remove their own proposal within `grace` of submission;
    /// admins may always remove.
    pub fn removable_by(
        &self,
        player: PlayerId,
        is_admin: bool,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> bool {
        is_admin || (player == self.author && self.age(now) <= grace)
    }
}
