//! Proposal operations on a locked game.
//!
//! Each proposal owns one message in the proposals channel. Numbers shift
//! when proposals are removed, so re-rendering always runs from the first
//! affected number to the end of the list.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use chrono::Duration;
use nomic_domain::{
    ChannelId, DomainError, MessageId, PlayerId, Proposal, ProposalStatus, VoteAction, VoteType,
};

use super::{render, Actor, GameGuard};
use crate::error::GameError;
use crate::infrastructure::ports::MessagingError;

/// Outcome of [`GameGuard::refresh_proposal`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Proposals whose existing message was edited in place.
    pub refreshed: Vec<u32>,
    /// Proposals that got a new message because an earlier one was missing.
    pub reposted: Vec<u32>,
}

/// Summary data for displaying a proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalInfo {
    pub n: u32,
    pub author: PlayerId,
    pub status: ProposalStatus,
    pub age: Duration,
    pub votes_for: u64,
    pub votes_against: u64,
    pub votes_abstain: u64,
}

impl ProposalInfo {
    fn of(proposal: &Proposal, age: Duration) -> Self {
        Self {
            n: proposal.n(),
            author: proposal.author(),
            status: proposal.status(),
            age,
            votes_for: proposal.tally(VoteType::For),
            votes_against: proposal.tally(VoteType::Against),
            votes_abstain: proposal.tally(VoteType::Abstain),
        }
    }
}

impl GameGuard {
    /// Append a proposal and post it. Returns its number.
    pub async fn submit_proposal(
        &mut self,
        author: PlayerId,
        content: impl Into<String>,
    ) -> Result<u32, GameError> {
        self.game.assert_locked()?;
        let channel = self.proposals_channel()?;
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::validation("Proposal content cannot be empty").into());
        }

        let now = self.now();
        self.record_activity(author)?;
        let n = self.state.proposals.submit(author, content, now).n();
        self.save().await?;
        tracing::info!(
            guild_id = %self.game.guild_id,
            proposal = n,
            author = %author,
            "Proposal submitted"
        );

        self.repost_range(channel, n..=n).await?;
        Ok(n)
    }

    /// Cast or withdraw `voter`'s vote on proposal `n`.
    ///
    /// Only admins may change someone else's vote. A cast replaces any
    /// earlier vote by the same player.
    pub async fn vote(
        &mut self,
        n: u32,
        action: VoteAction,
        voter: PlayerId,
        agent: Actor,
        count: u32,
    ) -> Result<(), GameError> {
        self.game.assert_locked()?;
        if voter != agent.id && !agent.is_admin {
            return Err(GameError::unauthorized(
                "You don't have permission to change another player's vote",
            ));
        }
        let proposal = self
            .state
            .proposals
            .get_mut(n)
            .ok_or_else(|| DomainError::not_found("proposal", n))?;
        proposal.apply_vote(voter, action, count)?;
        self.record_activity(agent.id)?;
        self.save().await?;
        tracing::debug!(
            guild_id = %self.game.guild_id,
            proposal = n,
            voter = %voter,
            agent = %agent.id,
            action = ?action,
            count,
            "Vote recorded"
        );

        self.sync_proposals(&[n]).await?;
        Ok(())
    }

    /// Move proposals to `status`. Returns `(succeeded, failed)`, where
    /// failed proposals were already in that status.
    pub async fn set_proposal_status(
        &mut self,
        agent: Actor,
        status: ProposalStatus,
        ns: &[u32],
    ) -> Result<(Vec<u32>, Vec<u32>), GameError> {
        self.game.assert_locked()?;
        self.state.proposals.check(ns)?;

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for n in ns.iter().copied().collect::<BTreeSet<_>>() {
            let Some(proposal) = self.state.proposals.get_mut(n) else {
                continue;
            };
            if proposal.set_status(status) {
                succeeded.push(n);
            } else {
                failed.push(n);
            }
        }
        if succeeded.is_empty() {
            return Ok((succeeded, failed));
        }

        self.save().await?;
        tracing::info!(
            guild_id = %self.game.guild_id,
            agent = %agent.id,
            status = %status,
            proposals = ?succeeded,
            "Proposal status changed"
        );
        self.sync_proposals(&succeeded).await?;
        Ok((succeeded, failed))
    }

    /// Fails with `Unauthorized` unless `agent` may remove every proposal in
    /// `ns`: admins always, authors only within the removal grace period.
    pub fn authorize_removal(&self, agent: Actor, ns: &[u32]) -> Result<(), GameError> {
        self.state.proposals.check(ns)?;
        let grace = Duration::hours(i64::from(self.state.flags.proposal_removal_grace));
        let now = self.now();
        for n in ns {
            let removable = self
                .state
                .proposals
                .get(*n)
                .is_some_and(|p| p.removable_by(agent.id, agent.is_admin, now, grace));
            if !removable {
                return Err(GameError::unauthorized(format!(
                    "You don't have permission to remove proposal #{n}"
                )));
            }
        }
        Ok(())
    }

    /// Remove proposals, renumber the rest and update their messages.
    pub async fn remove_proposals(
        &mut self,
        agent: Actor,
        ns: &[u32],
        reason: Option<&str>,
    ) -> Result<Vec<Proposal>, GameError> {
        self.game.assert_locked()?;
        self.authorize_removal(agent, ns)?;

        let removed = self.state.proposals.remove(ns)?;
        self.save().await?;
        for proposal in &removed {
            tracing::info!(
                guild_id = %self.game.guild_id,
                proposal = proposal.n(),
                agent = %agent.id,
                reason = reason.unwrap_or(""),
                "Proposal removed"
            );
        }

        if let Some(channel) = self.state.channels.proposals {
            let messages: Vec<MessageId> = removed.iter().filter_map(Proposal::message).collect();
            self.delete_messages(channel, &messages).await?;
        }
        let first = removed.iter().map(Proposal::n).min().unwrap_or(1);
        let len = self.state.proposals.len() as u32;
        if first <= len {
            let shifted: Vec<u32> = (first..=len).collect();
            self.sync_proposals(&shifted).await?;
        }
        Ok(removed)
    }

    /// Re-render the given proposals' messages in place.
    ///
    /// If a message turns out to be missing, everything from that proposal
    /// to the end of the list is reposted (to keep the channel in order) and
    /// the remaining IDs are not visited.
    pub async fn refresh_proposal(&mut self, ns: &[u32]) -> Result<RefreshReport, GameError> {
        self.game.assert_locked()?;
        let channel = self.proposals_channel()?;
        self.state.proposals.check(ns)?;

        let mut report = RefreshReport::default();
        for n in ns.iter().copied().collect::<BTreeSet<_>>() {
            match self.render_proposal(channel, n).await {
                Ok(()) => report.refreshed.push(n),
                Err(GameError::Messaging(MessagingError::NotFound)) => {
                    tracing::warn!(
                        guild_id = %self.game.guild_id,
                        proposal = n,
                        "Proposal message is missing, reposting"
                    );
                    let len = self.state.proposals.len() as u32;
                    report.reposted = self.repost_range(channel, n..=len).await?;
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// Delete and re-post the messages of `min(ns)` through the last
    /// proposal. Returns the reposted numbers.
    pub async fn repost_proposal(&mut self, ns: &[u32]) -> Result<Vec<u32>, GameError> {
        self.game.assert_locked()?;
        let channel = self.proposals_channel()?;
        let range = self.state.proposals.affected_range(ns)?;
        self.repost_range(channel, range).await
    }

    /// Display data for `ns`, or for every open proposal when `ns` is empty.
    pub fn proposal_info(&self, ns: &[u32]) -> Result<Vec<ProposalInfo>, GameError> {
        let now = self.now();
        if ns.is_empty() {
            let open: Vec<_> = self
                .state
                .proposals
                .iter()
                .filter(|p| p.status() == ProposalStatus::Voting)
                .map(|p| ProposalInfo::of(p, p.age(now)))
                .collect();
            if open.is_empty() {
                return Err(DomainError::validation(
                    "There are no open proposals. Please specify at least one proposal.",
                )
                .into());
            }
            return Ok(open);
        }
        self.state.proposals.check(ns)?;
        let ns: BTreeSet<u32> = ns.iter().copied().collect();
        Ok(ns
            .into_iter()
            .filter_map(|n| self.state.proposals.get(n))
            .map(|p| ProposalInfo::of(p, p.age(now)))
            .collect())
    }

    /// Refresh when a proposals channel is bound; otherwise nothing to sync.
    async fn sync_proposals(&mut self, ns: &[u32]) -> Result<RefreshReport, GameError> {
        if self.state.channels.proposals.is_none() {
            tracing::debug!(guild_id = %self.game.guild_id, "No proposals channel, skipping refresh");
            return Ok(RefreshReport::default());
        }
        self.refresh_proposal(ns).await
    }

    /// Fetch, then rewrite the message and its vote reactions. A proposal
    /// without a message ID reports `NotFound`.
    async fn render_proposal(&self, channel: ChannelId, n: u32) -> Result<(), GameError> {
        let proposal = self
            .state
            .proposals
            .get(n)
            .ok_or_else(|| DomainError::not_found("proposal", n))?;
        let id = proposal.message().ok_or(MessagingError::NotFound)?;
        let content = render::proposal(proposal);

        let messaging = self.messaging();
        messaging.fetch(channel, id).await?;
        messaging.clear_reactions(channel, id).await?;
        messaging.edit(channel, id, &content).await?;
        for (_, emoji) in render::VOTE_REACTIONS {
            messaging.add_reaction(channel, id, emoji).await?;
        }
        Ok(())
    }

    /// Replace the messages of `range` with fresh ones, in order.
    ///
    /// Old messages are deleted first; a delete failure other than
    /// `NotFound` leaves the game untouched. If posting fails midway, the
    /// proposals posted so far keep their new IDs, the rest are left without
    /// a message, and that state is saved before the error is returned.
    async fn repost_range(
        &mut self,
        channel: ChannelId,
        range: RangeInclusive<u32>,
    ) -> Result<Vec<u32>, GameError> {
        let mut existing = Vec::new();
        for n in range.clone() {
            let Some(id) = self.state.proposals.get(n).and_then(Proposal::message) else {
                continue;
            };
            match self.messaging().fetch(channel, id).await {
                Ok(_) => existing.push(id),
                Err(MessagingError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }
        if !existing.is_empty() {
            match self.messaging().delete(channel, &existing).await {
                Ok(()) => {}
                Err(MessagingError::NotFound) => {
                    tracing::warn!(
                        guild_id = %self.game.guild_id,
                        "Some proposal messages vanished during repost"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        for n in range.clone() {
            if let Some(proposal) = self.state.proposals.get_mut(n) {
                proposal.set_message(None);
            }
        }
        for n in range.clone() {
            let placeholder = render::proposal_placeholder(n);
            match self.messaging().send(channel, &placeholder).await {
                Ok(id) => {
                    if let Some(proposal) = self.state.proposals.get_mut(n) {
                        proposal.set_message(Some(id));
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        guild_id = %self.game.guild_id,
                        proposal = n,
                        error = %e,
                        "Repost interrupted"
                    );
                    self.save().await?;
                    return Err(e.into());
                }
            }
        }
        self.save().await?;

        for n in range.clone() {
            self.render_proposal(channel, n).await?;
        }
        Ok(range.collect())
    }

    /// Delete messages one at a time, ignoring ones already gone.
    async fn delete_messages(
        &self,
        channel: ChannelId,
        messages: &[MessageId],
    ) -> Result<(), GameError> {
        for id in messages {
            match self.messaging().delete(channel, &[*id]).await {
                Ok(()) | Err(MessagingError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
