//! Ordered, contiguously numbered proposal collection

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};

use crate::entities::Proposal;
use crate::error::DomainError;
use crate::ids::PlayerId;

/// The proposals of a game, in submission order.
///
/// # Invariants
///
/// - For every `i` in `1..=len`, `get(i).n() == i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProposalList {
    proposals: Vec<Proposal>,
}

impl ProposalList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted proposals, renumbering by position.
    ///
    /// Returns the list and how many stored numbers had to be corrected.
    pub fn load(proposals: Vec<Proposal>) -> (Self, usize) {
        let mut list = Self { proposals };
        let corrected = list
            .proposals
            .iter()
            .enumerate()
            .filter(|(i, p)| p.n() as usize != i + 1)
            .count();
        list.renumber();
        (list, corrected)
    }

    /// Parse a user-supplied proposal number.
    pub fn parse_id(raw: &str) -> Result<u32, DomainError> {
        raw.trim()
            .trim_start_matches('#')
            .parse::<u32>()
            .map_err(|_| DomainError::invalid_id(format!("Invalid proposal ID: {raw:?}")))
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    pub fn has(&self, n: u32) -> bool {
        n >= 1 && (n as usize) <= self.proposals.len()
    }

    /// Proposal at 1-based position `n`.
    pub fn get(&self, n: u32) -> Option<&Proposal> {
        if self.has(n) {
            self.proposals.get(n as usize - 1)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, n: u32) -> Option<&mut Proposal> {
        if self.has(n) {
            self.proposals.get_mut(n as usize - 1)
        } else {
            None
        }
    }

    /// Validate every ID before the caller mutates anything.
    pub fn check(&self, ns: &[u32]) -> Result<(), DomainError> {
        match ns.iter().find(|n| !self.has(**n)) {
            Some(n) => Err(DomainError::not_found("proposal", n)),
            None => Ok(()),
        }
    }

    /// `min(ns)..=len`: everything whose rendering must be regenerated
    /// when any of `ns` is reposted.
    pub fn affected_range(&self, ns: &[u32]) -> Result<RangeInclusive<u32>, DomainError> {
        self.check(ns)?;
        let start = ns
            .iter()
            .min()
            .copied()
            .ok_or_else(|| DomainError::validation("No proposals specified"))?;
        Ok(start..=self.proposals.len() as u32)
    }

    /// Append a new proposal numbered `len + 1`.
    pub fn submit(
        &mut self,
        author: PlayerId,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> &mut Proposal {
        let n = self.proposals.len() as u32 + 1;
        self.proposals.push(Proposal::new(n, author, content, timestamp));
        let last = self.proposals.len() - 1;
        &mut self.proposals[last]
    }

    /// Remove the given proposals and renumber the rest.
    ///
    /// All IDs are validated first; on error nothing is removed. Returns the
    /// removed proposals in ascending order of their former numbers.
    pub fn remove(&mut self, ns: &[u32]) -> Result<Vec<Proposal>, DomainError> {
        self.check(ns)?;
        let targets: BTreeSet<u32> = ns.iter().copied().collect();
        let mut removed = Vec::with_capacity(targets.len());
        for n in targets.iter().rev() {
            removed.push(self.proposals.remove(*n as usize - 1));
        }
        removed.reverse();
        self.renumber();
        Ok(removed)
    }

    pub fn export(&self) -> Vec<Proposal> {
        self.proposals.clone()
    }

    fn renumber(&mut self) {
        for (i, proposal) in self.proposals.iter_mut().enumerate() {
            proposal.set_n(i as u32 + 1);
        }
    }
}
