//! Error type for game operations.

use nomic_domain::DomainError;

use crate::infrastructure::ports::{MessagingError, RepoError};

/// Errors surfaced by operations on a locked game.
///
/// `Domain` and `Unauthorized` are raised before anything is mutated and can
/// be shown to the user. `NotLocked` means a caller bypassed the lock.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Game is not locked by the current task")]
    NotLocked,
    #[error("No {0} channel is configured")]
    ChannelNotSet(&'static str),
    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl GameError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Whether the message is safe to relay to the user who issued the command.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Domain(_) | Self::Unauthorized(_) | Self::ChannelNotSet(_)
        )
    }

    /// Errors that indicate a bug in the caller rather than bad input.
    pub fn is_programming_error(&self) -> bool {
        matches!(self, Self::NotLocked)
    }
}
