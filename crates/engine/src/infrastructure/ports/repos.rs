//! Persistence port for game documents.

use async_trait::async_trait;
use nomic_domain::{GameSnapshot, GuildId};

use super::error::RepoError;

/// One JSON document per guild.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameStore: Send + Sync {
    /// `None` when the guild has never been saved.
    async fn load(&self, guild: GuildId) -> Result<Option<GameSnapshot>, RepoError>;
    /// Create or replace the guild's document.
    async fn save(&self, guild: GuildId, snapshot: &GameSnapshot) -> Result<(), RepoError>;
    /// Every guild with a stored document, ascending.
    async fn guilds(&self) -> Result<Vec<GuildId>, RepoError>;
}
