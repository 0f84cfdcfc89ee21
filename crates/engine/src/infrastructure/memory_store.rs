//! In-memory game document storage.

use std::collections::HashMap;

use async_trait::async_trait;
use nomic_domain::{GameSnapshot, GuildId};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{GameStore, RepoError};

/// Keeps serialized documents so loads never alias a live game's state.
#[derive(Default)]
pub struct InMemoryGameStore {
    documents: RwLock<HashMap<GuildId, String>>,
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored JSON, if any.
    pub async fn document(&self, guild: GuildId) -> Option<String> {
        self.documents.read().await.get(&guild).cloned()
    }
}

#[async_trait]
impl GameStore for InMemoryGameStore {
    async fn load(&self, guild: GuildId) -> Result<Option<GameSnapshot>, RepoError> {
        match self.documents.read().await.get(&guild) {
            Some(json) => serde_json::from_str(json)
                .map(Some)
                .map_err(RepoError::serialization),
            None => Ok(None),
        }
    }

    async fn save(&self, guild: GuildId, snapshot: &GameSnapshot) -> Result<(), RepoError> {
        let json = serde_json::to_string(snapshot).map_err(RepoError::serialization)?;
        self.documents.write().await.insert(guild, json);
        Ok(())
    }

    async fn guilds(&self) -> Result<Vec<GuildId>, RepoError> {
        let mut guilds: Vec<_> = self.documents.read().await.keys().copied().collect();
        guilds.sort();
        Ok(guilds)
    }
}
