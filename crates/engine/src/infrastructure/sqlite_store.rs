//! SQLite-backed game document storage.

use async_trait::async_trait;
use nomic_domain::{GameSnapshot, GuildId};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::infrastructure::ports::{ClockPort, GameStore, RepoError};

/// Stores each guild's game as one JSON document.
///
/// Guild IDs are kept as text: snowflakes use the full `u64` range and
/// SQLite integers are signed.
pub struct SqliteGameStore {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteGameStore {
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("game_documents", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS game_documents (
                guild_id TEXT PRIMARY KEY NOT NULL,
                document_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("game_documents", e))?;

        Ok(Self { pool, clock })
    }
}

#[async_trait]
impl GameStore for SqliteGameStore {
    async fn load(&self, guild: GuildId) -> Result<Option<GameSnapshot>, RepoError> {
        let row = sqlx::query("SELECT document_json FROM game_documents WHERE guild_id = ?")
            .bind(guild.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("load_game", e))?;

        match row {
            Some(row) => {
                let json: String = row.get("document_json");
                let snapshot = serde_json::from_str(&json).map_err(RepoError::serialization)?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, guild: GuildId, snapshot: &GameSnapshot) -> Result<(), RepoError> {
        let json = serde_json::to_string(snapshot).map_err(RepoError::serialization)?;
        let now = self.clock.now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO game_documents (guild_id, document_json, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(guild_id) DO UPDATE SET
                document_json = excluded.document_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(guild.to_string())
        .bind(json)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_game", e))?;

        Ok(())
    }

    async fn guilds(&self) -> Result<Vec<GuildId>, RepoError> {
        let rows = sqlx::query("SELECT guild_id FROM game_documents")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_guilds", e))?;

        let mut guilds = rows
            .iter()
            .map(|row| {
                let raw: String = row.get("guild_id");
                raw.parse::<GuildId>()
                    .map_err(|e| RepoError::database("list_guilds", e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        guilds.sort();
        Ok(guilds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use nomic_domain::{ChannelId, PlayerId, ProposalList};

    async fn store(dir: &tempfile::TempDir) -> SqliteGameStore {
        let path = dir.path().join("nomic.db");
        let clock = Arc::new(FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
        SqliteGameStore::new(path.to_str().unwrap(), clock)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn missing_guild_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        assert!(store.load(GuildId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        let guild = GuildId::new(u64::MAX);

        let mut snapshot = GameSnapshot::default();
        snapshot.channels.proposals = Some(ChannelId::new(42));
        store.save(guild, &snapshot).await.unwrap();
        assert_eq!(store.load(guild).await.unwrap(), Some(snapshot.clone()));

        let mut proposals = ProposalList::new();
        proposals.submit(
            PlayerId::new(7),
            "Points are now called gold.",
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        );
        snapshot.proposals = proposals.export();
        store.save(guild, &snapshot).await.unwrap();
        assert_eq!(store.load(guild).await.unwrap(), Some(snapshot));
        assert_eq!(store.guilds().await.unwrap(), vec![guild]);
    }
}
