//! Process-wide map from guild to its single `Game`.

use std::sync::Arc;

use dashmap::DashMap;
use nomic_domain::GuildId;
use tokio::sync::OnceCell;

use crate::error::GameError;
use crate::game::Game;
use crate::infrastructure::ports::{ClockPort, GameStore, MessagingPort};

/// Loads each guild's game on first use and hands out the shared instance.
///
/// Concurrent first requests for the same guild wait on one load, so there
/// is never more than one `Game` per guild. Entries are never evicted on
/// their own.
pub struct GameRegistry {
    games: DashMap<GuildId, Arc<OnceCell<Arc<Game>>>>,
    store: Arc<dyn GameStore>,
    messaging: Arc<dyn MessagingPort>,
    clock: Arc<dyn ClockPort>,
}

impl GameRegistry {
    pub fn new(
        store: Arc<dyn GameStore>,
        messaging: Arc<dyn MessagingPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            games: DashMap::new(),
            store,
            messaging,
            clock,
        }
    }

    /// The guild's game, loading it from the store on a miss. A failed load
    /// is not cached.
    pub async fn get_game(&self, guild: GuildId) -> Result<Arc<Game>, GameError> {
        // Clone the cell out so no map shard stays locked across the load.
        let cell = self.games.entry(guild).or_default().clone();
        let game = cell
            .get_or_try_init(|| async {
                tracing::info!(guild_id = %guild, "Loading game");
                let game = Game::load(
                    guild,
                    Arc::clone(&self.store),
                    Arc::clone(&self.messaging),
                    Arc::clone(&self.clock),
                )
                .await?;
                Ok::<_, GameError>(Arc::new(game))
            })
            .await?;
        Ok(Arc::clone(game))
    }

    /// Forget the cached game so the next `get_game` reloads it.
    ///
    /// Holders of the old `Arc` keep a detached game with its own lock, so
    /// it and the reloaded game can both save and overwrite each other's
    /// documents. Only call this once every handle to the old game has
    /// been dropped.
    pub fn invalidate(&self, guild: GuildId) -> bool {
        self.games.remove(&guild).is_some()
    }

    /// Guilds whose game is currently loaded, ascending.
    pub fn cached_guilds(&self) -> Vec<GuildId> {
        let mut guilds: Vec<GuildId> = self
            .games
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| *entry.key())
            .collect();
        guilds.sort();
        guilds
    }
}
