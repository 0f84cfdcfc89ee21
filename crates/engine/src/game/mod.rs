//! A single guild's game and its lock protocol.
//!
//! A `Game` is only reachable through [`Game::lock`], which yields a
//! [`GameGuard`]. Every read of consistent state and every mutation goes
//! through the guard, and every mutating guard operation ends by saving.
//!
//! The lock records which tokio task acquired it. [`Game::assert_locked`]
//! compares that owner with the calling task, so a guard handed to another
//! task cannot persist anything.

mod activity;
mod proposals;
mod quantities;
pub mod render;
mod rules;
mod state;

use std::ops::Deref;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use nomic_domain::{ChannelId, GameSnapshot, GuildId, PlayerId, RuleLoadIssue};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task;

use crate::error::GameError;
use crate::infrastructure::ports::{ClockPort, GameStore, MessagingPort};

pub use proposals::{ProposalInfo, RefreshReport};
pub use state::{GameState, LoadReport};

/// The player issuing a command, and whether they hold admin rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: PlayerId,
    pub is_admin: bool,
}

impl Actor {
    pub fn player(id: PlayerId) -> Self {
        Self {
            id,
            is_admin: false,
        }
    }

    pub fn admin(id: PlayerId) -> Self {
        Self { id, is_admin: true }
    }
}

/// Task that currently holds the lock. `None` inside means the lock was
/// taken outside any task (e.g. directly under `block_on`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Owner(Option<task::Id>);

impl Owner {
    fn current() -> Self {
        Self(task::try_id())
    }
}

pub struct Game {
    guild_id: GuildId,
    state: Arc<Mutex<GameState>>,
    owner: StdMutex<Option<Owner>>,
    load_report: LoadReport,
    store: Arc<dyn GameStore>,
    messaging: Arc<dyn MessagingPort>,
    clock: Arc<dyn ClockPort>,
}

impl Game {
    /// Load the guild's stored document, or start from defaults when there
    /// is none. Corrupt rules are repaired and logged, never fatal.
    pub(crate) async fn load(
        guild_id: GuildId,
        store: Arc<dyn GameStore>,
        messaging: Arc<dyn MessagingPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Result<Self, GameError> {
        let snapshot = match store.load(guild_id).await? {
            Some(snapshot) => snapshot,
            None => {
                tracing::debug!(guild_id = %guild_id, "No stored game, starting fresh");
                GameSnapshot::default()
            }
        };
        let (state, load_report) = GameState::from_snapshot(snapshot);
        for issue in &load_report.rule_issues {
            tracing::warn!(guild_id = %guild_id, tag = %issue.tag, "{}", issue);
        }
        if load_report.renumbered > 0 {
            tracing::warn!(
                guild_id = %guild_id,
                count = load_report.renumbered,
                "Corrected stored proposal numbers"
            );
        }
        Ok(Self {
            guild_id,
            state: Arc::new(Mutex::new(state)),
            owner: StdMutex::new(None),
            load_report,
            store,
            messaging,
            clock,
        })
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// What had to be repaired when this game was loaded.
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn rule_issues(&self) -> &[RuleLoadIssue] {
        &self.load_report.rule_issues
    }

    /// Wait for exclusive access. Cancel-safe while waiting.
    pub async fn lock(self: &Arc<Self>) -> GameGuard {
        let state = Arc::clone(&self.state).lock_owned().await;
        *self.owner() = Some(Owner::current());
        tracing::trace!(guild_id = %self.guild_id, "Game locked");
        GameGuard {
            game: Arc::clone(self),
            state,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.owner().is_some()
    }

    /// Fails with `NotLocked` unless the calling task holds the lock.
    pub fn assert_locked(&self) -> Result<(), GameError> {
        match *self.owner() {
            Some(owner) if owner == Owner::current() => Ok(()),
            _ => Err(GameError::NotLocked),
        }
    }

    fn owner(&self) -> MutexGuard<'_, Option<Owner>> {
        self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("guild_id", &self.guild_id)
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

/// Exclusive access to a game's state. Dropping it releases the lock.
pub struct GameGuard {
    game: Arc<Game>,
    state: OwnedMutexGuard<GameState>,
}

impl GameGuard {
    pub fn game(&self) -> &Arc<Game> {
        &self.game
    }

    pub fn guild_id(&self) -> GuildId {
        self.game.guild_id
    }

    pub fn export(&self) -> GameSnapshot {
        self.state.export()
    }

    /// Replace the stored document with the current state.
    pub async fn save(&self) -> Result<(), GameError> {
        self.game.assert_locked()?;
        let snapshot = self.state.export();
        self.game.store.save(self.game.guild_id, &snapshot).await?;
        tracing::debug!(guild_id = %self.game.guild_id, "Game saved");
        Ok(())
    }

    fn now(&self) -> DateTime<Utc> {
        self.game.clock.now()
    }

    fn messaging(&self) -> &dyn MessagingPort {
        self.game.messaging.as_ref()
    }

    fn proposals_channel(&self) -> Result<ChannelId, GameError> {
        self.state
            .channels
            .proposals
            .ok_or(GameError::ChannelNotSet("proposals"))
    }

    fn rules_channel(&self) -> Result<ChannelId, GameError> {
        self.state
            .channels
            .rules
            .ok_or(GameError::ChannelNotSet("rules"))
    }
}

impl Deref for GameGuard {
    type Target = GameState;

    fn deref(&self) -> &GameState {
        &self.state
    }
}

impl Drop for GameGuard {
    fn drop(&mut self) {
        // Runs before the mutex guard field is dropped, so the next holder's
        // stamp is never cleared by us.
        *self.game.owner() = None;
        tracing::trace!(guild_id = %self.game.guild_id, "Game unlocked");
    }
}
