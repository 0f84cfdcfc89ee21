//! Player activity tracking, channel bindings and per-game flags.

use std::collections::BTreeMap;

use nomic_domain::{ChannelId, GameFlags, PlayerId};

use super::GameGuard;
use crate::error::GameError;

impl GameGuard {
    /// Stamp `player` as active now. Persisted by the next save.
    pub fn record_activity(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.game.assert_locked()?;
        let now = self.now().timestamp();
        self.state.player_activity.set(player, Some(now));
        Ok(())
    }

    /// Seconds since the player was last active, if ever.
    pub fn activity_diff(&self, player: PlayerId) -> Option<i64> {
        let now = self.now().timestamp();
        self.last_activity(player).map(|last| now - last)
    }

    /// Active within the last `player_activity_cutoff` hours.
    pub fn is_active(&self, player: PlayerId) -> bool {
        let cutoff = i64::from(self.state.flags.player_activity_cutoff) * 3600;
        self.activity_diff(player)
            .is_some_and(|diff| diff <= cutoff)
    }

    /// `activity_diff` for every player with recorded activity.
    pub fn activity_diffs(&self) -> BTreeMap<PlayerId, i64> {
        let now = self.now().timestamp();
        self.state
            .player_activity
            .iter()
            .filter_map(|(player, last)| last.map(|last| (player, now - last)))
            .collect()
    }

    pub async fn set_proposals_channel(
        &mut self,
        channel: Option<ChannelId>,
    ) -> Result<(), GameError> {
        self.game.assert_locked()?;
        self.state.channels.proposals = channel;
        self.save().await?;
        tracing::info!(
            guild_id = %self.game.guild_id,
            channel = ?channel,
            "Proposals channel set"
        );
        Ok(())
    }

    pub async fn set_rules_channel(&mut self, channel: Option<ChannelId>) -> Result<(), GameError> {
        self.game.assert_locked()?;
        self.state.channels.rules = channel;
        self.save().await?;
        tracing::info!(
            guild_id = %self.game.guild_id,
            channel = ?channel,
            "Rules channel set"
        );
        Ok(())
    }

    pub async fn set_flags(&mut self, flags: GameFlags) -> Result<(), GameError> {
        self.game.assert_locked()?;
        self.state.flags = flags;
        self.save().await?;
        tracing::info!(guild_id = %self.game.guild_id, flags = ?flags, "Game flags updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::GameError;
    use crate::test_fixtures::{TestGame, ALICE, BOB, PROPOSALS, RULES};
    use chrono::Duration;
    use nomic_domain::GameFlags;

    #[tokio::test]
    async fn activity_expires_after_cutoff() {
        let t = TestGame::new().await;
        let mut guard = t.game.lock().await;
        assert!(!guard.is_active(ALICE));
        assert_eq!(guard.activity_diff(ALICE), None);

        guard.record_activity(ALICE).unwrap();
        t.clock.advance(Duration::hours(24));
        assert!(guard.is_active(ALICE));
        assert_eq!(guard.activity_diff(ALICE), Some(24 * 3600));

        t.clock.advance(Duration::seconds(1));
        assert!(!guard.is_active(ALICE));

        guard
            .set_flags(GameFlags {
                player_activity_cutoff: 48,
                ..GameFlags::default()
            })
            .await
            .unwrap();
        assert!(guard.is_active(ALICE));
    }

    #[tokio::test]
    async fn activity_diffs_lists_recorded_players() {
        let t = TestGame::new().await;
        let mut guard = t.game.lock().await;
        guard.record_activity(ALICE).unwrap();
        t.clock.advance(Duration::minutes(5));
        guard.record_activity(BOB).unwrap();
        let diffs = guard.activity_diffs();
        assert_eq!(diffs.get(&ALICE), Some(&300));
        assert_eq!(diffs.get(&BOB), Some(&0));
    }

    #[tokio::test]
    async fn activity_from_another_task_is_refused() {
        let t = TestGame::new().await;
        let guard = t.game.lock().await;
        let (guard, result) = tokio::spawn(async move {
            let mut guard = guard;
            let result = guard.record_activity(BOB);
            (guard, result)
        })
        .await
        .unwrap();
        assert!(matches!(result, Err(GameError::NotLocked)));
        assert_eq!(guard.activity_diff(BOB), None);
    }

    #[tokio::test]
    async fn channel_bindings_persist() {
        let t = TestGame::new().await;
        {
            let mut guard = t.game.lock().await;
            guard.set_proposals_channel(Some(PROPOSALS)).await.unwrap();
            guard.set_rules_channel(Some(RULES)).await.unwrap();
            guard.set_rules_channel(None).await.unwrap();
        }
        let reloaded = t.reload().await;
        let guard = reloaded.lock().await;
        assert_eq!(guard.channels().proposals, Some(PROPOSALS));
        assert_eq!(guard.channels().rules, None);
    }
}
