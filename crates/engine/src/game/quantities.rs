//! Quantity operations on a locked game. Each one is validated by the
//! registry, saved, then written to the audit log.

use nomic_domain::{Amount, PlayerId, Quantity, QuantityName};

use super::GameGuard;
use crate::error::GameError;

fn joined(names: &[QuantityName]) -> String {
    names
        .iter()
        .map(QuantityName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl GameGuard {
    pub async fn add_quantity(
        &mut self,
        agent: PlayerId,
        name: &str,
        aliases: &[impl AsRef<str>],
    ) -> Result<Quantity, GameError> {
        self.game.assert_locked()?;
        let quantity = self.state.quantities.add(name, aliases)?.clone();
        self.save().await?;
        tracing::info!(
            guild_id = %self.game.guild_id,
            agent = %agent,
            quantity = %quantity.name(),
            aliases = %joined(quantity.aliases()),
            "Added quantity"
        );
        Ok(quantity)
    }

    /// Returns the old name.
    pub async fn rename_quantity(
        &mut self,
        agent: PlayerId,
        name: &str,
        new_name: &str,
    ) -> Result<QuantityName, GameError> {
        self.game.assert_locked()?;
        let old = self.state.quantities.rename(name, new_name)?;
        self.save().await?;
        tracing::info!(
            guild_id = %self.game.guild_id,
            agent = %agent,
            quantity = %old,
            new_name = %new_name.to_lowercase(),
            "Renamed quantity"
        );
        Ok(old)
    }

    pub async fn remove_quantity(
        &mut self,
        agent: PlayerId,
        name: &str,
    ) -> Result<Quantity, GameError> {
        self.game.assert_locked()?;
        let removed = self.state.quantities.remove(name)?;
        self.save().await?;
        tracing::info!(
            guild_id = %self.game.guild_id,
            agent = %agent,
            quantity = %removed.name(),
            "Removed quantity"
        );
        Ok(removed)
    }

    /// Replace the aliases. Returns the old ones.
    pub async fn set_quantity_aliases(
        &mut self,
        agent: PlayerId,
        name: &str,
        aliases: &[impl AsRef<str>],
    ) -> Result<Vec<QuantityName>, GameError> {
        self.game.assert_locked()?;
        let old = self.state.quantities.set_aliases(name, aliases)?;
        self.save().await?;
        let current = self
            .state
            .quantities
            .get(name)
            .map(|q| joined(q.aliases()))
            .unwrap_or_default();
        tracing::info!(
            guild_id = %self.game.guild_id,
            agent = %agent,
            quantity = %name,
            old_aliases = %joined(&old),
            new_aliases = %current,
            "Set quantity aliases"
        );
        Ok(old)
    }

    /// Returns the old default.
    pub async fn set_quantity_default(
        &mut self,
        agent: PlayerId,
        name: &str,
        default_value: Amount,
    ) -> Result<Amount, GameError> {
        self.game.assert_locked()?;
        let old = self.state.quantities.set_default(name, default_value)?;
        self.save().await?;
        tracing::info!(
            guild_id = %self.game.guild_id,
            agent = %agent,
            quantity = %name,
            old_default = %old,
            new_default = %default_value.normalized(),
            "Set quantity default"
        );
        Ok(old)
    }

    /// Returns `(old, new)` effective values for `player`.
    pub async fn set_quantity_value(
        &mut self,
        agent: PlayerId,
        name: &str,
        player: PlayerId,
        value: Amount,
    ) -> Result<(Amount, Amount), GameError> {
        self.game.assert_locked()?;
        let (old, new) = self.state.quantities.set_value(name, player, value)?;
        self.save().await?;
        tracing::info!(
            guild_id = %self.game.guild_id,
            agent = %agent,
            quantity = %name,
            player = %player,
            old = %old,
            new = %new,
            "Set quantity value"
        );
        Ok((old, new))
    }
}
