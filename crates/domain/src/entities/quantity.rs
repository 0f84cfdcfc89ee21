//! Quantity entity - a named per-player numeric attribute such as points

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;
use crate::player_dict::PlayerDict;
use crate::value_objects::{Amount, QuantityName};

/// Persisted form of a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityRecord {
    pub name: QuantityName,
    #[serde(default)]
    pub aliases: Vec<QuantityName>,
    #[serde(default)]
    pub players: BTreeMap<PlayerId, Amount>,
    #[serde(default)]
    pub default_value: Amount,
}

/// A game quantity with a default value and sparse per-player overrides.
///
/// Names and aliases are only changed through `QuantityRegistry`, which owns
/// the uniqueness invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    name: QuantityName,
    aliases: Vec<QuantityName>,
    players: PlayerDict<Amount>,
}

impl Quantity {
    pub(crate) fn new(name: QuantityName, aliases: Vec<QuantityName>, default_value: Amount) -> Self {
        let mut quantity = Self {
            name,
            aliases: Vec::new(),
            players: PlayerDict::new(default_value.normalized()),
        };
        quantity.set_aliases(aliases);
        quantity
    }

    pub fn from_record(record: QuantityRecord) -> Self {
        let mut quantity = Self::new(record.name, record.aliases, record.default_value);
        for (player, value) in record.players {
            quantity.set(player, value);
        }
        quantity
    }

    pub fn to_record(&self) -> QuantityRecord {
        QuantityRecord {
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            players: self.players.export(),
            default_value: self.default_value(),
        }
    }

    #[inline]
    pub fn name(&self) -> &QuantityName {
        &self.name
    }

    /// Sorted aliases.
    #[inline]
    pub fn aliases(&self) -> &[QuantityName] {
        &self.aliases
    }

    #[inline]
    pub fn players(&self) -> &PlayerDict<Amount> {
        &self.players
    }

    pub fn default_value(&self) -> Amount {
        *self.players.default_value()
    }

    /// True if `name` is this quantity's name or one of its aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == *name || self.aliases.iter().any(|alias| *alias == *name)
    }

    /// Stored value for the player, or the default.
    pub fn get(&self, player: PlayerId) -> Amount {
        *self.players.get(player)
    }

    /// Set a player's value, returning the previous one. Integer-valued
    /// numbers are stored as integers; the default is never stored.
    pub(crate) fn set(&mut self, player: PlayerId, value: Amount) -> Amount {
        self.players.set(player, value.normalized())
    }

    pub(crate) fn set_name(&mut self, name: QuantityName) {
        self.aliases.retain(|alias| *alias != name);
        self.name = name;
    }

    pub(crate) fn set_aliases(&mut self, mut aliases: Vec<QuantityName>) {
        aliases.sort();
        aliases.dedup();
        let name = &self.name;
        aliases.retain(|alias| alias != name);
        self.aliases = aliases;
    }

    /// Change the default and re-normalize stored values against it.
    pub(crate) fn set_default(&mut self, default_value: Amount) {
        self.players.set_default(default_value.normalized());
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quantity {}", self.name)
    }
}
