//! Sparse per-player value map.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::ids::PlayerId;

/// A mapping from player to value that only stores non-default values.
///
/// # Invariants
///
/// - No stored entry ever equals `default`; `set` with the default deletes.
/// - Iteration is ordered by player ID.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDict<V> {
    entries: BTreeMap<PlayerId, V>,
    default: V,
}

impl<V: Clone + PartialEq> PlayerDict<V> {
    pub fn new(default: V) -> Self {
        Self {
            entries: BTreeMap::new(),
            default,
        }
    }

    /// Build from a persisted mapping, dropping any entries equal to the default.
    pub fn from_entries(entries: impl IntoIterator<Item = (PlayerId, V)>, default: V) -> Self {
        let mut dict = Self::new(default);
        for (player, value) in entries {
            dict.set(player, value);
        }
        dict
    }

    pub fn default_value(&self) -> &V {
        &self.default
    }

    /// Stored value, or the default for absent players.
    pub fn get(&self, player: PlayerId) -> &V {
        self.entries.get(&player).unwrap_or(&self.default)
    }

    /// Store `value`, or delete the entry if it equals the default.
    ///
    /// Returns the previous effective value.
    pub fn set(&mut self, player: PlayerId, value: V) -> V {
        let previous = if value == self.default {
            self.entries.remove(&player)
        } else {
            self.entries.insert(player, value)
        };
        previous.unwrap_or_else(|| self.default.clone())
    }

    pub fn remove(&mut self, player: PlayerId) -> Option<V> {
        self.entries.remove(&player)
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.entries.contains_key(&player)
    }

    /// Replace the default, purging stored values that now equal it.
    pub fn set_default(&mut self, default: V) {
        self.default = default;
        let default = &self.default;
        self.entries.retain(|_, value| value != default);
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &V)> {
        self.entries.iter().map(|(player, value)| (*player, value))
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored entries as a plain mapping.
    pub fn export(&self) -> BTreeMap<PlayerId, V> {
        self.entries.clone()
    }
}

impl<V: Serialize> Serialize for PlayerDict<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}
