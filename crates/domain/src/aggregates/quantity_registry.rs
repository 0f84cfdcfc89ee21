//! Registry of a game's quantities
//!
//! Owns the uniqueness invariant: every name and alias across all quantities
//! is distinct. All validation runs before the registry is touched, so a
//! failed call leaves it unchanged.

use std::collections::BTreeMap;

use crate::entities::{Quantity, QuantityRecord};
use crate::error::DomainError;
use crate::ids::PlayerId;
use crate::value_objects::{Amount, QuantityName};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuantityRegistry {
    quantities: BTreeMap<QuantityName, Quantity>,
}

impl QuantityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted records. Records are indexed by their own name.
    pub fn load(records: BTreeMap<String, QuantityRecord>) -> Self {
        let quantities = records
            .into_values()
            .map(Quantity::from_record)
            .map(|q| (q.name().clone(), q))
            .collect();
        Self { quantities }
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Quantities in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Quantity> {
        self.quantities.values()
    }

    /// Case-insensitive lookup: names first, then aliases in name order.
    pub fn get(&self, name: &str) -> Option<&Quantity> {
        let key = self.resolve(name)?;
        self.quantities.get(&key)
    }

    fn resolve(&self, name: &str) -> Option<QuantityName> {
        let name = name.to_lowercase();
        if let Some((key, _)) = self
            .quantities
            .iter()
            .find(|(key, _)| key.as_str() == name)
        {
            return Some(key.clone());
        }
        self.quantities
            .values()
            .find(|q| q.aliases().iter().any(|alias| *alias == *name.as_str()))
            .map(|q| q.name().clone())
    }

    fn resolve_or_err(&self, name: &str) -> Result<QuantityName, DomainError> {
        self.resolve(name)
            .ok_or_else(|| DomainError::not_found("quantity", name))
    }

    /// Validate a prospective name or alias. Names already belonging to
    /// `ignore` do not count as collisions.
    pub fn check_name(
        &self,
        name: &str,
        ignore: Option<&QuantityName>,
    ) -> Result<QuantityName, DomainError> {
        let name = QuantityName::new(name)?;
        let owned_by_ignored = ignore
            .and_then(|key| self.quantities.get(key))
            .is_some_and(|q| q.answers_to(name.as_str()));
        if !owned_by_ignored && self.resolve(name.as_str()).is_some() {
            return Err(DomainError::duplicate("Quantity", name.as_str()));
        }
        Ok(name)
    }

    /// Validate a batch of new aliases, which must also be distinct from
    /// each other.
    fn check_all(
        &self,
        names: &[impl AsRef<str>],
        ignore: Option<&QuantityName>,
    ) -> Result<Vec<QuantityName>, DomainError> {
        let mut checked: Vec<QuantityName> = Vec::with_capacity(names.len());
        for name in names {
            let name = self.check_name(name.as_ref(), ignore)?;
            if checked.contains(&name) {
                return Err(DomainError::duplicate("Quantity", name.as_str()));
            }
            checked.push(name);
        }
        Ok(checked)
    }

    /// Create a new quantity with default value zero.
    pub fn add(
        &mut self,
        name: &str,
        aliases: &[impl AsRef<str>],
    ) -> Result<&Quantity, DomainError> {
        let name = self.check_name(name, None)?;
        let aliases = self.check_all(aliases, None)?;
        if aliases.contains(&name) {
            return Err(DomainError::duplicate("Quantity", name.as_str()));
        }
        let quantity = Quantity::new(name.clone(), aliases, Amount::ZERO);
        Ok(self.quantities.entry(name).or_insert(quantity))
    }

    /// Rename a quantity. Renaming to one of its own aliases promotes that
    /// alias to the primary name. Returns the old name.
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<QuantityName, DomainError> {
        let old = self.resolve_or_err(name)?;
        let new_name = self.check_name(new_name, Some(&old))?;
        if let Some(mut quantity) = self.quantities.remove(&old) {
            quantity.set_name(new_name.clone());
            self.quantities.insert(new_name, quantity);
        }
        Ok(old)
    }

    pub fn remove(&mut self, name: &str) -> Result<Quantity, DomainError> {
        let key = self.resolve_or_err(name)?;
        self.quantities
            .remove(&key)
            .ok_or_else(|| DomainError::not_found("quantity", name))
    }

    /// Replace a quantity's aliases. Returns the old aliases.
    pub fn set_aliases(
        &mut self,
        name: &str,
        aliases: &[impl AsRef<str>],
    ) -> Result<Vec<QuantityName>, DomainError> {
        let key = self.resolve_or_err(name)?;
        let aliases = self.check_all(aliases, Some(&key))?;
        let quantity = self.get_mut(&key)?;
        let old = quantity.aliases().to_vec();
        quantity.set_aliases(aliases);
        Ok(old)
    }

    /// Change the default value, purging stored values equal to the new
    /// default. Returns the old default.
    pub fn set_default(&mut self, name: &str, default_value: Amount) -> Result<Amount, DomainError> {
        let default_value = default_value.finite()?;
        let key = self.resolve_or_err(name)?;
        let quantity = self.get_mut(&key)?;
        let old = quantity.default_value();
        quantity.set_default(default_value);
        Ok(old)
    }

    /// Set one player's value. Returns `(old, new)` effective values.
    pub fn set_value(
        &mut self,
        name: &str,
        player: PlayerId,
        value: Amount,
    ) -> Result<(Amount, Amount), DomainError> {
        let value = value.finite()?;
        let key = self.resolve_or_err(name)?;
        let quantity = self.get_mut(&key)?;
        let old = quantity.set(player, value);
        Ok((old, quantity.get(player)))
    }

    fn get_mut(&mut self, key: &QuantityName) -> Result<&mut Quantity, DomainError> {
        self.quantities
            .get_mut(key)
            .ok_or_else(|| DomainError::not_found("quantity", key))
    }

    /// Persisted form, sorted by name.
    pub fn export(&self) -> BTreeMap<String, QuantityRecord> {
        self.quantities
            .iter()
            .map(|(name, q)| (name.to_string(), q.to_record()))
            .collect()
    }
}
