//! Strategy registry
//!
//! Written at genesis or by an admin, read on every locked conversion and redemption.
//! Entries are immutable once created.

use std::collections::BTreeMap;

use alloy_primitives::U256;

use crate::{
    constants::default_strategies,
    utils::error::{ConverterError, ConverterResult},
};

use super::settings::{validate_name, Strategy};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrategyRegistry {
    strategies: BTreeMap<String, Strategy>,
}

impl StrategyRegistry {
    /// Registry populated with `instant`, `90days` and `180days`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        for (name, period, rate) in default_strategies() {
            registry.strategies.insert(name.to_string(), Strategy::new(name, period, rate));
        }
        registry
    }

    /// Registers a new strategy.
    /// Fails if the name is already taken; the existing entry is never overwritten.
    pub fn create_strategy(
        &mut self,
        name: &str,
        period: u64,
        conversion_rate: U256,
    ) -> ConverterResult<()> {
        validate_name(name)?;
        if self.strategies.contains_key(name) {
            return Err(ConverterError::StrategyAlreadyExists(name.to_string()));
        }
        self.strategies
            .insert(name.to_string(), Strategy::new(name, period, conversion_rate));
        Ok(())
    }

    pub fn get_strategy(&self, name: &str) -> Option<&Strategy> {
        self.strategies.get(name)
    }

    /// All strategies, ordered by name.
    pub fn list_strategies(&self) -> impl Iterator<Item = &Strategy> {
        self.strategies.values()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::scale;

    #[test]
    fn test_create_and_get() {
        let mut registry = StrategyRegistry::default();
        registry.create_strategy("30days", 2_592_000, scale()).unwrap();

        let strategy = registry.get_strategy("30days").unwrap();
        assert_eq!(strategy.period, 2_592_000);
        assert_eq!(strategy.conversion_rate, scale());
        assert!(registry.get_strategy("31days").is_none());
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = StrategyRegistry::with_defaults();
        let result = registry.create_strategy("90days", 1, U256::ZERO);
        assert_eq!(
            result,
            Err(ConverterError::StrategyAlreadyExists("90days".to_string()))
        );
        // The original entry is untouched
        assert_eq!(registry.get_strategy("90days").unwrap().period, 7_776_000);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut registry = StrategyRegistry::default();
        assert!(matches!(
            registry.create_strategy("", 1, U256::ZERO),
            Err(ConverterError::InvalidStrategy(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_listing_is_stable() {
        let mut registry = StrategyRegistry::default();
        registry.create_strategy("b", 1, U256::ZERO).unwrap();
        registry.create_strategy("a", 2, U256::ZERO).unwrap();
        registry.create_strategy("c", 3, U256::ZERO).unwrap();

        let names: Vec<&str> = registry.list_strategies().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        let again: Vec<&str> = registry.list_strategies().map(|s| s.name.as_str()).collect();
        assert_eq!(names, again);
    }

    #[test]
    fn test_defaults() {
        let registry = StrategyRegistry::with_defaults();
        assert_eq!(registry.len(), 3);
        assert!(registry.get_strategy("instant").unwrap().is_instant());
        assert_eq!(registry.get_strategy("180days").unwrap().conversion_rate, scale());
    }
}
