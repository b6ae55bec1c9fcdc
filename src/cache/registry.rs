//! Registry Module
//!
//! Startup-time map from names to storage engine and strategy factories.

use std::collections::HashMap;

use crate::error::{CacheError, Result};
use crate::storage::{BoxedEngine, MemoryEngine};
use crate::strategy::{BoxedStrategy, ExpiringStrategy, PrimedStrategy};

/// Builds an uninitialized storage engine.
pub type EngineFactory<V> = fn() -> BoxedEngine<V>;

/// Builds an uninitialized strategy around an uninitialized engine.
pub type StrategyFactory<V> = fn(BoxedEngine<V>) -> BoxedStrategy<V>;

// == Registry ==
/// Named storage engines and strategies.
///
/// [`Registry::standard`] knows the built-in components:
///
/// | kind | name |
/// |---|---|
/// | engine | `memory` |
/// | strategy | `expiring`, `primed`, `primed-expiring` |
pub struct Registry<V> {
    engines: HashMap<String, EngineFactory<V>>,
    strategies: HashMap<String, StrategyFactory<V>>,
}

impl<V> Registry<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            engines: HashMap::new(),
            strategies: HashMap::new(),
        }
    }

    /// Creates a registry holding the built-in engines and strategies.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register_engine("memory", memory_engine::<V>);
        registry.register_strategy("expiring", expiring_strategy::<V>);
        registry.register_strategy("primed", primed_strategy::<V>);
        registry.register_strategy("primed-expiring", primed_expiring_strategy::<V>);
        registry
    }

    /// Adds or replaces an engine factory.
    pub fn register_engine(&mut self, name: impl Into<String>, factory: EngineFactory<V>) {
        self.engines.insert(name.into(), factory);
    }

    /// Adds or replaces a strategy factory.
    pub fn register_strategy(&mut self, name: impl Into<String>, factory: StrategyFactory<V>) {
        self.strategies.insert(name.into(), factory);
    }

    // == Lookup ==
    pub fn engine(&self, name: &str) -> Result<EngineFactory<V>> {
        self.engines
            .get(name)
            .copied()
            .ok_or_else(|| CacheError::UnknownStorage(name.to_string()))
    }

    pub fn strategy(&self, name: &str) -> Result<StrategyFactory<V>> {
        self.strategies
            .get(name)
            .copied()
            .ok_or_else(|| CacheError::UnknownStrategy(name.to_string()))
    }

    /// Registered engine names, sorted.
    pub fn engine_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.engines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registered strategy names, sorted.
    pub fn strategy_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<V> Default for Registry<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::standard()
    }
}

// == Built-in Factories ==
fn memory_engine<V>() -> BoxedEngine<V>
where
    V: Clone + Send + Sync + 'static,
{
    Box::new(MemoryEngine::new())
}

fn expiring_strategy<V>(engine: BoxedEngine<V>) -> BoxedStrategy<V>
where
    V: Clone + Send + Sync + 'static,
{
    Box::new(ExpiringStrategy::new(engine))
}

fn primed_strategy<V>(engine: BoxedEngine<V>) -> BoxedStrategy<V>
where
    V: Clone + Send + Sync + 'static,
{
    Box::new(PrimedStrategy::new(engine))
}

fn primed_expiring_strategy<V>(engine: BoxedEngine<V>) -> BoxedStrategy<V>
where
    V: Clone + Send + Sync + 'static,
{
    Box::new(PrimedStrategy::new(Box::new(ExpiringStrategy::new(engine))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::Strategy;

    #[test]
    fn test_standard_names() {
        let registry: Registry<String> = Registry::standard();

        assert_eq!(registry.engine_names(), vec!["memory"]);
        assert_eq!(
            registry.strategy_names(),
            vec!["expiring", "primed", "primed-expiring"]
        );
    }

    #[test]
    fn test_unknown_names() {
        let registry: Registry<String> = Registry::standard();

        assert_eq!(
            registry.engine("disk").err(),
            Some(CacheError::UnknownStorage("disk".to_string()))
        );
        assert_eq!(
            registry.strategy("lru").err(),
            Some(CacheError::UnknownStrategy("lru".to_string()))
        );
    }

    #[test]
    fn test_register_custom_strategy() {
        fn passthrough(engine: BoxedEngine<String>) -> BoxedStrategy<String> {
            Box::new(PrimedStrategy::new(engine))
        }

        let mut registry: Registry<String> = Registry::new();
        assert!(registry.strategy("warm").is_err());

        registry.register_strategy("warm", passthrough);
        let strategy = registry.strategy("warm").unwrap()(memory_engine());

        assert_eq!(strategy.name(), "primed");
    }
}
