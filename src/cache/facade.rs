//! Cache Facade Module
//!
//! Resolves the configured engine/strategy pair, builds and initializes the
//! pipeline, and exposes the uniform contract to application code.

use std::time::Duration;

use tracing::info;

use crate::cache::{EngineFactory, Registry, StrategyFactory};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::storage::Deferred;
use crate::strategy::{BoxedStrategy, ExpiryStats, PrimedStrategy};

// == Cache ==
/// An initialized cache pipeline.
///
/// # Example
/// ```ignore
/// let config = CacheConfig::default().with_strategy("expiring");
/// let cache: Cache<String> = Cache::init(&config)?;
/// cache.put_sync("greeting", "hello".to_string())?;
/// assert_eq!(cache.get_sync("greeting")?, Some("hello".to_string()));
/// ```
pub struct Cache<V> {
    strategy: BoxedStrategy<V>,
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Init ==
    /// Builds the engine and strategy named by `config` from the standard
    /// registry.
    pub fn init(config: &CacheConfig) -> Result<Self> {
        Self::init_with(config, &Registry::standard(), None, None)
    }

    /// Builds a cache, with explicit factories taking precedence over the
    /// names in `config`.
    ///
    /// Unknown names fail with `UnknownStorage` / `UnknownStrategy` before
    /// anything is constructed.
    pub fn init_with(
        config: &CacheConfig,
        registry: &Registry<V>,
        engine: Option<EngineFactory<V>>,
        strategy: Option<StrategyFactory<V>>,
    ) -> Result<Self> {
        let strategy_factory = match strategy {
            Some(factory) => factory,
            None => registry.strategy(&config.strategy)?,
        };
        let engine_factory = match engine {
            Some(factory) => factory,
            None => registry.engine(&config.storage)?,
        };

        let strategy = strategy_factory(engine_factory());
        strategy.init(config)?;
        info!(
            storage = %config.storage,
            strategy = strategy.name(),
            "Cache initialized"
        );

        Ok(Self { strategy })
    }

    /// Name of the outermost strategy.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    // == Synchronous Contract ==
    pub fn get_sync(&self, key: &str) -> Result<Option<V>> {
        self.strategy.get_sync(key)
    }

    pub fn put_sync(&self, key: &str, value: V) -> Result<()> {
        self.strategy.put_sync(key, value)
    }

    pub fn put_with_ttl_sync(&self, key: &str, value: V, ttl: Duration) -> Result<()> {
        self.strategy.put_with_ttl_sync(key, value, ttl)
    }

    pub fn remove_sync(&self, key: &str) -> Result<Option<V>> {
        self.strategy.remove_sync(key)
    }

    // == Deferred Contract ==
    pub fn get(&self, key: &str) -> Result<Deferred<Option<V>>> {
        self.strategy.get(key)
    }

    pub fn put(&self, key: &str, value: V) -> Result<Deferred<()>> {
        self.strategy.put(key, value)
    }

    pub fn put_with_ttl(&self, key: &str, value: V, ttl: Duration) -> Result<Deferred<()>> {
        self.strategy.put_with_ttl(key, value, ttl)
    }

    pub fn remove(&self, key: &str) -> Result<Deferred<Option<V>>> {
        self.strategy.remove(key)
    }

    // == Introspection ==
    pub fn len(&self) -> Result<usize> {
        self.strategy.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.strategy.is_empty()
    }

    pub fn supports_synchronous(&self) -> bool {
        self.strategy.supports_synchronous()
    }

    pub fn supports_expiry(&self) -> bool {
        self.strategy.supports_expiry()
    }

    /// Scheduler counters, when the pipeline expires entries.
    pub fn stats(&self) -> Option<ExpiryStats> {
        self.strategy.expiry_stats()
    }

    /// Priming operations, when the strategy is a primed one.
    pub fn primer(&self) -> Option<&PrimedStrategy<V>> {
        self.strategy.as_primed()
    }

    /// Cancels pending expiry timers.
    pub fn shutdown(&self) {
        self.strategy.shutdown();
    }
}
