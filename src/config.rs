//! Configuration Module
//!
//! Names the storage engine and strategy to build, and carries the options
//! the strategies recognize. Values load from environment variables.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Registry name of the storage engine
    pub storage: String,
    /// Registry name of the strategy
    pub strategy: String,
    /// Default TTL in milliseconds for entries put without explicit TTL
    pub max_age_ms: u64,
    /// Bucket granularity in milliseconds, must be > 0
    pub clean_interval_ms: u64,
    /// Soft key-count bound, 0 = unbounded
    pub max_length: usize,
    /// HTTP server port
    pub server_port: u16,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_STORAGE` - Storage engine name (default: memory)
    /// - `CACHE_STRATEGY` - Strategy name (default: expiring)
    /// - `CACHE_MAX_AGE_MS` - Default TTL in ms (default: 60000)
    /// - `CACHE_CLEAN_INTERVAL_MS` - Bucket granularity in ms (default: 1000)
    /// - `CACHE_MAX_LENGTH` - Soft key-count bound (default: 0, unbounded)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            storage: env::var("CACHE_STORAGE").unwrap_or(defaults.storage),
            strategy: env::var("CACHE_STRATEGY").unwrap_or(defaults.strategy),
            max_age_ms: parse_env("CACHE_MAX_AGE_MS").unwrap_or(defaults.max_age_ms),
            clean_interval_ms: parse_env("CACHE_CLEAN_INTERVAL_MS")
                .unwrap_or(defaults.clean_interval_ms),
            max_length: parse_env("CACHE_MAX_LENGTH").unwrap_or(defaults.max_length),
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    pub fn with_storage(mut self, name: impl Into<String>) -> Self {
        self.storage = name.into();
        self
    }

    pub fn with_strategy(mut self, name: impl Into<String>) -> Self {
        self.strategy = name.into();
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age_ms = millis(max_age);
        self
    }

    pub fn with_clean_interval(mut self, interval: Duration) -> Self {
        self.clean_interval_ms = millis(interval);
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Default TTL as a Duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }

    /// Bucket granularity as a Duration.
    pub fn clean_interval(&self) -> Duration {
        Duration::from_millis(self.clean_interval_ms)
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            storage: "memory".to_string(),
            strategy: "expiring".to_string(),
            max_age_ms: 60_000,
            clean_interval_ms: 1_000,
            max_length: 0,
            server_port: 3000,
        }
    }
}
