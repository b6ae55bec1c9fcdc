//! Memoize Module
//!
//! Caches the results of a function keyed by its arguments.

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::error::Result;

/// Separator joining the arguments into one cache key.
const KEY_SEPARATOR: &str = "\0";

// == Memoized ==
/// A function whose results are cached by argument list.
pub struct Memoized<V, F> {
    cache: Cache<V>,
    func: F,
}

impl<V, F> Memoized<V, F>
where
    V: Clone + Send + Sync + 'static,
    F: Fn(&[&str]) -> V,
{
    /// Returns the cached result for `args`, computing and storing it on a
    /// miss.
    pub fn call(&self, args: &[&str]) -> Result<V> {
        let key = args.join(KEY_SEPARATOR);
        if let Some(value) = self.cache.get_sync(&key)? {
            return Ok(value);
        }
        let value = (self.func)(args);
        self.cache.put_sync(&key, value.clone())?;
        Ok(value)
    }

    /// The cache backing this function.
    pub fn cache(&self) -> &Cache<V> {
        &self.cache
    }
}

/// Wraps `func` with a cache built from `config`.
///
/// Without a config the memory engine with the expiring strategy is used,
/// which needs a tokio runtime.
pub fn memoize<V, F>(func: F, config: Option<&CacheConfig>) -> Result<Memoized<V, F>>
where
    V: Clone + Send + Sync + 'static,
    F: Fn(&[&str]) -> V,
{
    let default_config = CacheConfig::default();
    let cache = Cache::init(config.unwrap_or(&default_config))?;
    Ok(Memoized { cache, func })
}
