//! Storage Module
//!
//! The capability contract shared by storage engines and strategies, and the
//! reference in-memory engine.

mod deferred;
mod memory;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::CacheConfig;
use crate::error::Result;
use crate::strategy::ExpiryStats;

// Re-export public types
pub use deferred::Deferred;
pub use memory::MemoryEngine;

// == Storage Engine Contract ==
/// Uniform get/put/remove contract.
///
/// Every storage engine implements it, and so does every strategy, which is
/// how a strategy wraps an engine (or another strategy) transparently.
///
/// All operations except `init` and the capability probes fail with
/// [`CacheError::NotConfigured`](crate::error::CacheError::NotConfigured)
/// until `init` has run. A missing key is `Ok(None)`, never an error.
///
/// The deferred forms (`get`, `put`, `remove`) perform their mutation
/// immediately and return a [`Deferred`] that resolves on a later turn.
pub trait StorageEngine<V>: Send + Sync {
    /// Prepares the engine. Calling it again is a no-op.
    fn init(&self, config: &CacheConfig) -> Result<()>;

    fn is_initialized(&self) -> bool;

    fn get_sync(&self, key: &str) -> Result<Option<V>>;

    /// Stores `value`, replacing any previous value for `key`.
    fn put_sync(&self, key: &str, value: V) -> Result<()>;

    /// Removes `key`, returning the value it held.
    fn remove_sync(&self, key: &str) -> Result<Option<V>>;

    /// Stores `value` with an explicit time-to-live.
    ///
    /// Components without an expiry capability store it without one.
    fn put_with_ttl_sync(&self, key: &str, value: V, _ttl: Duration) -> Result<()> {
        self.put_sync(key, value)
    }

    /// Number of stored entries.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }

    fn supports_synchronous(&self) -> bool {
        true
    }

    fn supports_expiry(&self) -> bool {
        false
    }

    /// Scheduler counters, when an expiring strategy is in the pipeline.
    fn expiry_stats(&self) -> Option<ExpiryStats> {
        None
    }

    /// Cancels background work (pending timers). Stored entries are kept.
    fn shutdown(&self) {}

    fn get(&self, key: &str) -> Result<Deferred<Option<V>>> {
        self.get_sync(key).map(Deferred::new)
    }

    fn put(&self, key: &str, value: V) -> Result<Deferred<()>> {
        self.put_sync(key, value).map(Deferred::new)
    }

    fn put_with_ttl(&self, key: &str, value: V, ttl: Duration) -> Result<Deferred<()>> {
        self.put_with_ttl_sync(key, value, ttl).map(Deferred::new)
    }

    fn remove(&self, key: &str) -> Result<Deferred<Option<V>>> {
        self.remove_sync(key).map(Deferred::new)
    }
}

/// An owned, type-erased engine or strategy.
pub type BoxedEngine<V> = Box<dyn StorageEngine<V>>;

/// Locks a mutex, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
