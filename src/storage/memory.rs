//! Memory Engine Module
//!
//! Reference storage engine: an unbounded HashMap with no eviction policy.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::storage::{lock, StorageEngine};

// == Memory Engine ==
/// Unordered in-memory key-value storage.
///
/// The map is `None` until `init` runs, which is how calls made before
/// initialization are detected.
#[derive(Debug)]
pub struct MemoryEngine<V> {
    /// Key-value storage
    entries: Mutex<Option<HashMap<String, V>>>,
}

impl<V> MemoryEngine<V> {
    // == Constructor ==
    /// Creates an uninitialized engine.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(None),
        }
    }

    fn with_entries<R>(&self, f: impl FnOnce(&mut HashMap<String, V>) -> R) -> Result<R> {
        let mut guard = lock(&self.entries);
        let entries = guard.as_mut().ok_or(CacheError::NotConfigured)?;
        Ok(f(entries))
    }
}

impl<V> Default for MemoryEngine<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> StorageEngine<V> for MemoryEngine<V>
where
    V: Clone + Send + Sync,
{
    fn init(&self, _config: &CacheConfig) -> Result<()> {
        lock(&self.entries).get_or_insert_with(HashMap::new);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        lock(&self.entries).is_some()
    }

    fn get_sync(&self, key: &str) -> Result<Option<V>> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn put_sync(&self, key: &str, value: V) -> Result<()> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    fn remove_sync(&self, key: &str) -> Result<Option<V>> {
        self.with_entries(|entries| entries.remove(key))
    }

    fn len(&self) -> Result<usize> {
        self.with_entries(|entries| entries.len())
    }
}
