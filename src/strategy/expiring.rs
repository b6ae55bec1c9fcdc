//! Expiring Strategy Module
//!
//! Per-key time-to-live on top of any storage engine, enforced by bucketed
//! deferred eviction: keys whose expiry rounds to the same cleanup tick share
//! one timer task.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, info, trace, warn};

use crate::config::{millis, CacheConfig};
use crate::error::{CacheError, Result};
use crate::storage::{lock, BoxedEngine, StorageEngine};
use crate::strategy::scheduler::{bucket_time, BucketTable, Clock};
use crate::strategy::{ExpiryStats, Strategy};
use crate::tasks::spawn_bucket_timer;

// == Expiring Strategy ==
/// Decorator adding TTL expiry to a wrapped engine.
///
/// `get` is a pure pass-through (reads never refresh a TTL). `put` stores
/// through the engine and moves the key into the cleanup bucket for
/// `round_up(now + ttl, clean_interval)`. `remove` also detaches the key from
/// its bucket, so a timer never removes a key twice.
///
/// With `max_length > 0`, a put that takes the key count over the bound
/// evicts keys from the earliest buckets first.
///
/// Bucket timers run on the tokio runtime that was current at `init`.
/// Dropping the strategy aborts them.
pub struct ExpiringStrategy<V> {
    shared: Arc<Shared<V>>,
}

struct Shared<V> {
    engine: BoxedEngine<V>,
    /// `None` until init
    state: Mutex<Option<ExpiryState>>,
}

struct ExpiryState {
    max_age: Duration,
    clean_interval_ms: u64,
    max_length: usize,
    clock: Clock,
    runtime: Handle,
    table: BucketTable,
    stats: ExpiryStats,
}

impl<V> ExpiringStrategy<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Wraps `engine`. Nothing is usable until [`StorageEngine::init`].
    pub fn new(engine: BoxedEngine<V>) -> Self {
        Self {
            shared: Arc::new(Shared {
                engine,
                state: Mutex::new(None),
            }),
        }
    }

    /// Scheduler counters; all zero before init.
    pub fn stats(&self) -> ExpiryStats {
        let guard = lock(&self.shared.state);
        match guard.as_ref() {
            Some(state) => ExpiryStats {
                keys: state.table.len(),
                buckets: state.table.bucket_count(),
                ..state.stats.clone()
            },
            None => ExpiryStats::new(),
        }
    }

    /// Bucket time (Unix ms) at which `key` is scheduled to expire.
    pub fn bucket_of(&self, key: &str) -> Option<u64> {
        lock(&self.shared.state)
            .as_ref()
            .and_then(|state| state.table.bucket_of(key))
    }

    fn ensure_configured(&self) -> Result<()> {
        if lock(&self.shared.state).is_some() {
            Ok(())
        } else {
            Err(CacheError::NotConfigured)
        }
    }
}

impl<V> Shared<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Schedule ==
    fn schedule(self: &Arc<Self>, state: &mut ExpiryState, key: &str, ttl: Duration) -> Result<()> {
        let now_ms = state.clock.now_ms();
        let at_ms = bucket_time(now_ms, millis(ttl), state.clean_interval_ms);

        let weak = Arc::downgrade(self);
        let clock = state.clock;
        let runtime = &state.runtime;
        state.table.schedule(key, at_ms, |at_ms, timer_id| {
            debug!(bucket = at_ms, delay_ms = at_ms - now_ms, "Arming cleanup bucket");
            Some(spawn_bucket_timer(runtime, clock.deadline(at_ms), move || {
                if let Some(shared) = weak.upgrade() {
                    shared.sweep(at_ms, timer_id);
                }
            }))
        });
        trace!(key, bucket = at_ms, "Scheduled expiry");

        let evicted = state.table.evict_overflow(state.max_length);
        if !evicted.is_empty() {
            let mut removed = 0;
            for key in &evicted {
                match self.engine.remove_sync(key) {
                    Ok(_) => removed += 1,
                    Err(err) => warn!(key = %key, error = %err, "Failed to evict key"),
                }
            }
            state.stats.record_evicted(removed);
            debug!(
                count = removed,
                max_length = state.max_length,
                "Evicted keys over the soft capacity bound"
            );
        }
        Ok(())
    }

    // == Sweep ==
    /// Timer callback: removes every key still in the bucket.
    fn sweep(&self, at_ms: u64, timer_id: u64) {
        let mut guard = lock(&self.state);
        let Some(state) = guard.as_mut() else {
            return;
        };
        let Some(keys) = state.table.take_due(at_ms, timer_id) else {
            trace!(bucket = at_ms, "Stale bucket timer ignored");
            return;
        };

        for key in &keys {
            if let Err(err) = self.engine.remove_sync(key) {
                warn!(key = %key, error = %err, "Failed to remove expired key");
            }
        }
        state.stats.record_expired(keys.len());
        debug!(bucket = at_ms, expired = keys.len(), "Swept cleanup bucket");
    }
}

impl<V> StorageEngine<V> for ExpiringStrategy<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn init(&self, config: &CacheConfig) -> Result<()> {
        let mut guard = lock(&self.shared.state);
        if guard.is_some() {
            return Ok(());
        }
        if config.clean_interval_ms == 0 {
            return Err(CacheError::InvalidConfig(
                "clean_interval_ms must be greater than zero".to_string(),
            ));
        }
        let runtime = Handle::try_current().map_err(|_| CacheError::RuntimeUnavailable)?;
        self.shared.engine.init(config)?;

        *guard = Some(ExpiryState {
            max_age: config.max_age(),
            clean_interval_ms: config.clean_interval_ms,
            max_length: config.max_length,
            clock: Clock::new(),
            runtime,
            table: BucketTable::new(),
            stats: ExpiryStats::new(),
        });
        info!(
            max_age_ms = config.max_age_ms,
            clean_interval_ms = config.clean_interval_ms,
            max_length = config.max_length,
            "Expiring strategy initialized"
        );
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        lock(&self.shared.state).is_some()
    }

    fn get_sync(&self, key: &str) -> Result<Option<V>> {
        self.ensure_configured()?;
        self.shared.engine.get_sync(key)
    }

    fn put_sync(&self, key: &str, value: V) -> Result<()> {
        let mut guard = lock(&self.shared.state);
        let state = guard.as_mut().ok_or(CacheError::NotConfigured)?;
        let ttl = state.max_age;
        self.shared.engine.put_sync(key, value)?;
        self.shared.schedule(state, key, ttl)
    }

    fn put_with_ttl_sync(&self, key: &str, value: V, ttl: Duration) -> Result<()> {
        let mut guard = lock(&self.shared.state);
        let state = guard.as_mut().ok_or(CacheError::NotConfigured)?;
        self.shared.engine.put_sync(key, value)?;
        self.shared.schedule(state, key, ttl)
    }

    fn remove_sync(&self, key: &str) -> Result<Option<V>> {
        let mut guard = lock(&self.shared.state);
        let state = guard.as_mut().ok_or(CacheError::NotConfigured)?;
        let removed = self.shared.engine.remove_sync(key)?;
        state.table.detach(key);
        Ok(removed)
    }

    fn len(&self) -> Result<usize> {
        self.ensure_configured()?;
        self.shared.engine.len()
    }

    fn supports_synchronous(&self) -> bool {
        self.shared.engine.supports_synchronous()
    }

    fn supports_expiry(&self) -> bool {
        true
    }

    fn expiry_stats(&self) -> Option<ExpiryStats> {
        Some(self.stats())
    }

    fn shutdown(&self) {
        if let Some(state) = lock(&self.shared.state).as_mut() {
            let pending = state.table.bucket_count();
            state.table.clear();
            debug!(pending, "Cancelled bucket timers");
        }
        self.shared.engine.shutdown();
    }
}

impl<V> Strategy<V> for ExpiringStrategy<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "expiring"
    }
}

impl<V> Drop for ExpiringStrategy<V> {
    fn drop(&mut self) {
        if let Some(state) = lock(&self.shared.state).as_mut() {
            state.table.clear();
        }
    }
}
