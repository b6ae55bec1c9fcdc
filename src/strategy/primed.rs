//! Primed Strategy Module
//!
//! Bulk pre-population of a cache, either in one synchronous pass or as a
//! concurrent fan-out whose completion is signalled exactly once.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::storage::{BoxedEngine, StorageEngine};
use crate::strategy::{ExpiryStats, PrimeGroup, Strategy};

// == Prime Key ==
/// An item handed to a fill function: a bare key, or a key with arguments.
pub trait PrimeKey {
    /// The cache key the fill result is stored under.
    fn cache_key(&self) -> &str;
}

impl PrimeKey for String {
    fn cache_key(&self) -> &str {
        self
    }
}

impl PrimeKey for &str {
    fn cache_key(&self) -> &str {
        self
    }
}

impl<A> PrimeKey for (String, A) {
    fn cache_key(&self) -> &str {
        &self.0
    }
}

impl<A> PrimeKey for (&str, A) {
    fn cache_key(&self) -> &str {
        self.0
    }
}

// == Prime Completion ==
/// Completion handle passed to each asynchronous fill.
///
/// Calling [`complete`](Self::complete) stores the value (or removes the
/// key when there is none) and counts the fill as finished. A handle that is
/// dropped without completing leaves the prime pending for good.
pub struct PrimeCompletion<V> {
    key: String,
    target: Arc<dyn StorageEngine<V>>,
    group: Arc<PrimeGroup>,
    completed: bool,
}

impl<V> PrimeCompletion<V> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Delivers the fill result. `None` means no data exists for the key.
    pub fn complete(mut self, value: Option<V>) {
        let result = match value {
            Some(value) => self.target.put_sync(&self.key, value),
            None => self.target.remove_sync(&self.key).map(|_| ()),
        };
        if let Err(err) = result {
            warn!(key = %self.key, error = %err, "Failed to store primed value");
        }
        self.completed = true;
        self.group.done();
    }
}

impl<V> Drop for PrimeCompletion<V> {
    fn drop(&mut self) {
        if !self.completed {
            warn!(key = %self.key, "Prime fill dropped its completion; prime will not finish");
        }
    }
}

// == Prime Wait ==
/// Future returned by [`PrimedStrategy::prime_all`].
///
/// Resolves to `Ok(())` once every fill has completed, or to
/// `Err(CacheError::PrimeAbandoned)` when a fill dropped its completion and
/// nothing can finish the prime any more.
#[must_use = "futures do nothing unless awaited"]
pub struct PrimeWait {
    rx: oneshot::Receiver<()>,
}

impl Future for PrimeWait {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.map_err(|_| CacheError::PrimeAbandoned))
    }
}

// == Primed Strategy ==
/// Decorator adding bulk priming to a wrapped engine or strategy.
///
/// Every get/put/remove delegates unchanged, so wrapping an
/// [`ExpiringStrategy`](crate::strategy::ExpiringStrategy) gives primed
/// entries the usual expiry.
pub struct PrimedStrategy<V> {
    inner: Arc<dyn StorageEngine<V>>,
}

impl<V> PrimedStrategy<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    pub fn new(inner: BoxedEngine<V>) -> Self {
        Self {
            inner: Arc::from(inner),
        }
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.inner.is_initialized() {
            Ok(())
        } else {
            Err(CacheError::NotConfigured)
        }
    }

    // == Prime Sync ==
    /// Calls `fill` once per item, in order, storing each `Some` result.
    ///
    /// # Example
    /// ```ignore
    /// primed.prime_sync(["a", "b"], |key| Some(key.to_uppercase()))?;
    /// ```
    pub fn prime_sync<I, F>(&self, keys: I, mut fill: F) -> Result<()>
    where
        I: IntoIterator,
        I::Item: PrimeKey,
        F: FnMut(&I::Item) -> Option<V>,
    {
        self.ensure_configured()?;

        let mut stored = 0usize;
        for item in keys {
            if let Some(value) = fill(&item) {
                self.inner.put_sync(item.cache_key(), value)?;
                stored += 1;
            }
        }
        debug!(stored, "Primed cache synchronously");
        Ok(())
    }

    // == Prime ==
    /// Dispatches one fill per item and runs `on_complete` once all of them
    /// have completed.
    ///
    /// Each fill receives its item and a [`PrimeCompletion`]; it may complete
    /// inline or hand the completion to a spawned task. `on_complete` runs
    /// exactly once, never before every item has been dispatched, and
    /// immediately for an empty input.
    pub fn prime<I, F, C>(&self, keys: I, mut fill: F, on_complete: C) -> Result<()>
    where
        I: IntoIterator,
        I::Item: PrimeKey,
        F: FnMut(I::Item, PrimeCompletion<V>),
        C: FnOnce() + Send + 'static,
    {
        self.ensure_configured()?;

        let group = PrimeGroup::new(on_complete);
        let mut dispatched = 0usize;
        for item in keys {
            group.add();
            let completion = PrimeCompletion {
                key: item.cache_key().to_string(),
                target: Arc::clone(&self.inner),
                group: Arc::clone(&group),
                completed: false,
            };
            fill(item, completion);
            dispatched += 1;
        }
        debug!(dispatched, "Dispatched prime fills");
        group.done();
        Ok(())
    }

    // == Prime All ==
    /// Like [`prime`](Self::prime), returning a future instead of taking a
    /// completion callback.
    pub fn prime_all<I, F>(&self, keys: I, fill: F) -> Result<PrimeWait>
    where
        I: IntoIterator,
        I::Item: PrimeKey,
        F: FnMut(I::Item, PrimeCompletion<V>),
    {
        let (tx, rx) = oneshot::channel();
        self.prime(keys, fill, move || {
            let _ = tx.send(());
        })?;
        Ok(PrimeWait { rx })
    }
}

impl<V> StorageEngine<V> for PrimedStrategy<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn init(&self, config: &CacheConfig) -> Result<()> {
        self.inner.init(config)
    }

    fn is_initialized(&self) -> bool {
        self.inner.is_initialized()
    }

    fn get_sync(&self, key: &str) -> Result<Option<V>> {
        self.inner.get_sync(key)
    }

    fn put_sync(&self, key: &str, value: V) -> Result<()> {
        self.inner.put_sync(key, value)
    }

    fn put_with_ttl_sync(&self, key: &str, value: V, ttl: Duration) -> Result<()> {
        self.inner.put_with_ttl_sync(key, value, ttl)
    }

    fn remove_sync(&self, key: &str) -> Result<Option<V>> {
        self.inner.remove_sync(key)
    }

    fn len(&self) -> Result<usize> {
        self.inner.len()
    }

    fn supports_synchronous(&self) -> bool {
        self.inner.supports_synchronous()
    }

    fn supports_expiry(&self) -> bool {
        self.inner.supports_expiry()
    }

    fn expiry_stats(&self) -> Option<ExpiryStats> {
        self.inner.expiry_stats()
    }

    fn shutdown(&self) {
        self.inner.shutdown()
    }
}

impl<V> Strategy<V> for PrimedStrategy<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "primed"
    }

    fn as_primed(&self) -> Option<&PrimedStrategy<V>> {
        Some(self)
    }
}
