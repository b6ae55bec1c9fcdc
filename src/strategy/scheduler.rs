//! Bucket Scheduler Module
//!
//! Groups independently TTLed keys into cleanup buckets aligned to a fixed
//! wall-clock grid, so the number of pending timers tracks the number of
//! distinct future bucket times instead of the number of keys.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::millis;

// == Bucket Time ==
/// Returns the bucket time for a key put at `now_ms` with `ttl_ms`.
///
/// `now + ttl` is rounded up to a multiple of `interval_ms`. The result is
/// always strictly after `now_ms`, so a zero TTL lands in the next bucket
/// instead of firing inline.
pub(crate) fn bucket_time(now_ms: u64, ttl_ms: u64, interval_ms: u64) -> u64 {
    let interval = interval_ms.max(1);
    let target = now_ms.saturating_add(ttl_ms);
    let rounded = target.div_ceil(interval).saturating_mul(interval);
    if rounded > now_ms {
        rounded
    } else {
        (now_ms / interval + 1).saturating_mul(interval)
    }
}

/// Deadline used when a bucket time lies past what `Instant` can represent.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

// == Clock ==
/// Wall-clock milliseconds driven by the tokio clock.
///
/// The wall time is sampled once; later readings add tokio's monotonic
/// elapsed time, which keeps bucket times and timer deadlines on the same
/// time base (and lets a paused test clock drive both).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Clock {
    anchor: Instant,
    anchor_ms: u64,
}

impl Clock {
    pub(crate) fn new() -> Self {
        Self {
            anchor: Instant::now(),
            anchor_ms: chrono::Utc::now().timestamp_millis().max(0) as u64,
        }
    }

    pub(crate) fn now_ms(&self) -> u64 {
        self.anchor_ms.saturating_add(millis(self.anchor.elapsed()))
    }

    /// Instant at which the wall-clock reading equals `at_ms`.
    pub(crate) fn deadline(&self, at_ms: u64) -> Instant {
        let offset = Duration::from_millis(at_ms.saturating_sub(self.anchor_ms));
        self.anchor
            .checked_add(offset)
            .unwrap_or_else(|| self.anchor + FAR_FUTURE)
    }
}

// == Bucket ==
#[derive(Debug)]
struct Bucket {
    /// Keys in insertion order
    keys: VecDeque<String>,
    /// Identifies the timer armed for this bucket
    timer_id: u64,
    timer: Option<JoinHandle<()>>,
}

impl Bucket {
    fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

// == Bucket Table ==
/// Cleanup buckets keyed by bucket time, plus the key→bucket index.
///
/// Invariants: a key sits in at most one bucket, the index names exactly
/// that bucket, and no bucket is ever empty.
#[derive(Debug, Default)]
pub(crate) struct BucketTable {
    /// Active buckets in ascending bucket-time order
    buckets: BTreeMap<u64, Bucket>,
    /// Key→bucket time
    index: HashMap<String, u64>,
    next_timer_id: u64,
}

impl BucketTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of scheduled keys.
    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    /// Number of active buckets, which equals the number of pending timers.
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn bucket_of(&self, key: &str) -> Option<u64> {
        self.index.get(key).copied()
    }

    // == Schedule ==
    /// Moves `key` into the bucket for `at_ms`.
    ///
    /// A previous membership is detached first. When the bucket is new,
    /// `arm(at_ms, timer_id)` is called to start its timer.
    pub(crate) fn schedule<F>(&mut self, key: &str, at_ms: u64, arm: F)
    where
        F: FnOnce(u64, u64) -> Option<JoinHandle<()>>,
    {
        if self.bucket_of(key) == Some(at_ms) {
            // Already there; keep its position in the bucket.
            return;
        }
        self.detach(key);

        if !self.buckets.contains_key(&at_ms) {
            self.next_timer_id += 1;
            let timer_id = self.next_timer_id;
            let timer = arm(at_ms, timer_id);
            self.buckets.insert(
                at_ms,
                Bucket {
                    keys: VecDeque::new(),
                    timer_id,
                    timer,
                },
            );
        }
        if let Some(bucket) = self.buckets.get_mut(&at_ms) {
            bucket.keys.push_back(key.to_string());
        }
        self.index.insert(key.to_string(), at_ms);
    }

    // == Detach ==
    /// Removes `key` from its bucket and the index.
    ///
    /// A bucket left empty has its timer cancelled and is discarded.
    /// Returns false if the key was not scheduled.
    pub(crate) fn detach(&mut self, key: &str) -> bool {
        let Some(at_ms) = self.index.remove(key) else {
            return false;
        };
        if let Some(bucket) = self.buckets.get_mut(&at_ms) {
            bucket.keys.retain(|k| k != key);
            if bucket.keys.is_empty() {
                bucket.cancel();
                self.buckets.remove(&at_ms);
            }
        }
        true
    }

    // == Take Due ==
    /// Removes the bucket at `at_ms` if it is still owned by `timer_id`,
    /// returning its keys in insertion order.
    ///
    /// A stale timer (its bucket was cancelled, or replaced by a new bucket
    /// at the same time) gets `None`.
    pub(crate) fn take_due(&mut self, at_ms: u64, timer_id: u64) -> Option<Vec<String>> {
        if self.buckets.get(&at_ms)?.timer_id != timer_id {
            return None;
        }
        let mut bucket = self.buckets.remove(&at_ms)?;
        // The firing timer is the caller; dropping the handle detaches it.
        bucket.timer = None;
        for key in &bucket.keys {
            self.index.remove(key);
        }
        Some(bucket.keys.into())
    }

    // == Evict Overflow ==
    /// Unschedules keys, oldest bucket first, until at most `bound` remain.
    ///
    /// A bound of 0 means unbounded. Returns the evicted keys in order.
    pub(crate) fn evict_overflow(&mut self, bound: usize) -> Vec<String> {
        let mut evicted = Vec::new();
        if bound == 0 {
            return evicted;
        }
        while self.index.len() > bound {
            let Some(mut entry) = self.buckets.first_entry() else {
                break;
            };
            let bucket = entry.get_mut();
            while self.index.len() > bound {
                let Some(key) = bucket.keys.pop_front() else {
                    break;
                };
                self.index.remove(&key);
                evicted.push(key);
            }
            if bucket.keys.is_empty() {
                bucket.cancel();
                entry.remove();
            }
        }
        evicted
    }

    /// Cancels every timer and forgets all schedules.
    pub(crate) fn clear(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.cancel();
        }
        self.buckets.clear();
        self.index.clear();
    }

    /// Checks the table's structural invariants.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut seen = 0;
        for (at_ms, bucket) in &self.buckets {
            assert!(!bucket.keys.is_empty(), "bucket {at_ms} is empty");
            for key in &bucket.keys {
                assert_eq!(self.index.get(key), Some(at_ms), "index mismatch for {key}");
                seen += 1;
            }
        }
        assert_eq!(seen, self.index.len(), "a key sits in more than one bucket");
    }
}
