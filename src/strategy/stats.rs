//! Expiry Statistics Module
//!
//! Counters kept by the expiring strategy's scheduler.

use serde::Serialize;

// == Expiry Stats ==
/// Snapshot of the expiring strategy's scheduler state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpiryStats {
    /// Keys with a pending expiry
    pub keys: usize,
    /// Active cleanup buckets (one pending timer each)
    pub buckets: usize,
    /// Keys removed by bucket timers
    pub expired: u64,
    /// Keys removed ahead of expiry by the soft capacity bound
    pub evicted: u64,
}

impl ExpiryStats {
    // == Constructor ==
    /// Creates a new ExpiryStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }

    pub fn record_evicted(&mut self, count: usize) {
        self.evicted += count as u64;
    }

    /// Average number of keys sharing one timer, or 0.0 with no buckets.
    pub fn keys_per_bucket(&self) -> f64 {
        if self.buckets == 0 {
            0.0
        } else {
            self.keys as f64 / self.buckets as f64
        }
    }
}
