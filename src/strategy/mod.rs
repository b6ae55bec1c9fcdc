//! Strategy Module
//!
//! Decorators over a storage engine: time-based expiry and bulk priming.
//! A strategy satisfies the same [`StorageEngine`] contract it wraps, so
//! strategies stack (a primed cache over an expiring one, for instance).

mod expiring;
mod prime_group;
mod primed;
mod scheduler;
mod stats;

#[cfg(test)]
mod property_tests;

use crate::storage::StorageEngine;

// Re-export public types
pub use expiring::ExpiringStrategy;
pub use prime_group::PrimeGroup;
pub use primed::{PrimeCompletion, PrimeKey, PrimeWait, PrimedStrategy};
pub use stats::ExpiryStats;

// == Strategy Contract ==
/// A storage engine decorator that can be selected by name.
pub trait Strategy<V>: StorageEngine<V> {
    /// Registry name of the strategy.
    fn name(&self) -> &'static str;

    /// The priming surface, when this strategy offers one.
    fn as_primed(&self) -> Option<&PrimedStrategy<V>> {
        None
    }
}

/// An owned, type-erased strategy.
pub type BoxedStrategy<V> = Box<dyn Strategy<V>>;
