//! Stratacache - an embeddable key/value cache
//!
//! Pluggable storage engines behind one contract, decorated by strategies
//! that expire entries on a bucketed schedule or prime them in bulk.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod strategy;
pub mod tasks;

pub use api::AppState;
pub use cache::{memoize, Cache, Memoized, Registry};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use storage::{Deferred, MemoryEngine, StorageEngine};
pub use strategy::{ExpiringStrategy, ExpiryStats, PrimedStrategy, Strategy};
