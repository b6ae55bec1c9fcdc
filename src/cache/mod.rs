//! Cache Module
//!
//! The application-facing surface: the name registry, the initialized cache
//! facade, and function memoization on top of it.

mod facade;
mod memoize;
mod registry;

// Re-export public types
pub use facade::Cache;
pub use memoize::{memoize, Memoized};
pub use registry::{EngineFactory, Registry, StrategyFactory};
