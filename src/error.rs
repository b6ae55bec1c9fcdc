//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Lookup misses are never
//! errors: engines and strategies report them as `Ok(None)`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for engines, strategies and the HTTP surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Operation attempted on an engine or strategy that was never initialized
    #[error("Cache is not configured")]
    NotConfigured,

    /// Registry lookup miss for a storage engine name
    #[error("Could not load cache storage engine: {0}")]
    UnknownStorage(String),

    /// Registry lookup miss for a strategy name
    #[error("Could not load cache strategy: {0}")]
    UnknownStrategy(String),

    /// Configuration value out of range
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),

    /// Timer-driven strategies need a tokio runtime at init
    #[error("Cache strategy requires a running tokio runtime")]
    RuntimeUnavailable,

    /// Every handle able to finish a prime was dropped before completing
    #[error("Cache prime was abandoned before every fill completed")]
    PrimeAbandoned,

    /// Key not found (HTTP layer only)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data (HTTP layer only)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CacheError {
    // == Symbolic Code ==
    /// Returns the stable symbolic code for programmatic matching.
    pub fn code(&self) -> &'static str {
        match self {
            CacheError::NotConfigured => "CACHE_NOT_CONFIGURED",
            CacheError::UnknownStorage(_) => "CACHE_UNKNOWN_STORAGE",
            CacheError::UnknownStrategy(_) => "CACHE_UNKNOWN_STRATEGY",
            CacheError::InvalidConfig(_) => "CACHE_INVALID_CONFIG",
            CacheError::RuntimeUnavailable => "CACHE_RUNTIME_UNAVAILABLE",
            CacheError::PrimeAbandoned => "CACHE_PRIME_ABANDONED",
            CacheError::NotFound(_) => "CACHE_KEY_NOT_FOUND",
            CacheError::InvalidRequest(_) => "CACHE_INVALID_REQUEST",
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::NotConfigured
            | CacheError::UnknownStorage(_)
            | CacheError::UnknownStrategy(_)
            | CacheError::InvalidConfig(_)
            | CacheError::RuntimeUnavailable
            | CacheError::PrimeAbandoned => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
