//! Response DTOs for the cache server API

use serde::Serialize;

use crate::strategy::ExpiryStats;

/// Response body for `GET /get/:key`
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: String,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for `PUT /set`
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub message: String,
    pub key: String,
    /// Applied time to live, absent when the configured maximum age applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_ms: Option<u64>,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, ttl_ms: Option<u64>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
            ttl_ms,
        }
    }
}

/// Response body for `DELETE /del/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
    /// The value the key held when it was removed
    pub value: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
            value: value.into(),
        }
    }
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Name of the outermost strategy
    pub strategy: String,
    /// Current number of stored entries
    pub entries: usize,
    /// Scheduler counters, present for expiring pipelines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<ExpiryStats>,
}

impl StatsResponse {
    pub fn new(strategy: impl Into<String>, entries: usize, expiry: Option<ExpiryStats>) -> Self {
        Self {
            strategy: strategy.into(),
            entries,
            expiry,
        }
    }
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
