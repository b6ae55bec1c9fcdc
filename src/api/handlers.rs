//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<Cache<String>>,
}

impl AppState {
    pub fn new(cache: Cache<String>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Builds and initializes the cache named by the configuration.
    ///
    /// Must be called inside a tokio runtime when the strategy expires
    /// entries.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Ok(Self::new(Cache::init(config)?))
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    match req.ttl() {
        Some(ttl) => state.cache.put_with_ttl_sync(&req.key, req.value, ttl)?,
        None => state.cache.put_sync(&req.key, req.value)?,
    }
    debug!(key = %req.key, ttl_ms = ?req.ttl_ms, "Key set");

    Ok(Json(SetResponse::new(req.key, req.ttl_ms)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache
        .get_sync(&key)?
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let value = state
        .cache
        .remove_sync(&key)?
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(DeleteResponse::new(key, value)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let cache = &state.cache;

    Ok(Json(StatsResponse::new(
        cache.strategy_name(),
        cache.len()?,
        cache.stats(),
    )))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
