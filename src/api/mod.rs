//! API Module
//!
//! HTTP handlers and routing exposing a `Cache<String>`.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair, optionally with `ttl_ms`
//! - `GET /get/:key` - Retrieve a value by key
//! - `DELETE /del/:key` - Remove a key, returning its value
//! - `GET /stats` - Strategy name, entry count and expiry counters
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
