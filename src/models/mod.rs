//! Request and Response models for the cache server API
//!
//! DTOs serialized to and from the HTTP bodies of the server binary.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::SetRequest;
pub use responses::{DeleteResponse, GetResponse, HealthResponse, SetResponse, StatsResponse};
