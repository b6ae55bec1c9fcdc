//! Background Tasks Module
//!
//! Contains the tokio tasks the strategies run without caller involvement.
//!
//! # Tasks
//! - Bucket timer: fires once at a bucket's deadline and sweeps it

mod bucket_timer;

pub use bucket_timer::spawn_bucket_timer;
