//! HTTP middleware for owner identification and observability.

pub mod owner;
pub mod tracing;
