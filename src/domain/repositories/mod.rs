//! Storage trait definitions for the domain layer.
//!
//! The trait defines the contract for link persistence; implementations live in
//! `crate::infrastructure::persistence`. A `mockall` mock is generated for unit
//! tests.
//!
//! # Testing
//!
//! See integration tests in `tests/memory_link_store.rs` and
//! `tests/pg_link_store.rs` for usage examples.

pub mod link_store;

pub use link_store::{LinkStore, StoreError};

#[cfg(test)]
pub use link_store::MockLinkStore;
