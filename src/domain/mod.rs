//! Domain layer containing business entities and the deletion pipeline.
//!
//! Nothing in here knows about HTTP or about a concrete storage backend.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - The [`repositories::LinkStore`] trait
//! - [`delete_request`] - Soft-deletion request model
//! - [`deletion_worker`] - Bounded queue and batching worker for soft deletion
//!
//! # Deletion Flow
//!
//! 1. HTTP handler receives a delete request
//! 2. [`delete_request::DeleteRequest`] is sent to the bounded queue
//! 3. The worker buffers codes per owner and flushes by size or timer
//! 4. Flags are flipped via [`repositories::LinkStore::mark_deleted_batch`]

pub mod delete_request;
pub mod deletion_worker;
pub mod entities;
pub mod repositories;
