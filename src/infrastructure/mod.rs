//! Infrastructure layer for external integrations.
//!
//! Implements [`crate::domain::repositories::LinkStore`] on top of a journal
//! file and on top of PostgreSQL.
//!
//! # Modules
//!
//! - [`persistence`] - Store implementations and the backend factory

pub mod persistence;
