//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Link`] - An owned short code → long URL mapping with a soft-delete flag
//! - [`CreateOutcome`] - Whether a create inserted a record or hit an existing one
//! - [`Resolution`] - Outcome of looking a code up for a redirect

pub mod link;

pub use link::{CreateOutcome, Link, Resolution};
