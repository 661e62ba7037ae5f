//! Storage trait for short links.

use crate::domain::entities::{CreateOutcome, Link};
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by [`LinkStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The short code is already taken by an unrelated record.
    ///
    /// Not a conflict: the caller is expected to retry with a fresh code.
    #[error("short code already taken: {code}")]
    CodeTaken { code: String },

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("store is closed")]
    Closed,

    #[error("journal I/O failed: {0}")]
    Journal(#[from] std::io::Error),

    #[error("journal line {line} is not a valid record: {source}")]
    CorruptJournal {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode journal record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("database query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Durable mapping of short code → (owner, long URL, deleted flag).
///
/// Every backend must behave identically for every method below; the backend
/// is picked at deployment time via [`crate::infrastructure::persistence::open_store`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryLinkStore`] - lock-guarded table with a JSON-lines journal
/// - [`crate::infrastructure::persistence::PgLinkStore`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Inserts a new link keyed by its short code.
    ///
    /// # Returns
    ///
    /// - `(link, CreateOutcome::Created)` on a fresh insert
    /// - `(existing, CreateOutcome::Conflict)` if the owner already has a link
    ///   for the same long URL; nothing is inserted
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CodeTaken`] if the short code belongs to another record.
    async fn store(&self, link: Link) -> Result<(Link, CreateOutcome), StoreError>;

    /// Finds a link by short code regardless of owner or deleted flag.
    async fn find(&self, code: &str) -> Result<Option<Link>, StoreError>;

    /// Returns every link created by `owner_id`, deleted ones included.
    ///
    /// Order is not guaranteed.
    async fn find_all_for_owner(&self, owner_id: &str) -> Result<Vec<Link>, StoreError>;

    /// Marks the given codes owned by `owner_id` as deleted.
    ///
    /// Unknown codes and codes of other owners are skipped silently, which
    /// makes the call idempotent and safe to retry.
    async fn mark_deleted_batch(&self, owner_id: &str, codes: &[String]) -> Result<(), StoreError>;

    /// Liveness check.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot be reached.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Releases backend resources. Only the first call has an effect.
    async fn close(&self) -> Result<(), StoreError>;
}
