//! Link store implementations.
//!
//! # Stores
//!
//! - [`MemoryLinkStore`] - In-memory table with a JSON-lines journal
//! - [`PgLinkStore`] - PostgreSQL table
//!
//! [`open_store`] picks one from configuration.

pub mod memory_link_store;
pub mod pg_link_store;

pub use memory_link_store::MemoryLinkStore;
pub use pg_link_store::PgLinkStore;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::StorageBackend;
use crate::domain::repositories::{LinkStore, StoreError};

/// PostgreSQL pool settings.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Opens the configured store, ready for use.
///
/// The journal backend replays its file. The PostgreSQL backend is pinged
/// before migrations run, so an unreachable database fails here with
/// [`StoreError::Unavailable`].
pub async fn open_store(
    backend: &StorageBackend,
    pool: &PoolSettings,
) -> Result<Arc<dyn LinkStore>, StoreError> {
    match backend {
        StorageBackend::Memory { journal_path } => {
            let store = MemoryLinkStore::open(journal_path).await?;
            info!(path = %journal_path.display(), "Using memory link store");
            Ok(Arc::new(store))
        }
        StorageBackend::Postgres { database_url } => {
            let store = PgLinkStore::connect_lazy(database_url, pool)?;
            store.ping().await?;
            info!("Connected to database");
            store.migrate().await?;
            Ok(Arc::new(store))
        }
    }
}
