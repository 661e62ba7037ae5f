//! PostgreSQL implementation of the link store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info};

use super::PoolSettings;
use crate::domain::entities::{CreateOutcome, Link};
use crate::domain::repositories::{LinkStore, StoreError};

/// Unique constraint on `(owner_id, long_url)`.
const OWNER_URL_CONSTRAINT: &str = "links_owner_url_key";

#[derive(sqlx::FromRow)]
struct LinkRow {
    short_code: String,
    owner_id: String,
    long_url: String,
    is_deleted: bool,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Self {
            owner_id: row.owner_id,
            code: row.short_code,
            long_url: row.long_url,
            deleted: row.is_deleted,
        }
    }
}

/// PostgreSQL link store.
///
/// The `links` table enforces both uniqueness rules: the primary key on
/// `short_code` and the `(owner_id, long_url)` constraint.
pub struct PgLinkStore {
    pool: PgPool,
    closed: AtomicBool,
}

impl PgLinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            closed: AtomicBool::new(false),
        }
    }

    /// Builds a pool without connecting. The first query (usually
    /// [`LinkStore::ping`]) opens the first connection.
    ///
    /// # Errors
    ///
    /// Fails if `database_url` cannot be parsed.
    pub fn connect_lazy(database_url: &str, settings: &PoolSettings) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_lazy(database_url)?;

        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    async fn find_by_owner_url(&self, owner_id: &str, long_url: &str) -> Result<Link, StoreError> {
        let row: LinkRow = sqlx::query_as(
            r#"
            SELECT short_code, owner_id, long_url, is_deleted
            FROM links
            WHERE owner_id = $1 AND long_url = $2
            "#,
        )
        .bind(owner_id)
        .bind(long_url)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}

/// Splits connectivity failures from query failures.
fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolClosed => StoreError::Closed,
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl LinkStore for PgLinkStore {
    async fn store(&self, link: Link) -> Result<(Link, CreateOutcome), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO links (short_code, owner_id, long_url)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&link.code)
        .bind(&link.owner_id)
        .bind(&link.long_url)
        .execute(&self.pool)
        .await;

        let e = match result {
            Ok(_) => return Ok((link, CreateOutcome::Created)),
            Err(e) => e,
        };

        let violated = e
            .as_database_error()
            .filter(|db| db.is_unique_violation())
            .map(|db| db.constraint() == Some(OWNER_URL_CONSTRAINT));

        match violated {
            Some(true) => {
                let existing = self.find_by_owner_url(&link.owner_id, &link.long_url).await?;
                debug!(code = %existing.code, owner_id = %existing.owner_id, "Link already exists for owner");
                Ok((existing, CreateOutcome::Conflict))
            }
            Some(false) => Err(StoreError::CodeTaken { code: link.code }),
            None => Err(map_sqlx_error(e)),
        }
    }

    async fn find(&self, code: &str) -> Result<Option<Link>, StoreError> {
        let row: Option<LinkRow> = sqlx::query_as(
            r#"
            SELECT short_code, owner_id, long_url, is_deleted
            FROM links
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Link::from))
    }

    async fn find_all_for_owner(&self, owner_id: &str) -> Result<Vec<Link>, StoreError> {
        let rows: Vec<LinkRow> = sqlx::query_as(
            r#"
            SELECT short_code, owner_id, long_url, is_deleted
            FROM links
            WHERE owner_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn mark_deleted_batch(&self, owner_id: &str, codes: &[String]) -> Result<(), StoreError> {
        if codes.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r#"
            UPDATE links
            SET is_deleted = TRUE
            WHERE owner_id = $1 AND short_code = ANY($2)
            "#,
        )
        .bind(owner_id)
        .bind(codes)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        debug!(
            owner_id = %owner_id,
            requested = codes.len(),
            updated = result.rows_affected(),
            "Links marked as deleted"
        );

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.pool.close().await;
        info!("PostgreSQL link store closed");

        Ok(())
    }
}
