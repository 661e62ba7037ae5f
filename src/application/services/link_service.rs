//! Link creation and resolution service.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::entities::{CreateOutcome, Link, Resolution};
use crate::domain::repositories::{LinkStore, StoreError};
use crate::error::AppError;
use crate::utils::code_generator::CodeGenerator;
use crate::utils::url_validator::validate_url;

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Service for creating and resolving short links.
///
/// Pairs a [`CodeGenerator`] with a [`LinkStore`] and enforces the per-owner
/// idempotency rule: shortening the same URL twice yields the same code.
pub struct LinkService {
    store: Arc<dyn LinkStore>,
    generator: Arc<dyn CodeGenerator>,
    max_attempts: usize,
}

impl LinkService {
    pub fn new(store: Arc<dyn LinkStore>, generator: Arc<dyn CodeGenerator>) -> Self {
        Self::with_max_attempts(store, generator, DEFAULT_MAX_ATTEMPTS)
    }

    pub fn with_max_attempts(
        store: Arc<dyn LinkStore>,
        generator: Arc<dyn CodeGenerator>,
        max_attempts: usize,
    ) -> Self {
        Self {
            store,
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Creates a short link for `owner_id`.
    ///
    /// # Returns
    ///
    /// - `(link, CreateOutcome::Created)` for a new link
    /// - `(existing, CreateOutcome::Conflict)` if the owner already shortened
    ///   this exact URL; no new code is generated for a conflict
    ///
    /// # Code Generation
    ///
    /// A fresh code is generated whenever the store reports the candidate as
    /// taken, up to `max_attempts` candidates in total.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL is not an absolute HTTP(S) URL or
    ///   the owner is empty; the store is not touched
    /// - [`AppError::ExhaustedRetries`] if every candidate code was taken
    /// - [`AppError::StoreUnavailable`] / [`AppError::Internal`] on storage failures
    pub async fn create_short_link(
        &self,
        owner_id: &str,
        long_url: &str,
    ) -> Result<(Link, CreateOutcome), AppError> {
        if owner_id.trim().is_empty() {
            return Err(AppError::bad_request("Owner is required", json!({})));
        }

        let long_url = validate_url(long_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        for attempt in 1..=self.max_attempts {
            let code = self.generator.generate();
            let candidate = Link::new(owner_id, code, long_url.as_str());

            match self.store.store(candidate).await {
                Ok(stored) => return Ok(stored),
                Err(StoreError::CodeTaken { code }) => {
                    debug!(code = %code, attempt, "Short code collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            owner_id = %owner_id,
            attempts = self.max_attempts,
            "Every generated short code was taken, code length is too small for the link count"
        );

        Err(AppError::exhausted_retries(
            "Failed to generate unique code",
            json!({ "attempts": self.max_attempts }),
        ))
    }

    /// Looks a code up for a redirect. Ownership is not checked.
    pub async fn resolve(&self, code: &str) -> Result<Resolution, AppError> {
        let resolution = match self.store.find(code).await? {
            None => Resolution::NotFound,
            Some(link) if link.is_deleted() => Resolution::Gone,
            Some(link) => Resolution::Found(link),
        };

        Ok(resolution)
    }

    /// Every link the owner created, deleted ones included.
    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Link>, AppError> {
        Ok(self.store.find_all_for_owner(owner_id).await?)
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        Ok(self.store.ping().await?)
    }
}
