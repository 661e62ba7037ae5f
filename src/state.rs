//! Shared application state injected into every handler.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{LinkService, OwnerService};
use crate::domain::deletion_worker::DeletionPipeline;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub deletion: DeletionPipeline,
    pub owner_service: Arc<OwnerService>,
    /// Prefix of returned short URLs, without a trailing slash.
    pub base_url: String,
    /// How long a delete request may wait for queue space.
    pub delete_enqueue_timeout: Duration,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService>,
        deletion: DeletionPipeline,
        owner_service: Arc<OwnerService>,
        base_url: impl Into<String>,
        delete_enqueue_timeout: Duration,
    ) -> Self {
        Self {
            link_service,
            deletion,
            owner_service,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            delete_enqueue_timeout,
        }
    }

    /// Builds the public short URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }
}
