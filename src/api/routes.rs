//! Owner-scoped route configuration.
//!
//! Every route here needs an owner, provided by
//! [`crate::api::middleware::owner`].

use crate::api::handlers::{
    delete_user_urls_handler, list_user_urls_handler, shorten_batch_handler, shorten_handler,
    shorten_text_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes that create, list or delete the caller's links.
///
/// # Endpoints
///
/// - `POST   /`                   - Shorten a plain-text URL
/// - `POST   /api/shorten`        - Shorten a JSON `{"url"}`
/// - `POST   /api/shorten/batch`  - Shorten several URLs
/// - `GET    /api/user/urls`      - List the owner's active links
/// - `DELETE /api/user/urls`      - Schedule deletion of the owner's links
pub fn owner_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(shorten_text_handler))
        .route("/api/shorten", post(shorten_handler))
        .route("/api/shorten/batch", post(shorten_batch_handler))
        .route(
            "/api/user/urls",
            get(list_user_urls_handler).delete(delete_user_urls_handler),
        )
}
