//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use serde_json::json;

use crate::domain::entities::Resolution;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Any client may follow any code; ownership only matters for listing and
/// deleting.
///
/// # Errors
///
/// - **404 Not Found**: the code was never issued
/// - **410 Gone**: the owner deleted the link
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    match state.link_service.resolve(&code).await? {
        Resolution::Found(link) => Ok(Redirect::temporary(&link.long_url)),
        Resolution::NotFound => Err(AppError::not_found(
            "Short link not found",
            json!({ "code": code }),
        )),
        Resolution::Gone => Err(AppError::gone(
            "Short link has been deleted",
            json!({ "code": code }),
        )),
    }
}
