//! Handlers for the owner's own links.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::user_urls::UserUrl;
use crate::api::middleware::owner::Owner;
use crate::domain::delete_request::DeleteRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the active links of the requesting owner.
///
/// # Endpoint
///
/// `GET /api/user/urls`
///
/// # Response
///
/// - **200 OK**: `[{"short_url": ..., "original_url": ...}]`
/// - **204 No Content**: the owner has no active links
pub async fn list_user_urls_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
) -> Result<Response, AppError> {
    let urls: Vec<UserUrl> = state
        .link_service
        .list_for_owner(&owner_id)
        .await?
        .into_iter()
        .filter(|link| !link.is_deleted())
        .map(|link| UserUrl {
            short_url: state.short_url(&link.code),
            original_url: link.long_url,
        })
        .collect();

    if urls.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    Ok(Json(urls).into_response())
}

/// Schedules deletion of the owner's links.
///
/// # Endpoint
///
/// `DELETE /api/user/urls`
///
/// # Request Body
///
/// ```json
/// ["aB3dE", "x9YzQ"]
/// ```
///
/// # Response
///
/// **202 Accepted** once the request is queued. Links turn `410 Gone` after
/// the next flush of the deletion worker. Codes of other owners are ignored.
///
/// # Errors
///
/// - **400 Bad Request**: no codes given
/// - **503 Service Unavailable**: the queue stayed full past the deadline or
///   is shutting down
pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Json(codes): Json<Vec<String>>,
) -> Result<StatusCode, AppError> {
    let request = DeleteRequest::new(owner_id, codes);
    if request.is_empty() {
        return Err(AppError::bad_request("No short codes given", json!({})));
    }

    state
        .deletion
        .enqueue_within(request, state.delete_enqueue_timeout)
        .await?;

    Ok(StatusCode::ACCEPTED)
}
