//! Handlers for link shortening endpoints.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{
    BatchShortenItem, BatchShortenResult, ShortenRequest, ShortenResponse,
};
use crate::api::middleware::owner::Owner;
use crate::domain::entities::CreateOutcome;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_validator::validate_url;

fn status_for(outcome: CreateOutcome) -> StatusCode {
    match outcome {
        CreateOutcome::Created => StatusCode::CREATED,
        CreateOutcome::Conflict => StatusCode::CONFLICT,
    }
}

/// Shortens the URL sent as the plain-text body.
///
/// # Endpoint
///
/// `POST /`
///
/// # Response
///
/// The short URL as `text/plain`:
///
/// - **201 Created**: new link
/// - **409 Conflict**: the owner already shortened this URL; the body holds
///   the existing short URL
/// - **400 Bad Request**: not an absolute HTTP(S) URL
pub async fn shorten_text_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    body: String,
) -> Result<Response, AppError> {
    let (link, outcome) = state
        .link_service
        .create_short_link(&owner_id, &body)
        .await?;

    Ok((
        status_for(outcome),
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.short_url(&link.code),
    )
        .into_response())
}

/// Shortens a single URL sent as JSON.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// ```json
/// { "result": "http://localhost:8080/aB3dE" }
/// ```
///
/// `201 Created` for a new link, `409 Conflict` with the existing short URL.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let (link, outcome) = state
        .link_service
        .create_short_link(&owner_id, &payload.url)
        .await?;

    Ok((
        status_for(outcome),
        Json(ShortenResponse {
            result: state.short_url(&link.code),
        }),
    ))
}

/// Shortens several URLs at once.
///
/// # Endpoint
///
/// `POST /api/shorten/batch`
///
/// # Request Body
///
/// ```json
/// [
///   { "correlation_id": "1", "original_url": "https://example.com/a" },
///   { "correlation_id": "2", "original_url": "https://example.com/b" }
/// ]
/// ```
///
/// # Response
///
/// `201 Created` with one `{correlation_id, short_url}` per item, in request
/// order. URLs the owner already shortened return their existing short URL.
///
/// # Errors
///
/// Every item is validated before anything is stored. An empty batch or an
/// invalid item fails the whole request with `400 Bad Request`.
pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Json(items): Json<Vec<BatchShortenItem>>,
) -> Result<(StatusCode, Json<Vec<BatchShortenResult>>), AppError> {
    if items.is_empty() {
        return Err(AppError::bad_request("Batch is empty", json!({})));
    }

    for item in &items {
        item.validate()?;
        validate_url(&item.original_url).map_err(|e| {
            AppError::bad_request(
                "Invalid URL format",
                json!({ "correlation_id": item.correlation_id, "reason": e.to_string() }),
            )
        })?;
    }

    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let (link, _) = state
            .link_service
            .create_short_link(&owner_id, &item.original_url)
            .await?;

        results.push(BatchShortenResult {
            correlation_id: item.correlation_id,
            short_url: state.short_url(&link.code),
        });
    }

    Ok((StatusCode::CREATED, Json(results)))
}
