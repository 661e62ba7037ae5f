//! Owner identification middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::Response,
};
use serde_json::json;
use tracing::debug;

use crate::application::services::owner_service::SESSION_COOKIE;
use crate::{error::AppError, state::AppState};

/// Lifetime of an issued session cookie.
pub const SESSION_MAX_AGE_SECS: u64 = 3600;

/// Owner of the current request, inserted by [`layer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

impl<S: Send + Sync> FromRequestParts<S> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Owner>().cloned().ok_or_else(|| {
            AppError::internal("Owner middleware is not installed", json!({}))
        })
    }
}

/// Identifies the owner from the `user_session` cookie.
///
/// # Cookie Format
///
/// ```text
/// Cookie: user_session=<owner_id>.<hex hmac>
/// ```
///
/// - **Valid cookie**: the signed owner is used
/// - **No cookie**: a new owner is issued and a one-hour `Set-Cookie` is added to the response
/// - **Bad signature**: `401 Unauthorized`
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (owner_id, issued) = match session_cookie(req.headers()) {
        Some(value) => {
            let owner_id = st.owner_service.verify(&value).ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({ "reason": "Session cookie signature mismatch" }),
                )
            })?;
            (owner_id, None)
        }
        None => {
            let (owner_id, value) = st.owner_service.issue();
            debug!(owner_id = %owner_id, "Issued new owner session");
            (owner_id, Some(value))
        }
    };

    req.extensions_mut().insert(Owner(owner_id));

    let mut response = next.run(req).await;

    if let Some(value) = issued
        && let Ok(header) =
            HeaderValue::from_str(&format!(
                "{SESSION_COOKIE}={value}; Path=/; Max-Age={SESSION_MAX_AGE_SECS}; HttpOnly"
            ))
    {
        response.headers_mut().append(SET_COOKIE, header);
    }

    Ok(response)
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|cookie_header| cookie_header.to_str().ok())
        .flat_map(|cookie_str| cookie_str.split(';'))
        .find_map(|cookie| match cookie.trim().split_once('=') {
            Some((SESSION_COOKIE, value)) => Some(value.to_string()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; user_session=owner-1.abcd; lang=en"),
        );

        assert_eq!(session_cookie(&headers), Some("owner-1.abcd".to_string()));
    }

    #[test]
    fn test_session_cookie_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));

        assert_eq!(session_cookie(&headers), None);
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }
}
