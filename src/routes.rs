//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`   - Short link redirect (public)
//! - `GET  /ping`     - Store liveness (public)
//! - `GET  /health`   - Component health report (public)
//! - everything in [`crate::api::routes::owner_routes`] - owner cookie required
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Compression** - gzip responses, gzip request bodies accepted
//! - **Owner** - Signed session cookie, issued on first contact

use crate::api;
use crate::api::handlers::{health_handler, ping_handler, redirect_handler};
use crate::api::middleware::{owner, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    let owner_router = api::routes::owner_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), owner::layer));

    Router::new()
        .merge(owner_router)
        .route("/ping", get(ping_handler))
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(tracing::layer())
                .layer(CompressionLayer::new())
                .layer(RequestDecompressionLayer::new()),
        )
}
