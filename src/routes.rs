//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /{version}/{business_unit}/{link_code}` - Smart redirect (public)
//! - `GET /health`                                - Health check: DB, cache, sticky store, queue
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling
//!
//! Rate limiting runs inside the redirect handler rather than as a layer:
//! the key depends on proxy-header IP extraction and, optionally, the link
//! code, both of which are only known there.

use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/{version}/{business_unit}/{link_code}",
            get(redirect_handler),
        )
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
