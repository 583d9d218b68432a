//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /r/{slug}`    - Slug redirect (public)
//! - `GET  /health`      - Health check: store, access queue, cache (public)
//! - `/api/*`            - REST API, see [`crate::api::routes`]
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket
//! - **Authentication** - Bearer token on `/api` routes that need it
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Rate limiting keys on the peer address, so serve the result with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let api_router = api::routes::api_routes(&state).layer(rate_limit::secure_layer());

    let redirect_router = Router::new()
        .route("/r/{slug}", get(redirect_handler))
        .layer(rate_limit::layer());

    let router = Router::new()
        .merge(redirect_router)
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
