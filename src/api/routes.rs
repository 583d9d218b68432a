//! API route configuration.
//!
//! Mounted under `/api` by [`crate::routes::app_router`].

use crate::api::handlers::{
    login_handler, shorten_handler, signup_handler, stats_handler, stats_list_handler,
};
use crate::api::middleware::auth;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// All API routes with their authentication layers.
///
/// # Endpoints
///
/// - `POST /auth/signup`   - Register an account (public)
/// - `POST /auth/login`    - Obtain a bearer token (public)
/// - `POST /shorten`       - Allocate a slug (token required unless anonymous shortening is on)
/// - `GET  /stats`         - The caller's mappings with counters (token required)
/// - `GET  /stats/{slug}`  - Counters for one slug (token required)
pub fn api_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler));

    let shorten = Router::new()
        .route("/shorten", post(shorten_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::optional_layer,
        ));

    let protected = Router::new()
        .route("/stats", get(stats_list_handler))
        .route("/stats/{slug}", get(stats_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    public.merge(shorten).merge(protected)
}
