//! Handler for slug redirects.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use tracing::error;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a slug to its original URL.
///
/// # Endpoint
///
/// `GET /r/{slug}`
///
/// # Request Flow
///
/// 1. Resolve the slug (cache, then store)
/// 2. Queue an access event for the background worker
/// 3. Reject expired mappings
/// 4. Return 307 Temporary Redirect
///
/// # Errors
///
/// - `404` - the slug was never allocated (no access is recorded)
/// - `410` - the mapping expired (the access is still recorded)
/// - `500` - the stored URL is not a valid `Location` header value
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let original_url = state.resolution_service.resolve(&slug).await?;

    let location = HeaderValue::try_from(original_url).map_err(|e| {
        error!("Stored URL for slug {} is not a valid header: {}", slug, e);
        AppError::internal(
            "Stored URL cannot be redirected to",
            json!({ "slug": slug }),
        )
    })?;

    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]))
}
