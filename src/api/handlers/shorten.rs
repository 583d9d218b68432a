//! Handler for the shortening endpoint.

use axum::{Extension, Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::application::services::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Allocates a slug for a URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path", "slug": "my-link" }
/// ```
///
/// `slug` is optional; omit it (or send `""`) to get a generated one.
///
/// # Response
///
/// `201 Created` for a new mapping, `200 OK` when an existing mapping for the
/// same URL is returned:
///
/// ```json
/// {
///   "short_url": "http://localhost:3000/r/Ab3dE6gH1j",
///   "slug": "Ab3dE6gH1j",
///   "slug_type": "auto-generated",
///   "expires_at": "2025-01-01T13:00:00Z",
///   "reused": false
/// }
/// ```
///
/// # Errors
///
/// - `400` - invalid body
/// - `401` - missing or invalid token (unless anonymous shortening is enabled)
/// - `409` - requested slug is taken
/// - `503` - no free slug found within the attempt limit
pub async fn shorten_handler(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Json(mut payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.slug = payload.slug.filter(|s| !s.is_empty());
    payload.validate()?;

    let owner_id = user.map(|Extension(u)| u.id);

    let allocation = state
        .allocation_service
        .allocate(&payload.url, owner_id, payload.slug)
        .await?;

    let status = if allocation.reused {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let short_url = state.short_url(&allocation.slug);

    Ok((status, Json(ShortenResponse::new(allocation, short_url))))
}
