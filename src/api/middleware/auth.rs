//! Bearer token authentication middleware.
//!
//! Both layers insert [`CurrentUser`] as a request extension on success, so
//! handlers read the caller with `Extension<CurrentUser>` (or
//! `Option<Extension<CurrentUser>>` behind [`optional_layer`]).

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::application::services::CurrentUser;
use crate::{error::AppError, state::AppState};

/// Requires a valid bearer token.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// Returns `401 Unauthorized` (with `WWW-Authenticate: Bearer`) if the header
/// is missing, malformed, or the token is invalid or expired.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let user = authenticate(&st, &mut parts).await?;
    parts.extensions.insert(user);

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Like [`layer`], but lets requests without an `Authorization` header
/// through when anonymous shortening is enabled.
///
/// A header that is present but invalid is always rejected.
pub async fn optional_layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    if st.allow_anonymous && !parts.headers.contains_key(header::AUTHORIZATION) {
        return Ok(next.run(Request::from_parts(parts, body)).await);
    }

    let user = authenticate(&st, &mut parts).await?;
    parts.extensions.insert(user);

    Ok(next.run(Request::from_parts(parts, body)).await)
}

async fn authenticate(st: &AppState, parts: &mut Parts) -> Result<CurrentUser, AppError> {
    let AuthBearer(token) = AuthBearer::from_request_parts(parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Not authenticated",
                json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    st.auth_service.authenticate(&token).await
}
