//! Handlers for signup and login.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::auth::{LoginRequest, SignupRequest, TokenResponse, UserResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Registers an account.
///
/// # Endpoint
///
/// `POST /api/auth/signup`
///
/// # Errors
///
/// - `400` - a field is empty or the email is malformed
/// - `409` - username or email already registered
pub async fn signup_handler(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    payload.validate()?;

    let user = state
        .auth_service
        .signup(&payload.username, &payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Exchanges credentials for a bearer token.
///
/// # Endpoint
///
/// `POST /api/auth/login`
///
/// # Response
///
/// ```json
/// { "access_token": "eyJ...", "token_type": "bearer" }
/// ```
///
/// # Errors
///
/// - `401` - unknown user or wrong password
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.validate()?;

    let token = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(TokenResponse::bearer(token)))
}
