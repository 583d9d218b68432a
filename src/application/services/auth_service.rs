//! Account registration and login.

use std::sync::Arc;

use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::infrastructure::security::{JwtService, hash_password, verify_password};

/// Authenticated caller, as resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Service for signup, login and bearer token validation.
///
/// Passwords are stored as Argon2id hashes; tokens are HS256 JWTs whose
/// `sub` is the username and `uid` the user id.
pub struct AuthService<R: UserRepository + ?Sized> {
    repository: Arc<R>,
    jwt: JwtService,
}

impl<R: UserRepository + ?Sized> AuthService<R> {
    /// Creates a new authentication service.
    pub fn new(repository: Arc<R>, jwt: JwtService) -> Self {
        Self { repository, jwt }
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if any field is empty.
    /// Returns [`AppError::Conflict`] if the username or email is taken.
    /// Returns [`AppError::Internal`] on storage or hashing errors.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::bad_request(
                "Username, email and password are required",
                json!({}),
            ));
        }

        if self.repository.find_by_username(username).await?.is_some() {
            return Err(AppError::conflict(
                "Username already exists",
                json!({ "username": username }),
            ));
        }

        if self.repository.find_by_email(email).await?.is_some() {
            return Err(AppError::conflict(
                "Email already exists",
                json!({ "email": email }),
            ));
        }

        let password_hash = hash_password(password).map_err(|e| {
            error!("Password hashing failed: {}", e);
            AppError::internal("Failed to register user", json!({}))
        })?;

        let user = self
            .repository
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;

        info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// Verifies credentials and issues an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the user does not exist or the
    /// password does not match. Both cases produce the same message.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let invalid = || {
            AppError::unauthorized(
                "Incorrect username or password",
                json!({ "reason": "Invalid credentials" }),
            )
        };

        let user = self
            .repository
            .find_by_username(username)
            .await?
            .ok_or_else(invalid)?;

        let matches = verify_password(password, &user.password_hash).map_err(|e| {
            error!("Stored hash for user {} is unusable: {}", user.id, e);
            invalid()
        })?;

        if !matches {
            return Err(invalid());
        }

        self.jwt.issue(user.id, &user.username).map_err(|e| {
            error!("Token signing failed: {}", e);
            AppError::internal("Failed to issue token", json!({}))
        })
    }

    /// Validates a bearer token and resolves the account behind it.
    ///
    /// The token's `sub` must name an existing user whose id matches `uid`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is malformed, forged or
    /// expired, or its user no longer exists.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser, AppError> {
        let rejected = |reason: String| {
            AppError::unauthorized("Could not validate credentials", json!({ "reason": reason }))
        };

        let claims = self
            .jwt
            .validate(token)
            .map_err(|e| rejected(e.to_string()))?;

        match self.repository.find_by_username(&claims.sub).await? {
            Some(user) if user.id == claims.uid => Ok(CurrentUser {
                id: user.id,
                username: user.username,
            }),
            _ => {
                warn!("Token for unknown user {} (id {})", claims.sub, claims.uid);
                Err(rejected("User no longer exists".to_string()))
            }
        }
    }
}
