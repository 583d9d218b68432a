//! HS256 access tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::utils::slug_generator::generate_slug;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Username.
    pub sub: String,
    /// User id.
    pub uid: i64,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates access tokens.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_minutes: u64,
}

impl JwtService {
    pub fn new(secret: &str, access_token_minutes: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_minutes,
        }
    }

    /// Builds the service from an optional configured secret.
    ///
    /// Without a secret a random one is generated, so tokens do not survive
    /// a restart.
    pub fn from_secret(secret: Option<&str>, access_token_minutes: u64) -> Self {
        match secret.filter(|s| !s.is_empty()) {
            Some(secret) => Self::new(secret, access_token_minutes),
            None => {
                warn!("JWT_SECRET not configured, generating a random signing key");
                Self::new(&generate_slug(48), access_token_minutes)
            }
        }
    }

    /// Signs an access token for a user.
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: username.to_string(),
            uid: user_id,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.access_token_minutes as i64)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Verifies signature and expiry, returning the claims.
    pub fn validate(&self, token: &str) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        decode::<AccessClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
    }
}
