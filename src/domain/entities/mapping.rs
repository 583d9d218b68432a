//! Mapping entity binding a slug to its original URL.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;

/// A slug bound to an original URL.
///
/// Mappings are created once by the allocation service and never mutated
/// afterwards. The slug is unique across every mapping ever stored, including
/// expired ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub id: i64,
    pub original_url: String,
    pub slug: String,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Mapping {
    /// Creates a new Mapping instance.
    pub fn new(
        id: i64,
        original_url: String,
        slug: String,
        owner_id: Option<i64>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            original_url,
            slug,
            owner_id,
            created_at,
            expires_at,
        }
    }

    /// Returns true once `now` has reached `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns true if `user_id` owns this mapping.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == Some(user_id)
    }
}

/// Input data for reserving a new mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMapping {
    pub original_url: String,
    pub slug: String,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewMapping {
    /// Builds a mapping reservation that expires `ttl` after `created_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the expiry falls outside the
    /// representable date range.
    pub fn with_ttl(
        original_url: String,
        slug: String,
        owner_id: Option<i64>,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, AppError> {
        let expires_at = created_at.checked_add_signed(ttl).ok_or_else(|| {
            AppError::internal(
                "Mapping expiry is out of range",
                json!({ "ttl_seconds": ttl.num_seconds() }),
            )
        })?;

        Ok(Self {
            original_url,
            slug,
            owner_id,
            created_at,
            expires_at,
        })
    }

    /// Materializes the reservation once the store has assigned an id.
    pub fn into_mapping(self, id: i64) -> Mapping {
        Mapping::new(
            id,
            self.original_url,
            self.slug,
            self.owner_id,
            self.created_at,
            self.expires_at,
        )
    }
}
