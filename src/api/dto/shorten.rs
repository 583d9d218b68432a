//! DTOs for the shortening endpoint.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::application::services::Allocation;

/// Characters accepted in a caller-chosen slug.
static CUSTOM_SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("slug pattern is valid"));

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The URL to shorten. Stored exactly as sent.
    #[validate(
        length(min = 1, max = 2048),
        custom(function = "validate_url_chars", message = "URL must not contain control characters")
    )]
    pub url: String,

    /// Optional custom slug. An empty string means "generate one".
    #[validate(regex(path = "*CUSTOM_SLUG_REGEX", message = "Slug may only contain letters, digits, '-' and '_'"))]
    pub slug: Option<String>,
}

/// Rejects URLs that cannot be sent back in a `Location` header.
///
/// Tab is allowed; every other byte below 0x20 and DEL are not.
fn validate_url_chars(url: &str) -> Result<(), ValidationError> {
    if url.bytes().any(|b| (b < 0x20 && b != b'\t') || b == 0x7f) {
        return Err(ValidationError::new("control_characters"));
    }
    Ok(())
}

/// How the returned slug came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlugType {
    Custom,
    AutoGenerated,
}

/// Response for a successful shortening.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_url: String,
    pub slug: String,
    pub slug_type: SlugType,
    pub expires_at: DateTime<Utc>,
    /// True if an existing mapping for the same URL was returned.
    pub reused: bool,
}

impl ShortenResponse {
    pub fn new(allocation: Allocation, short_url: String) -> Self {
        Self {
            short_url,
            slug: allocation.slug,
            slug_type: if allocation.was_custom {
                SlugType::Custom
            } else {
                SlugType::AutoGenerated
            },
            expires_at: allocation.expires_at,
            reused: allocation.reused,
        }
    }
}
