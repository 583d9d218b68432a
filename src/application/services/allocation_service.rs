//! Slug allocation service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::domain::clock::Clock;
use crate::domain::entities::{Mapping, NewMapping};
use crate::domain::repositories::{InsertOutcome, MappingRepository};
use crate::error::AppError;
use crate::utils::slug_generator::SlugGenerator;

/// Result of a successful allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub slug: String,
    /// True when the caller asked for a specific slug. On reuse this reflects
    /// the request, not how the stored mapping was originally created.
    pub was_custom: bool,
    /// True when an existing mapping for the same URL was returned.
    pub reused: bool,
    pub expires_at: DateTime<Utc>,
}

impl Allocation {
    fn from_mapping(mapping: Mapping, was_custom: bool, reused: bool) -> Self {
        Self {
            slug: mapping.slug,
            was_custom,
            reused,
            expires_at: mapping.expires_at,
        }
    }
}

/// Service binding original URLs to unique slugs.
///
/// Uniqueness is decided by [`MappingRepository::insert`]; the lookups done
/// here only avoid a wasted insert. Losing an insert race is treated exactly
/// like a collision found by lookup.
pub struct AllocationService<M: MappingRepository + ?Sized> {
    mapping_repository: Arc<M>,
    generator: Arc<dyn SlugGenerator>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl<M: MappingRepository + ?Sized> AllocationService<M> {
    /// Creates a new allocation service.
    pub fn new(
        mapping_repository: Arc<M>,
        generator: Arc<dyn SlugGenerator>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            mapping_repository,
            generator,
            clock,
            config,
        }
    }

    /// Engine settings this service was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Allocates a slug for `original_url`.
    ///
    /// # Reuse
    ///
    /// If any mapping already exists for the exact same URL (any owner), its
    /// slug is returned and nothing is written. Two concurrent first-time
    /// calls for one URL may still both create mappings.
    ///
    /// # Custom slugs
    ///
    /// A non-empty `requested_slug` is reserved as-is. An empty string is
    /// treated as no request.
    ///
    /// # Generated slugs
    ///
    /// The first candidate has `min_slug_length` characters; each collision
    /// grows the next candidate by one, for at most `max_attempts` candidates.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the requested slug is taken.
    /// Returns [`AppError::Exhausted`] if every generated candidate collided.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn allocate(
        &self,
        original_url: &str,
        owner_id: Option<i64>,
        requested_slug: Option<String>,
    ) -> Result<Allocation, AppError> {
        let requested_slug = requested_slug.filter(|s| !s.is_empty());
        let was_custom = requested_slug.is_some();

        if let Some(existing) = self
            .mapping_repository
            .find_by_original_url(original_url)
            .await?
        {
            debug!("Reusing slug {} for existing URL", existing.slug);
            metrics::counter!("slug_allocations_total", "kind" => "reused").increment(1);
            return Ok(Allocation::from_mapping(existing, was_custom, true));
        }

        let mapping = match requested_slug {
            Some(slug) => self.reserve_custom(original_url, owner_id, slug).await?,
            None => self.reserve_generated(original_url, owner_id).await?,
        };

        Ok(Allocation::from_mapping(mapping, was_custom, false))
    }

    async fn reserve_custom(
        &self,
        original_url: &str,
        owner_id: Option<i64>,
        slug: String,
    ) -> Result<Mapping, AppError> {
        if self.mapping_repository.find_by_slug(&slug).await?.is_some() {
            return Err(slug_conflict(&slug));
        }

        match self
            .mapping_repository
            .insert(self.new_mapping(original_url, owner_id, slug.clone())?)
            .await?
        {
            InsertOutcome::Inserted(mapping) => {
                metrics::counter!("slug_allocations_total", "kind" => "custom").increment(1);
                Ok(mapping)
            }
            InsertOutcome::SlugTaken => Err(slug_conflict(&slug)),
        }
    }

    async fn reserve_generated(
        &self,
        original_url: &str,
        owner_id: Option<i64>,
    ) -> Result<Mapping, AppError> {
        let mut length = self.config.min_slug_length;

        for attempt in 1..=self.config.max_attempts {
            let candidate = self.generator.generate(length);

            if self
                .mapping_repository
                .find_by_slug(&candidate)
                .await?
                .is_none()
            {
                match self
                    .mapping_repository
                    .insert(self.new_mapping(original_url, owner_id, candidate)?)
                    .await?
                {
                    InsertOutcome::Inserted(mapping) => {
                        metrics::counter!("slug_allocations_total", "kind" => "generated")
                            .increment(1);
                        return Ok(mapping);
                    }
                    InsertOutcome::SlugTaken => {}
                }
            }

            debug!("Slug collision at length {} (attempt {})", length, attempt);
            metrics::counter!("slug_collisions_total").increment(1);
            length += 1;
        }

        warn!(
            "Slug allocation exhausted after {} attempts (last length {})",
            self.config.max_attempts,
            length - 1
        );
        metrics::counter!("slug_allocation_exhausted_total").increment(1);

        Err(AppError::exhausted(
            "Failed to allocate a unique slug",
            json!({ "attempts": self.config.max_attempts }),
        ))
    }

    fn new_mapping(
        &self,
        original_url: &str,
        owner_id: Option<i64>,
        slug: String,
    ) -> Result<NewMapping, AppError> {
        NewMapping::with_ttl(
            original_url.to_string(),
            slug,
            owner_id,
            self.clock.now(),
            self.config.ttl,
        )
    }
}

fn slug_conflict(slug: &str) -> AppError {
    AppError::conflict("Slug already exists", json!({ "slug": slug }))
}
