//! Slug resolution service.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::access_tracker::AccessTracker;
use crate::domain::clock::Clock;
use crate::domain::entities::Mapping;
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Service resolving slugs back to their original URLs.
///
/// Every lookup of an existing slug is handed to the [`AccessTracker`],
/// including lookups that end in [`AppError::Expired`].
pub struct ResolutionService<M: MappingRepository + ?Sized> {
    mapping_repository: Arc<M>,
    cache: Arc<dyn CacheService>,
    tracker: Arc<dyn AccessTracker>,
    clock: Arc<dyn Clock>,
}

impl<M: MappingRepository + ?Sized> ResolutionService<M> {
    /// Creates a new resolution service.
    pub fn new(
        mapping_repository: Arc<M>,
        cache: Arc<dyn CacheService>,
        tracker: Arc<dyn AccessTracker>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            mapping_repository,
            cache,
            tracker,
            clock,
        }
    }

    /// Resolves `slug` to its original URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the slug was never allocated. No
    /// access is recorded in that case.
    /// Returns [`AppError::Expired`] if the mapping reached its expiry.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn resolve(&self, slug: &str) -> Result<String, AppError> {
        let Some(mapping) = self.lookup(slug).await? else {
            metrics::counter!("slug_resolutions_total", "outcome" => "not_found").increment(1);
            return Err(AppError::not_found(
                "Slug not found",
                json!({ "slug": slug }),
            ));
        };

        let now = self.clock.now();

        if let Err(e) = self.tracker.record(mapping.id, now).await {
            warn!("Failed to track access for {}: {}", slug, e);
        }

        if mapping.is_expired_at(now) {
            debug!("Slug {} expired at {}", slug, mapping.expires_at);
            metrics::counter!("slug_resolutions_total", "outcome" => "expired").increment(1);
            return Err(AppError::expired(
                "Slug has expired",
                json!({ "slug": slug, "expired_at": mapping.expires_at }),
            ));
        }

        metrics::counter!("slug_resolutions_total", "outcome" => "resolved").increment(1);
        Ok(mapping.original_url)
    }

    /// Looks a slug up in the cache, then the store, filling the cache on a
    /// store hit.
    async fn lookup(&self, slug: &str) -> Result<Option<Mapping>, AppError> {
        match self.cache.get_mapping(slug).await {
            Ok(Some(mapping)) => return Ok(Some(mapping)),
            Ok(None) => {}
            Err(e) => warn!("Cache lookup failed for {}: {}", slug, e),
        }

        let mapping = self.mapping_repository.find_by_slug(slug).await?;

        if let Some(ref mapping) = mapping
            && let Err(e) = self.cache.set_mapping(mapping, None).await
        {
            warn!("Failed to cache mapping {}: {}", slug, e);
        }

        Ok(mapping)
    }
}
