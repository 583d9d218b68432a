//! Cache service trait and error types.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::Mapping;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Read-through cache of mappings keyed by slug.
///
/// Implementations must be thread-safe and fail open: a cache failure
/// degrades to a store lookup and never fails a resolution.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the mapping for a slug from cache.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(mapping))` on cache hit
    /// - `Ok(None)` on cache miss or error (fail-open behavior)
    async fn get_mapping(&self, slug: &str) -> CacheResult<Option<Mapping>>;

    /// Stores a mapping under its slug.
    ///
    /// `ttl_seconds` falls back to the implementation default when `None`.
    ///
    /// # Errors
    ///
    /// Should not propagate errors to callers. Implementations should log errors
    /// and return `Ok(())` to avoid disrupting the request flow.
    async fn set_mapping(&self, mapping: &Mapping, ttl_seconds: Option<u64>) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    ///
    /// Used by health check endpoints to report cache status.
    async fn health_check(&self) -> bool;
}
