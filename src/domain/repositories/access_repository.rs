//! Repository trait for the access log.

use crate::domain::entities::{AccessEvent, AccessSummary, NewAccessEvent};
use crate::error::AppError;
use async_trait::async_trait;

/// Append-only storage for [`AccessEvent`]s.
///
/// Events require no ordering relative to each other; each one references
/// exactly one mapping.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAccessRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryAccessRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessRepository: Send + Sync {
    /// Appends an access event.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the referenced mapping does not exist.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn record(&self, event: NewAccessEvent) -> Result<AccessEvent, AppError>;

    /// Returns total accesses and the latest access time for a mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn summary_for_mapping(&self, mapping_id: i64) -> Result<AccessSummary, AppError>;

    /// Counts every recorded access.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count(&self) -> Result<i64, AppError>;
}
