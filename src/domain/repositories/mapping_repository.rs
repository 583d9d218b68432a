//! Repository trait for slug mappings.

use crate::domain::entities::{Mapping, NewMapping};
use crate::error::AppError;
use async_trait::async_trait;

/// Result of an attempt to reserve a slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The slug was free and the mapping is now stored.
    Inserted(Mapping),
    /// Another mapping already holds the slug. Nothing was written.
    SlugTaken,
}

/// Repository interface for the mapping store.
///
/// The store is the final arbiter of slug uniqueness: [`insert`](Self::insert)
/// must check and reserve in one atomic step, so two concurrent inserts of the
/// same slug produce exactly one [`InsertOutcome::Inserted`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMappingRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryMappingRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_mapping.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Finds a mapping by its exact original URL, regardless of owner.
    ///
    /// When several mappings share the URL, the oldest one is returned.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_original_url(&self, original_url: &str)
    -> Result<Option<Mapping>, AppError>;

    /// Finds a mapping by slug.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Mapping))` if found (expired or not)
    /// - `Ok(None)` if the slug was never allocated
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Mapping>, AppError>;

    /// Atomically reserves `new_mapping.slug`.
    ///
    /// A uniqueness violation on the slug is reported as
    /// [`InsertOutcome::SlugTaken`], never as an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn insert(&self, new_mapping: NewMapping) -> Result<InsertOutcome, AppError>;

    /// Lists mappings owned by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list_by_owner(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Mapping>, AppError>;

    /// Counts all stored mappings.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count(&self) -> Result<i64, AppError>;

    /// Checks that the store is reachable without touching mapping rows.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store does not answer.
    async fn ping(&self) -> Result<(), AppError>;
}
