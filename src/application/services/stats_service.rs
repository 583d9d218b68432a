//! Access statistics service.

use std::sync::Arc;

use crate::domain::entities::{AccessSummary, Mapping};
use crate::domain::repositories::{AccessRepository, MappingRepository};
use crate::error::AppError;
use serde_json::json;

/// A mapping together with its access counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingStats {
    pub mapping: Mapping,
    pub summary: AccessSummary,
}

/// Read-only view over mappings and their access log.
pub struct StatsService<M: MappingRepository + ?Sized, A: AccessRepository + ?Sized> {
    mapping_repository: Arc<M>,
    access_repository: Arc<A>,
}

impl<M, A> StatsService<M, A>
where
    M: MappingRepository + ?Sized,
    A: AccessRepository + ?Sized,
{
    /// Creates a new statistics service.
    pub fn new(mapping_repository: Arc<M>, access_repository: Arc<A>) -> Self {
        Self {
            mapping_repository,
            access_repository,
        }
    }

    /// Returns counters for one slug.
    ///
    /// Anonymous mappings are readable by anyone; owned mappings only by
    /// their owner. Everyone else sees the slug as missing.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the slug does not exist or belongs
    /// to another user.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn mapping_stats(
        &self,
        slug: &str,
        requester_id: i64,
    ) -> Result<MappingStats, AppError> {
        let mapping = self
            .mapping_repository
            .find_by_slug(slug)
            .await?
            .filter(|m| m.owner_id.is_none() || m.is_owned_by(requester_id))
            .ok_or_else(|| AppError::not_found("Statistics not found", json!({ "slug": slug })))?;

        let summary = self
            .access_repository
            .summary_for_mapping(mapping.id)
            .await?;

        Ok(MappingStats { mapping, summary })
    }

    /// Lists the requester's mappings with their counters, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn owned_stats(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MappingStats>, AppError> {
        let mappings = self
            .mapping_repository
            .list_by_owner(owner_id, limit, offset)
            .await?;

        let mut items = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            let summary = self
                .access_repository
                .summary_for_mapping(mapping.id)
                .await?;
            items.push(MappingStats { mapping, summary });
        }

        Ok(items)
    }

    /// Checks that the mapping store answers.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store is unreachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.mapping_repository.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockAccessRepository, MockMappingRepository};
    use chrono::{Duration, Utc};

    fn mapping(id: i64, slug: &str, owner_id: Option<i64>) -> Mapping {
        let now = Utc::now();
        Mapping::new(
            id,
            "https://example.com".to_string(),
            slug.to_string(),
            owner_id,
            now,
            now + Duration::hours(1),
        )
    }

    #[tokio::test]
    async fn test_mapping_stats_for_owner() {
        let mut mock_mappings = MockMappingRepository::new();
        mock_mappings
            .expect_find_by_slug()
            .returning(|slug| Ok(Some(mapping(3, slug, Some(9)))));

        let mut mock_access = MockAccessRepository::new();
        let last = Utc::now();
        mock_access
            .expect_summary_for_mapping()
            .withf(|id| *id == 3)
            .times(1)
            .returning(move |_| {
                Ok(AccessSummary {
                    total: 5,
                    last_accessed_at: Some(last),
                })
            });

        let service = StatsService::new(Arc::new(mock_mappings), Arc::new(mock_access));

        let stats = service.mapping_stats("abc", 9).await.unwrap();
        assert_eq!(stats.mapping.slug, "abc");
        assert_eq!(stats.summary.total, 5);
        assert_eq!(stats.summary.last_accessed_at, Some(last));
    }

    #[tokio::test]
    async fn test_mapping_stats_hidden_from_other_users() {
        let mut mock_mappings = MockMappingRepository::new();
        mock_mappings
            .expect_find_by_slug()
            .returning(|slug| Ok(Some(mapping(3, slug, Some(9)))));

        let mut mock_access = MockAccessRepository::new();
        mock_access.expect_summary_for_mapping().times(0);

        let service = StatsService::new(Arc::new(mock_mappings), Arc::new(mock_access));

        let result = service.mapping_stats("abc", 10).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_mapping_stats_anonymous_mapping_visible() {
        let mut mock_mappings = MockMappingRepository::new();
        mock_mappings
            .expect_find_by_slug()
            .returning(|slug| Ok(Some(mapping(3, slug, None))));

        let mut mock_access = MockAccessRepository::new();
        mock_access
            .expect_summary_for_mapping()
            .returning(|_| Ok(AccessSummary::default()));

        let service = StatsService::new(Arc::new(mock_mappings), Arc::new(mock_access));

        let stats = service.mapping_stats("abc", 1).await.unwrap();
        assert_eq!(stats.summary.total, 0);
        assert!(stats.summary.last_accessed_at.is_none());
    }

    #[tokio::test]
    async fn test_mapping_stats_unknown_slug() {
        let mut mock_mappings = MockMappingRepository::new();
        mock_mappings.expect_find_by_slug().returning(|_| Ok(None));

        let service = StatsService::new(
            Arc::new(mock_mappings),
            Arc::new(MockAccessRepository::new()),
        );

        let result = service.mapping_stats("nope", 1).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_owned_stats_pairs_summaries() {
        let mut mock_mappings = MockMappingRepository::new();
        mock_mappings
            .expect_list_by_owner()
            .withf(|owner, limit, offset| *owner == 9 && *limit == 20 && *offset == 0)
            .returning(|owner, _, _| {
                Ok(vec![
                    mapping(2, "second", Some(owner)),
                    mapping(1, "first", Some(owner)),
                ])
            });

        let mut mock_access = MockAccessRepository::new();
        mock_access.expect_summary_for_mapping().returning(|id| {
            Ok(AccessSummary {
                total: id * 10,
                last_accessed_at: None,
            })
        });

        let service = StatsService::new(Arc::new(mock_mappings), Arc::new(mock_access));

        let items = service.owned_stats(9, 20, 0).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].mapping.slug, "second");
        assert_eq!(items[0].summary.total, 20);
        assert_eq!(items[1].summary.total, 10);
    }

    #[tokio::test]
    async fn test_ping_does_not_count() {
        let mut mock_mappings = MockMappingRepository::new();
        mock_mappings.expect_ping().times(1).returning(|| Ok(()));
        mock_mappings.expect_count().times(0);
        let mut mock_access = MockAccessRepository::new();
        mock_access.expect_count().times(0);

        let service = StatsService::new(Arc::new(mock_mappings), Arc::new(mock_access));

        assert!(service.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_ping_reports_storage_error() {
        let mut mock_mappings = MockMappingRepository::new();
        mock_mappings
            .expect_ping()
            .returning(|| Err(AppError::internal("Database error", json!({}))));

        let service = StatsService::new(
            Arc::new(mock_mappings),
            Arc::new(MockAccessRepository::new()),
        );

        assert!(matches!(
            service.ping().await.unwrap_err(),
            AppError::Internal { .. }
        ));
    }
}
