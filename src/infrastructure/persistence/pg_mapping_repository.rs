//! PostgreSQL implementation of the mapping repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Mapping, NewMapping};
use crate::domain::repositories::{InsertOutcome, MappingRepository};
use crate::error::AppError;

#[derive(FromRow)]
struct MappingRow {
    id: i64,
    original_url: String,
    slug: String,
    owner_id: Option<i64>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<MappingRow> for Mapping {
    fn from(r: MappingRow) -> Self {
        Mapping::new(
            r.id,
            r.original_url,
            r.slug,
            r.owner_id,
            r.created_at,
            r.expires_at,
        )
    }
}

/// PostgreSQL repository for mappings.
///
/// Slug uniqueness rests on the `mappings_slug_key` constraint; inserts use
/// `ON CONFLICT DO NOTHING` so a taken slug is an empty result, not an error.
pub struct PgMappingRepository {
    pool: Arc<PgPool>,
}

impl PgMappingRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MappingRepository for PgMappingRepository {
    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<Mapping>, AppError> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT id, original_url, slug, owner_id, created_at, expires_at
            FROM mappings
            WHERE original_url = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Mapping::from))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Mapping>, AppError> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT id, original_url, slug, owner_id, created_at, expires_at
            FROM mappings
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Mapping::from))
    }

    async fn insert(&self, new_mapping: NewMapping) -> Result<InsertOutcome, AppError> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            INSERT INTO mappings (original_url, slug, owner_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (slug) DO NOTHING
            RETURNING id, original_url, slug, owner_id, created_at, expires_at
            "#,
        )
        .bind(&new_mapping.original_url)
        .bind(&new_mapping.slug)
        .bind(new_mapping.owner_id)
        .bind(new_mapping.created_at)
        .bind(new_mapping.expires_at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(match row {
            Some(row) => InsertOutcome::Inserted(row.into()),
            None => InsertOutcome::SlugTaken,
        })
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Mapping>, AppError> {
        let rows = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT id, original_url, slug, owner_id, created_at, expires_at
            FROM mappings
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Mapping::from).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mappings")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;

        Ok(())
    }
}
