//! PostgreSQL implementation of the access repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{AccessEvent, AccessSummary, NewAccessEvent};
use crate::domain::repositories::AccessRepository;
use crate::error::AppError;

#[derive(FromRow)]
struct AccessEventRow {
    id: i64,
    mapping_id: i64,
    accessed_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct SummaryRow {
    total: i64,
    last_accessed_at: Option<DateTime<Utc>>,
}

/// PostgreSQL repository for the access log.
pub struct PgAccessRepository {
    pool: Arc<PgPool>,
}

impl PgAccessRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessRepository for PgAccessRepository {
    async fn record(&self, event: NewAccessEvent) -> Result<AccessEvent, AppError> {
        let row = sqlx::query_as::<_, AccessEventRow>(
            r#"
            INSERT INTO access_events (mapping_id, accessed_at)
            VALUES ($1, $2)
            RETURNING id, mapping_id, accessed_at
            "#,
        )
        .bind(event.mapping_id)
        .bind(event.accessed_at)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_foreign_key_violation() => AppError::bad_request(
                "Mapping does not exist",
                json!({ "mapping_id": event.mapping_id }),
            ),
            _ => AppError::from(e),
        })?;

        Ok(AccessEvent::new(row.id, row.mapping_id, row.accessed_at))
    }

    async fn summary_for_mapping(&self, mapping_id: i64) -> Result<AccessSummary, AppError> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT COUNT(*) AS total, MAX(accessed_at) AS last_accessed_at
            FROM access_events
            WHERE mapping_id = $1
            "#,
        )
        .bind(mapping_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(AccessSummary {
            total: row.total,
            last_accessed_at: row.last_accessed_at,
        })
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM access_events")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
