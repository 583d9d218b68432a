use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use slug_shortener::domain::entities::{NewAccessEvent, NewMapping};
use slug_shortener::domain::repositories::{AccessRepository, InsertOutcome, MappingRepository};
use slug_shortener::error::AppError;
use slug_shortener::infrastructure::persistence::{PgAccessRepository, PgMappingRepository};

async fn create_mapping(pool: &PgPool, slug: &str) -> i64 {
    let repo = PgMappingRepository::new(Arc::new(pool.clone()));
    match repo
        .insert(
            NewMapping::with_ttl(
                format!("https://example.com/{slug}"),
                slug.to_string(),
                None,
                Utc::now(),
                Duration::hours(1),
            )
            .unwrap(),
        )
        .await
        .unwrap()
    {
        InsertOutcome::Inserted(mapping) => mapping.id,
        InsertOutcome::SlugTaken => panic!("slug {slug} already taken"),
    }
}

fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + seconds, 0).unwrap()
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_record_access(pool: PgPool) {
    let mapping_id = create_mapping(&pool, "rec").await;
    let repo = PgAccessRepository::new(Arc::new(pool));

    let event = repo
        .record(NewAccessEvent::new(mapping_id, at(0)))
        .await
        .unwrap();

    assert_eq!(event.mapping_id, mapping_id);
    assert_eq!(event.accessed_at, at(0));
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_record_for_missing_mapping(pool: PgPool) {
    let repo = PgAccessRepository::new(Arc::new(pool));

    let result = repo.record(NewAccessEvent::new(999_999, at(0))).await;

    assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_summary_for_mapping(pool: PgPool) {
    let tracked = create_mapping(&pool, "tracked").await;
    let other = create_mapping(&pool, "other").await;
    let repo = PgAccessRepository::new(Arc::new(pool));

    for seconds in [5, 1, 3] {
        repo.record(NewAccessEvent::new(tracked, at(seconds)))
            .await
            .unwrap();
    }
    repo.record(NewAccessEvent::new(other, at(100)))
        .await
        .unwrap();

    let summary = repo.summary_for_mapping(tracked).await.unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.last_accessed_at, Some(at(5)));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_summary_without_accesses(pool: PgPool) {
    let mapping_id = create_mapping(&pool, "quiet").await;
    let repo = PgAccessRepository::new(Arc::new(pool));

    let summary = repo.summary_for_mapping(mapping_id).await.unwrap();
    assert_eq!(summary.total, 0);
    assert!(summary.last_accessed_at.is_none());
}
