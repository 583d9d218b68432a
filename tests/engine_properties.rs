use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

use slug_shortener::application::services::{AllocationService, ResolutionService};
use slug_shortener::config::EngineConfig;
use slug_shortener::domain::access_tracker::QueuedAccessTracker;
use slug_shortener::domain::access_worker::run_access_worker;
use slug_shortener::domain::clock::ManualClock;
use slug_shortener::domain::entities::{NewAccessEvent, NewMapping};
use slug_shortener::domain::repositories::{AccessRepository, MappingRepository};
use slug_shortener::error::AppError;
use slug_shortener::infrastructure::cache::NullCache;
use slug_shortener::infrastructure::memory::{MemoryAccessRepository, MemoryMappingRepository};
use slug_shortener::utils::slug_generator::{RandomSlugGenerator, SlugGenerator};

/// Always proposes `x` repeated to the requested length.
struct RepeatingGenerator;

impl SlugGenerator for RepeatingGenerator {
    fn generate(&self, length: usize) -> String {
        "x".repeat(length)
    }
}

fn start() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
}

struct Engine {
    mappings: Arc<MemoryMappingRepository>,
    accesses: Arc<MemoryAccessRepository>,
    clock: Arc<ManualClock>,
    allocation: Arc<AllocationService<MemoryMappingRepository>>,
    resolution: ResolutionService<MemoryMappingRepository>,
    access_rx: mpsc::Receiver<NewAccessEvent>,
}

impl Engine {
    fn new(generator: Arc<dyn SlugGenerator>, config: EngineConfig) -> Self {
        let mappings = Arc::new(MemoryMappingRepository::new());
        let accesses = Arc::new(MemoryAccessRepository::new(mappings.clone()));
        let clock = Arc::new(ManualClock::new(start()));
        let (tx, access_rx) = mpsc::channel(1_000);

        let allocation = Arc::new(AllocationService::new(
            mappings.clone(),
            generator,
            clock.clone(),
            config,
        ));
        let resolution = ResolutionService::new(
            mappings.clone(),
            Arc::new(NullCache::new()),
            Arc::new(QueuedAccessTracker::new(tx)),
            clock.clone(),
        );

        Self {
            mappings,
            accesses,
            clock,
            allocation,
            resolution,
            access_rx,
        }
    }

    fn random() -> Self {
        Self::new(Arc::new(RandomSlugGenerator), EngineConfig::default())
    }

    /// Drops the resolution side and persists every queued access.
    async fn flush_accesses(self) -> Arc<MemoryAccessRepository> {
        let Engine {
            accesses,
            resolution,
            access_rx,
            ..
        } = self;
        drop(resolution);
        run_access_worker(access_rx, accesses.clone(), 2).await;
        accesses
    }

    async fn preload(&self, slug: &str) {
        self.mappings
            .insert(
                NewMapping::with_ttl(
                    format!("https://taken.example/{slug}"),
                    slug.to_string(),
                    None,
                    start(),
                    Duration::hours(1),
                )
                .unwrap(),
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_allocate_then_resolve_returns_url_byte_for_byte() {
    let engine = Engine::random();
    let url = "https://example.com/p%C3%A5th?q=a+b&x=%2F#Frag";

    let allocation = engine.allocation.allocate(url, None, None).await.unwrap();

    assert_eq!(engine.resolution.resolve(&allocation.slug).await.unwrap(), url);
}

#[tokio::test]
async fn test_distinct_urls_get_distinct_slugs() {
    let engine = Engine::random();
    let mut slugs = HashSet::new();

    for i in 0..200 {
        let allocation = engine
            .allocation
            .allocate(&format!("https://example.com/{i}"), None, None)
            .await
            .unwrap();
        assert!(slugs.insert(allocation.slug));
    }
}

#[tokio::test]
async fn test_same_url_is_idempotent() {
    let engine = Engine::random();

    let first = engine
        .allocation
        .allocate("https://example.com/same", None, None)
        .await
        .unwrap();
    let second = engine
        .allocation
        .allocate("https://example.com/same", Some(3), None)
        .await
        .unwrap();

    assert_eq!(first.slug, second.slug);
    assert!(!first.reused);
    assert!(second.reused);
    assert_eq!(engine.mappings.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_custom_slug_conflicts_on_second_use() {
    let engine = Engine::random();

    let first = engine
        .allocation
        .allocate("https://example.com/a", None, Some("x".to_string()))
        .await
        .unwrap();
    assert_eq!(first.slug, "x");
    assert!(first.was_custom);

    let second = engine
        .allocation
        .allocate("https://example.com/b", None, Some("x".to_string()))
        .await;
    assert!(matches!(second.unwrap_err(), AppError::Conflict { .. }));
}

#[tokio::test]
async fn test_empty_custom_slug_means_generated() {
    let engine = Engine::random();

    let allocation = engine
        .allocation
        .allocate("https://example.com/a", None, Some(String::new()))
        .await
        .unwrap();

    assert!(!allocation.was_custom);
    assert_eq!(allocation.slug.len(), 10);
}

#[tokio::test]
async fn test_expired_mapping_fails_but_access_is_recorded() {
    let engine = Engine::random();
    let allocation = engine
        .allocation
        .allocate("https://example.com/ttl", None, None)
        .await
        .unwrap();
    assert_eq!(allocation.expires_at, start() + Duration::hours(1));

    engine.clock.advance(Duration::hours(1) + Duration::seconds(1));

    let result = engine.resolution.resolve(&allocation.slug).await;
    assert!(matches!(result.unwrap_err(), AppError::Expired { .. }));

    let mapping = engine
        .mappings
        .find_by_slug(&allocation.slug)
        .await
        .unwrap()
        .unwrap();
    let accesses = engine.flush_accesses().await;

    let summary = accesses.summary_for_mapping(mapping.id).await.unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(
        summary.last_accessed_at,
        Some(start() + Duration::hours(1) + Duration::seconds(1))
    );
}

#[tokio::test]
async fn test_unknown_slug_records_nothing() {
    let engine = Engine::random();
    engine
        .allocation
        .allocate("https://example.com/known", None, None)
        .await
        .unwrap();

    let result = engine.resolution.resolve("doesnotexist").await;
    assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));

    let accesses = engine.flush_accesses().await;
    assert_eq!(accesses.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_successful_resolutions_are_counted() {
    let engine = Engine::random();
    let allocation = engine
        .allocation
        .allocate("https://example.com/popular", None, None)
        .await
        .unwrap();

    for _ in 0..5 {
        engine.resolution.resolve(&allocation.slug).await.unwrap();
    }

    let accesses = engine.flush_accesses().await;
    assert_eq!(accesses.count().await.unwrap(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_generated_allocations_are_distinct() {
    const N: usize = 500;
    let engine = Engine::random();

    let mut handles = Vec::with_capacity(N);
    for i in 0..N {
        let allocation = engine.allocation.clone();
        handles.push(tokio::spawn(async move {
            allocation
                .allocate(&format!("https://example.com/stress/{i}"), None, None)
                .await
        }));
    }

    let mut slugs = HashSet::new();
    for handle in handles {
        let allocation = handle.await.unwrap().unwrap();
        assert!(slugs.insert(allocation.slug));
    }

    assert_eq!(slugs.len(), N);
    assert_eq!(engine.mappings.count().await.unwrap(), N as i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_custom_slug_has_one_winner() {
    let engine = Engine::random();

    let mut handles = Vec::new();
    for i in 0..16 {
        let allocation = engine.allocation.clone();
        handles.push(tokio::spawn(async move {
            allocation
                .allocate(
                    &format!("https://example.com/race/{i}"),
                    None,
                    Some("contested".to_string()),
                )
                .await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(AppError::Conflict { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_collisions_grow_slug_length() {
    let engine = Engine::new(Arc::new(RepeatingGenerator), EngineConfig::default());
    engine.preload(&"x".repeat(10)).await;
    engine.preload(&"x".repeat(11)).await;

    let allocation = engine
        .allocation
        .allocate("https://example.com/grow", None, None)
        .await
        .unwrap();

    assert_eq!(allocation.slug, "x".repeat(12));
}

#[tokio::test]
async fn test_collisions_exhaust_after_bounded_attempts() {
    let config = EngineConfig {
        max_attempts: 3,
        ..EngineConfig::default()
    };
    let engine = Engine::new(Arc::new(RepeatingGenerator), config);
    for length in 10..13 {
        engine.preload(&"x".repeat(length)).await;
    }

    let result = engine
        .allocation
        .allocate("https://example.com/full", None, None)
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Exhausted { .. }));
    assert_eq!(engine.mappings.count().await.unwrap(), 3);
}
