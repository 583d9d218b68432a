//! Background worker persisting queued access events.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info};

use crate::domain::entities::NewAccessEvent;
use crate::domain::repositories::AccessRepository;
use crate::error::AppError;

/// Retries after the first failed write.
const MAX_RETRIES: usize = 3;

/// Drains the access queue until every sender is dropped.
///
/// At most `concurrency` writes are in flight. When the channel closes the
/// worker waits for in-flight writes before returning, so a graceful shutdown
/// loses no accepted event.
pub async fn run_access_worker<R>(
    mut rx: mpsc::Receiver<NewAccessEvent>,
    repository: Arc<R>,
    concurrency: usize,
) where
    R: AccessRepository + ?Sized + 'static,
{
    let concurrency = concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        tokio::spawn(async move {
            persist_with_retry(repository.as_ref(), event).await;
            drop(permit);
        });
    }

    let _ = semaphore.acquire_many(concurrency as u32).await;
    info!("Access worker stopped");
}

/// Writes one event, retrying transient storage failures with backoff.
///
/// Returns `false` when the event was given up on. That is logged and counted,
/// never silent.
pub async fn persist_with_retry<R>(repository: &R, event: NewAccessEvent) -> bool
where
    R: AccessRepository + ?Sized,
{
    let strategy = ExponentialBackoff::from_millis(10)
        .map(jitter)
        .take(MAX_RETRIES);

    let result = RetryIf::start(
        strategy,
        || repository.record(event),
        |e: &AppError| matches!(e, AppError::Internal { .. }),
    )
    .await;

    match result {
        Ok(recorded) => {
            debug!(
                "Access {} recorded for mapping {}",
                recorded.id, recorded.mapping_id
            );
            true
        }
        Err(e) => {
            error!(
                "Failed to record access for mapping {}: {}",
                event.mapping_id, e
            );
            metrics::counter!("access_events_failed_total").increment(1);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AccessEvent;
    use crate::domain::repositories::MockAccessRepository;
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn test_persist_succeeds_first_try() {
        let mut mock_repo = MockAccessRepository::new();
        mock_repo
            .expect_record()
            .times(1)
            .returning(|ev| Ok(AccessEvent::new(1, ev.mapping_id, ev.accessed_at)));

        let ok = persist_with_retry(&mock_repo, NewAccessEvent::new(5, Utc::now())).await;
        assert!(ok);
    }

    #[tokio::test]
    async fn test_persist_retries_transient_failure() {
        let mut mock_repo = MockAccessRepository::new();
        let mut calls = 0;
        mock_repo.expect_record().times(2).returning(move |ev| {
            calls += 1;
            if calls == 1 {
                Err(AppError::internal("Database error", json!({})))
            } else {
                Ok(AccessEvent::new(1, ev.mapping_id, ev.accessed_at))
            }
        });

        let ok = persist_with_retry(&mock_repo, NewAccessEvent::new(5, Utc::now())).await;
        assert!(ok);
    }

    #[tokio::test]
    async fn test_persist_gives_up_after_max_retries() {
        let mut mock_repo = MockAccessRepository::new();
        mock_repo
            .expect_record()
            .times(MAX_RETRIES + 1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let ok = persist_with_retry(&mock_repo, NewAccessEvent::new(5, Utc::now())).await;
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_persist_does_not_retry_missing_mapping() {
        let mut mock_repo = MockAccessRepository::new();
        mock_repo
            .expect_record()
            .times(1)
            .returning(|_| Err(AppError::bad_request("Mapping does not exist", json!({}))));

        let ok = persist_with_retry(&mock_repo, NewAccessEvent::new(5, Utc::now())).await;
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_worker_drains_queue_before_exit() {
        let mut mock_repo = MockAccessRepository::new();
        mock_repo
            .expect_record()
            .times(3)
            .returning(|ev| Ok(AccessEvent::new(1, ev.mapping_id, ev.accessed_at)));

        let (tx, rx) = mpsc::channel(8);
        for id in 1..=3 {
            tx.send(NewAccessEvent::new(id, Utc::now())).await.unwrap();
        }
        drop(tx);

        run_access_worker(rx, Arc::new(mock_repo), 2).await;
    }
}
