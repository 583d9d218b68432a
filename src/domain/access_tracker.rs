//! Access tracking entry point used by the resolution service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::entities::NewAccessEvent;
use crate::error::AppError;

/// Records that a mapping was resolved.
///
/// Best-effort from the caller's point of view: the resolution service logs a
/// failed `record` and still answers the request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessTracker: Send + Sync {
    /// Records one access of `mapping_id` at `accessed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the event could not be accepted.
    async fn record(&self, mapping_id: i64, accessed_at: DateTime<Utc>) -> Result<(), AppError>;
}

/// Hands access events to the background worker through a bounded channel.
///
/// Never blocks the request path: when the queue is full the event is
/// rejected and counted in `access_events_dropped_total`.
#[derive(Clone)]
pub struct QueuedAccessTracker {
    sender: mpsc::Sender<NewAccessEvent>,
}

impl QueuedAccessTracker {
    pub fn new(sender: mpsc::Sender<NewAccessEvent>) -> Self {
        Self { sender }
    }

    /// Returns true once the worker side of the queue is gone.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots currently left in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}

#[async_trait]
impl AccessTracker for QueuedAccessTracker {
    async fn record(&self, mapping_id: i64, accessed_at: DateTime<Utc>) -> Result<(), AppError> {
        match self
            .sender
            .try_send(NewAccessEvent::new(mapping_id, accessed_at))
        {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                metrics::counter!("access_events_dropped_total", "reason" => "full").increment(1);
                Err(AppError::internal(
                    "Access queue is full",
                    json!({ "mapping_id": mapping_id }),
                ))
            }
            Err(TrySendError::Closed(_)) => {
                metrics::counter!("access_events_dropped_total", "reason" => "closed")
                    .increment(1);
                Err(AppError::internal(
                    "Access queue is closed",
                    json!({ "mapping_id": mapping_id }),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_enqueues_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let tracker = QueuedAccessTracker::new(tx);
        let now = Utc::now();

        tracker.record(42, now).await.unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.mapping_id, 42);
        assert_eq!(event.accessed_at, now);
    }

    #[tokio::test]
    async fn test_record_fails_when_queue_full() {
        let (tx, _rx) = mpsc::channel(1);
        let tracker = QueuedAccessTracker::new(tx);

        tracker.record(1, Utc::now()).await.unwrap();
        let result = tracker.record(2, Utc::now()).await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_record_fails_when_queue_closed() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let tracker = QueuedAccessTracker::new(tx);

        assert!(tracker.is_closed());
        let result = tracker.record(1, Utc::now()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("closed"));
    }

    #[tokio::test]
    async fn test_capacity_reports_free_slots() {
        let (tx, _rx) = mpsc::channel(3);
        let tracker = QueuedAccessTracker::new(tx);

        assert_eq!(tracker.capacity(), 3);
        tracker.record(1, Utc::now()).await.unwrap();
        assert_eq!(tracker.capacity(), 2);
    }
}
