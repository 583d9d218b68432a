//! Access event entity recording a successful slug lookup.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A resolution of an existing slug.
///
/// Recorded whenever the slug was found, whether or not the mapping had
/// already expired. Insert-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEvent {
    pub id: i64,
    pub mapping_id: i64,
    pub accessed_at: DateTime<Utc>,
}

impl AccessEvent {
    /// Creates a new AccessEvent instance.
    pub fn new(id: i64, mapping_id: i64, accessed_at: DateTime<Utc>) -> Self {
        Self {
            id,
            mapping_id,
            accessed_at,
        }
    }
}

/// Input data for recording an access.
///
/// Travels through the access queue to the background worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAccessEvent {
    pub mapping_id: i64,
    pub accessed_at: DateTime<Utc>,
}

impl NewAccessEvent {
    pub fn new(mapping_id: i64, accessed_at: DateTime<Utc>) -> Self {
        Self {
            mapping_id,
            accessed_at,
        }
    }
}

/// Aggregated access counters for one mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessSummary {
    pub total: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_event_creation() {
        let now = Utc::now();
        let event = AccessEvent::new(3, 42, now);

        assert_eq!(event.id, 3);
        assert_eq!(event.mapping_id, 42);
        assert_eq!(event.accessed_at, now);
    }

    #[test]
    fn test_new_access_event_is_copy() {
        let event = NewAccessEvent::new(9, Utc::now());
        let copied = event;

        assert_eq!(copied, event);
    }

    #[test]
    fn test_empty_summary() {
        let summary = AccessSummary::default();
        assert_eq!(summary.total, 0);
        assert!(summary.last_accessed_at.is_none());
    }
}
