//! In-memory implementation of the access repository.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use super::MemoryMappingRepository;
use crate::domain::entities::{AccessEvent, AccessSummary, NewAccessEvent};
use crate::domain::repositories::AccessRepository;
use crate::error::AppError;

/// Access log kept per mapping.
///
/// Holds the mapping store to reject events for unknown mappings, the same
/// way the foreign key does in PostgreSQL.
pub struct MemoryAccessRepository {
    mappings: Arc<MemoryMappingRepository>,
    events: DashMap<i64, Vec<AccessEvent>>,
    next_id: AtomicI64,
}

impl MemoryAccessRepository {
    pub fn new(mappings: Arc<MemoryMappingRepository>) -> Self {
        Self {
            mappings,
            events: DashMap::new(),
            next_id: AtomicI64::new(0),
        }
    }
}

#[async_trait]
impl AccessRepository for MemoryAccessRepository {
    async fn record(&self, event: NewAccessEvent) -> Result<AccessEvent, AppError> {
        if !self.mappings.contains_id(event.mapping_id) {
            return Err(AppError::bad_request(
                "Mapping does not exist",
                json!({ "mapping_id": event.mapping_id }),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let recorded = AccessEvent::new(id, event.mapping_id, event.accessed_at);

        self.events
            .entry(event.mapping_id)
            .or_default()
            .push(recorded.clone());

        Ok(recorded)
    }

    async fn summary_for_mapping(&self, mapping_id: i64) -> Result<AccessSummary, AppError> {
        Ok(self
            .events
            .get(&mapping_id)
            .map(|events| AccessSummary {
                total: events.len() as i64,
                last_accessed_at: events.iter().map(|e| e.accessed_at).max(),
            })
            .unwrap_or_default())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.events.iter().map(|e| e.len() as i64).sum())
    }
}
