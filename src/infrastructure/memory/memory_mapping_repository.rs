//! In-memory implementation of the mapping repository.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{Mapping, NewMapping};
use crate::domain::repositories::{InsertOutcome, MappingRepository};
use crate::error::AppError;

/// Mapping store backed by concurrent hash maps.
///
/// `insert` holds the slug's shard lock between the vacancy check and the
/// write, so two racing inserts of one slug yield one `Inserted` and one
/// `SlugTaken`.
#[derive(Default)]
pub struct MemoryMappingRepository {
    by_slug: DashMap<String, Mapping>,
    /// Oldest `(id, slug)` per original URL.
    by_url: DashMap<String, (i64, String)>,
    by_id: DashMap<i64, String>,
    next_id: AtomicI64,
}

impl MemoryMappingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a mapping with this id was stored.
    pub fn contains_id(&self, id: i64) -> bool {
        self.by_id.contains_key(&id)
    }
}

#[async_trait]
impl MappingRepository for MemoryMappingRepository {
    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<Mapping>, AppError> {
        let Some(slug) = self.by_url.get(original_url).map(|e| e.1.clone()) else {
            return Ok(None);
        };

        Ok(self.by_slug.get(&slug).map(|m| m.clone()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Mapping>, AppError> {
        Ok(self.by_slug.get(slug).map(|m| m.clone()))
    }

    async fn insert(&self, new_mapping: NewMapping) -> Result<InsertOutcome, AppError> {
        match self.by_slug.entry(new_mapping.slug.clone()) {
            Entry::Occupied(_) => Ok(InsertOutcome::SlugTaken),
            Entry::Vacant(vacant) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                let mapping = new_mapping.into_mapping(id);

                self.by_id.insert(id, mapping.slug.clone());
                self.by_url
                    .entry(mapping.original_url.clone())
                    .and_modify(|oldest| {
                        if id < oldest.0 {
                            *oldest = (id, mapping.slug.clone());
                        }
                    })
                    .or_insert_with(|| (id, mapping.slug.clone()));

                vacant.insert(mapping.clone());
                Ok(InsertOutcome::Inserted(mapping))
            }
        }
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Mapping>, AppError> {
        let mut owned: Vec<Mapping> = self
            .by_slug
            .iter()
            .filter(|m| m.owner_id == Some(owner_id))
            .map(|m| m.value().clone())
            .collect();

        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(owned
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.by_slug.len() as i64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
