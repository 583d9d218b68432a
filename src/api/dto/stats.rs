//! DTOs for statistics endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::services::MappingStats;

/// Counters for one mapping.
#[derive(Debug, Serialize)]
pub struct MappingStatsResponse {
    pub slug: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
    pub total_accesses: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl MappingStatsResponse {
    pub fn new(stats: MappingStats, short_url: String, now: DateTime<Utc>) -> Self {
        Self {
            expired: stats.mapping.is_expired_at(now),
            slug: stats.mapping.slug,
            short_url,
            original_url: stats.mapping.original_url,
            created_at: stats.mapping.created_at,
            expires_at: stats.mapping.expires_at,
            total_accesses: stats.summary.total,
            last_accessed_at: stats.summary.last_accessed_at,
        }
    }
}

/// One page of the caller's mappings.
#[derive(Debug, Serialize)]
pub struct StatsListResponse {
    pub page: u32,
    pub page_size: u32,
    pub items: Vec<MappingStatsResponse>,
}
