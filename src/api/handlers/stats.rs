//! Handlers for access statistics.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde_json::json;

use crate::api::dto::pagination::PaginationParams;
use crate::api::dto::stats::{MappingStatsResponse, StatsListResponse};
use crate::application::services::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Returns access counters for one slug.
///
/// # Endpoint
///
/// `GET /api/stats/{slug}`
///
/// # Errors
///
/// - `401` - missing or invalid token
/// - `404` - unknown slug, or a slug owned by someone else
pub async fn stats_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(slug): Path<String>,
) -> Result<Json<MappingStatsResponse>, AppError> {
    let stats = state.stats_service.mapping_stats(&slug, user.id).await?;
    let short_url = state.short_url(&stats.mapping.slug);

    Ok(Json(MappingStatsResponse::new(
        stats,
        short_url,
        state.clock.now(),
    )))
}

/// Lists the caller's mappings with their counters, newest first.
///
/// # Endpoint
///
/// `GET /api/stats?page=1&page_size=25`
///
/// # Errors
///
/// - `400` - invalid pagination parameters
/// - `401` - missing or invalid token
pub async fn stats_list_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<StatsListResponse>, AppError> {
    let page = params
        .validate()
        .map_err(|reason| AppError::bad_request("Invalid pagination", json!({ "reason": reason })))?;

    let now = state.clock.now();
    let items = state
        .stats_service
        .owned_stats(user.id, page.limit(), page.offset())
        .await?
        .into_iter()
        .map(|stats| {
            let short_url = state.short_url(&stats.mapping.slug);
            MappingStatsResponse::new(stats, short_url, now)
        })
        .collect();

    Ok(Json(StatsListResponse {
        page: page.page,
        page_size: page.page_size,
        items,
    }))
}
