//! Cache inspection and control

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::CacheStatus;
use crate::error::ApiResult;
use crate::AppState;

/// Body of `PUT /api/cache`
#[derive(Debug, Deserialize)]
pub struct SetTtlRequest {
    pub ttl_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: usize,
}

/// GET /api/cache
pub async fn get_cache_status(State(state): State<AppState>) -> Json<CacheStatus> {
    Json(state.cache.status())
}

/// PUT /api/cache
///
/// Values outside 60..=3600 are clamped; the response carries the window in
/// effect. A body that is not `{"ttl_secs": <integer>}` is a 400.
pub async fn set_cache_ttl(
    State(state): State<AppState>,
    request: Result<Json<SetTtlRequest>, JsonRejection>,
) -> ApiResult<Json<CacheStatus>> {
    let Json(request) = request?;
    let applied = state.cache.set_ttl(request.ttl_secs);
    info!(requested = request.ttl_secs, applied, "Cache window changed");
    Ok(Json(state.cache.status()))
}

/// POST /api/cache/clear
pub async fn clear_cache(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.cache.clear();
    info!(cleared, "Cache cleared");
    Json(ClearResponse { cleared })
}
