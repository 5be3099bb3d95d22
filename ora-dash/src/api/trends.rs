//! Revenue over time

use axum::{extract::State, Json};
use serde_json::Value;

use super::cached;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/trends/daily
///
/// The most recent 365 days with revenue, oldest first, plus mean/peak/lowest.
pub async fn daily_revenue(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let aggs = state.aggregations.clone();
    cached(&state, "daily_revenue", || async move { aggs.daily_revenue().await }).await
}

/// GET /api/trends/monthly
pub async fn monthly_revenue(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let aggs = state.aggregations.clone();
    cached(&state, "monthly_revenue", || async move { aggs.monthly_revenue().await }).await
}
