//! Headline KPI endpoint

use axum::{extract::State, Json};
use serde_json::Value;

use super::cached;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/kpi
///
/// Total revenue, orders, unique customers, average order value, items sold
/// and country count in one object.
pub async fn get_kpis(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let aggs = state.aggregations.clone();
    cached(&state, "kpi", || async move { aggs.all_kpis().await }).await
}
