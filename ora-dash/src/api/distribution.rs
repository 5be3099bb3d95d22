//! Breakdowns by source, country and order value

use axum::{extract::State, Json};
use serde_json::Value;

use super::cached;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/distribution/sources
pub async fn revenue_by_source(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let aggs = state.aggregations.clone();
    cached(&state, "revenue_by_source", || async move { aggs.revenue_by_source().await }).await
}

/// GET /api/distribution/countries
pub async fn customers_by_country(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let aggs = state.aggregations.clone();
    cached(&state, "customers_by_country", || async move {
        aggs.customers_by_country().await
    })
    .await
}

/// GET /api/distribution/order-values
pub async fn order_value_distribution(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let aggs = state.aggregations.clone();
    cached(&state, "order_value_distribution", || async move {
        aggs.order_value_distribution().await
    })
    .await
}
