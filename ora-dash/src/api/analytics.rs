//! Customer segments and product performance

use axum::{extract::State, Json};
use serde_json::Value;

use super::cached;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/analytics/segments
///
/// Customers bucketed by lifetime revenue: VIP (>= 1000), Regular (>= 100), New.
pub async fn customer_segmentation(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let aggs = state.aggregations.clone();
    cached(&state, "customer_segmentation", || async move {
        aggs.customer_segmentation().await
    })
    .await
}

/// GET /api/analytics/products
pub async fn product_performance(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let aggs = state.aggregations.clone();
    cached(&state, "product_performance", || async move {
        aggs.product_performance().await
    })
    .await
}
