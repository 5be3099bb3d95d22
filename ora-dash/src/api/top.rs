//! Top-N rankings: products, countries, customers

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::cached;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Query parameters for ranking endpoints
#[derive(Debug, Deserialize)]
pub struct TopQuery {
    /// Rows to return (1-100)
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl TopQuery {
    fn validated(&self) -> ApiResult<i64> {
        if (1..=MAX_LIMIT).contains(&self.limit) {
            Ok(self.limit as i64)
        } else {
            Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, self.limit
            )))
        }
    }
}

/// GET /api/top/products?limit=N
pub async fn top_products(
    State(state): State<AppState>,
    query: Result<Query<TopQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let limit = query.validated()?;
    let aggs = state.aggregations.clone();
    cached(&state, &format!("top_products:{}", limit), || async move {
        aggs.top_products(limit).await
    })
    .await
}

/// GET /api/top/countries?limit=N
pub async fn top_countries(
    State(state): State<AppState>,
    query: Result<Query<TopQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let limit = query.validated()?;
    let aggs = state.aggregations.clone();
    cached(&state, &format!("top_countries:{}", limit), || async move {
        aggs.top_countries(limit).await
    })
    .await
}

/// GET /api/top/customers?limit=N
pub async fn top_customers(
    State(state): State<AppState>,
    query: Result<Query<TopQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let limit = query.validated()?;
    let aggs = state.aggregations.clone();
    cached(&state, &format!("top_customers:{}", limit), || async move {
        aggs.top_customers(limit).await
    })
    .await
}
