//! HTTP API handlers for ora-dash

pub mod analytics;
pub mod buildinfo;
pub mod cache;
pub mod distribution;
pub mod health;
pub mod kpi;
pub mod top;
pub mod trends;
pub mod ui;

pub use analytics::{customer_segmentation, product_performance};
pub use buildinfo::get_build_info;
pub use cache::{clear_cache, get_cache_status, set_cache_ttl};
pub use distribution::{customers_by_country, order_value_distribution, revenue_by_source};
pub use health::health_routes;
pub use kpi::get_kpis;
pub use top::{top_customers, top_countries, top_products};
pub use trends::{daily_revenue, monthly_revenue};
pub use ui::{serve_app_js, serve_index};

use axum::Json;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use tracing::debug;

use crate::error::ApiResult;
use crate::AppState;

/// Serve `key` from the query cache, running `load` on a miss
pub(crate) async fn cached<T, F, Fut>(state: &AppState, key: &str, load: F) -> ApiResult<Json<Value>>
where
    T: Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ora_common::Result<T>>,
{
    if let Some(hit) = state.cache.get(key) {
        debug!(key, "Cache hit");
        return Ok(Json(hit));
    }

    let value = serde_json::to_value(load().await?)?;
    state.cache.insert(key, value.clone());
    debug!(key, "Cache miss, stored");
    Ok(Json(value))
}
