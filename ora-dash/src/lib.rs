//! ora-dash library - analytics dashboard
//!
//! Serves the KPI and ranking queries of [`aggregations`] over HTTP, memoized
//! for a short window by [`cache::QueryCache`], together with a single-page
//! browser UI.

use axum::Router;
use chrono::{DateTime, Utc};
use ora_common::db::RecordStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod aggregations;
pub mod api;
pub mod cache;
pub mod error;
pub mod verify;

pub use aggregations::Aggregations;
pub use cache::QueryCache;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregations: Arc<Aggregations>,
    pub cache: Arc<QueryCache>,
    /// Service start, for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, cache_ttl_secs: u64) -> Self {
        Self {
            aggregations: Arc::new(Aggregations::new(store)),
            cache: Arc::new(QueryCache::new(cache_ttl_secs)),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let data = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/kpi", get(api::get_kpis))
        .route("/api/top/products", get(api::top_products))
        .route("/api/top/countries", get(api::top_countries))
        .route("/api/top/customers", get(api::top_customers))
        .route("/api/trends/daily", get(api::daily_revenue))
        .route("/api/trends/monthly", get(api::monthly_revenue))
        .route("/api/distribution/sources", get(api::revenue_by_source))
        .route("/api/distribution/countries", get(api::customers_by_country))
        .route("/api/distribution/order-values", get(api::order_value_distribution))
        .route("/api/analytics/segments", get(api::customer_segmentation))
        .route("/api/analytics/products", get(api::product_performance))
        .route("/api/cache", get(api::get_cache_status).put(api::set_cache_ttl))
        .route("/api/cache/clear", post(api::clear_cache));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes());

    Router::new()
        .merge(data)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize the tracing subscriber shared by the ora-dash binaries
///
/// `RUST_LOG` wins; otherwise `default_level` from configuration applies.
pub fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}
