//! Build information API endpoint
//!
//! Provides version and build metadata for the dashboard footer

use axum::response::Json;
use ora_common::build_info::BuildInfo;

/// GET /api/buildinfo
pub async fn get_build_info() -> Json<BuildInfo> {
    Json(ora_common::build_info!())
}
