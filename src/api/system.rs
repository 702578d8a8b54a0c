//! System API endpoints: status and liveness.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use super::{ApiError, ApiResponse, AppState, SystemStatus};

#[derive(Debug, Serialize)]
pub struct HealthLiveResponse {
    pub status: &'static str,
}

/// `GET /api/system/status`
///
/// Version, uptime and database health. A failing database is reported in the
/// payload rather than as an error status.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let database_ok = state.store().ping().await.is_ok();

    let tracked_searches = if database_ok {
        state.store().count_search_counters().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to count search counters");
            0
        })
    } else {
        0
    };

    let tmdb_configured = state.config().read().await.tmdb.resolve_token().is_some();

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        database_ok,
        tracked_searches,
        tmdb_configured,
    })))
}

/// `GET /api/system/health/live`
pub async fn health_live() -> impl IntoResponse {
    Json(ApiResponse::success(HealthLiveResponse { status: "alive" }))
}
