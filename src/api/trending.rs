use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;
use tracing::warn;

use super::validation::validate_limit;
use super::{ApiError, ApiResponse, AppState, TrendingQuery};
use crate::services::TrendingSearch;

/// `GET /api/trending?limit=`
///
/// A store failure yields an empty list rather than an error so the trending
/// section simply renders nothing.
pub async fn get_trending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendingQuery>,
) -> Result<Json<ApiResponse<Vec<TrendingSearch>>>, ApiError> {
    let (default_limit, max_limit) = {
        let config = state.config().read().await;
        (config.trending.default_limit, config.trending.max_limit)
    };
    let limit = validate_limit(params.limit, default_limit, max_limit)?;

    let trending = match state.tracker().top_searches(limit).await {
        Ok(trending) => trending,
        Err(e) => {
            warn!(error = %e, "Failed to load trending searches");
            Vec::new()
        }
    };

    Ok(Json(ApiResponse::success(trending)))
}
