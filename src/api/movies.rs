use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::validation::{validate_movie_id, validate_region};
use super::{
    ApiError, ApiResponse, AppState, KeywordsDto, MovieDto, ProvidersDto, RegionQuery,
    SearchQuery, SearchResponse,
};
use crate::models::movie::GenreMap;
use crate::services::{Trailer, catalog_service::DETAIL_KEYWORD_LIMIT};

/// `GET /api/movies?query=`
///
/// Searches TMDB, or lists popular movies when the query is blank. A
/// non-empty result set is recorded in the background; the response does not
/// wait for it.
pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<ApiResponse<SearchResponse>>, ApiError> {
    let results = state.search_service().search(&params.query).await?;

    let config = state.config().read().await;
    let movies = results
        .movies
        .into_iter()
        .map(|m| {
            let poster = config.poster_url(m.poster_path.as_deref());
            MovieDto::from_movie(m, poster)
        })
        .collect();

    Ok(Json(ApiResponse::success(SearchResponse {
        query: results.query,
        movies,
    })))
}

pub async fn get_keywords(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<KeywordsDto>>, ApiError> {
    let id = validate_movie_id(id)?;
    let keywords = state.catalog().keywords(id, DETAIL_KEYWORD_LIMIT).await?;

    Ok(Json(ApiResponse::success(KeywordsDto {
        movie_id: id,
        keywords,
    })))
}

pub async fn get_trailer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Trailer>>, ApiError> {
    let id = validate_movie_id(id)?;
    let trailer = state
        .catalog()
        .trailer(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Trailer for movie", id))?;

    Ok(Json(ApiResponse::success(trailer)))
}

pub async fn get_providers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<RegionQuery>,
) -> Result<Json<ApiResponse<ProvidersDto>>, ApiError> {
    let id = validate_movie_id(id)?;
    let region = params.region.as_deref().map(validate_region).transpose()?;

    let (region, providers) = state
        .catalog()
        .watch_providers(id, region.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(ProvidersDto {
        movie_id: id,
        region,
        providers,
    })))
}

/// `GET /api/genres`
pub async fn list_genres(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<GenreMap>>, ApiError> {
    let genres = state.catalog().genre_map().await?;
    Ok(Json(ApiResponse::success(genres)))
}
