use serde::{Deserialize, Serialize};

use crate::domain::MovieId;
use crate::models::movie::{Keyword, Movie, RegionProviders};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct TrendingQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RegionQuery {
    pub region: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MovieDto {
    pub id: MovieId,
    pub title: String,
    pub poster_url: String,
    pub overview: String,
    pub release_year: Option<i32>,
    pub original_language: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub genre_ids: Vec<i64>,
}

impl MovieDto {
    #[must_use]
    pub fn from_movie(movie: Movie, poster_url: String) -> Self {
        Self {
            id: movie.id,
            release_year: movie.release_year(),
            title: movie.title,
            poster_url,
            overview: movie.overview,
            original_language: movie.original_language,
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            genre_ids: movie.genre_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// `None` when the listing is popular movies rather than a search.
    pub query: Option<String>,
    pub movies: Vec<MovieDto>,
}

#[derive(Debug, Serialize)]
pub struct KeywordsDto {
    pub movie_id: MovieId,
    pub keywords: Vec<Keyword>,
}

#[derive(Debug, Serialize)]
pub struct ProvidersDto {
    pub movie_id: MovieId,
    pub region: String,
    pub providers: RegionProviders,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub database_ok: bool,
    pub tracked_searches: u64,
    pub tmdb_configured: bool,
}
