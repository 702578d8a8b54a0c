//! Domain service for search popularity tracking.
//!
//! Records which queries users search for and ranks them for the trending
//! view. Counters are keyed by the normalized query (see
//! [`crate::domain::normalize_query`]).

use serde::Serialize;
use thiserror::Error;

use crate::domain::MovieId;
use crate::models::movie::Movie;
use crate::models::search_counter::{RecordOutcome, SearchCounter};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Malformed result: {0}")]
    MalformedResult(String),

    #[error("Query is empty after normalization")]
    InvalidQuery,
}

impl From<anyhow::Error> for TrackerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Persistence(format!("{err:#}"))
    }
}

impl From<sea_orm::DbErr> for TrackerError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// The result record a search is attributed to.
///
/// Only the first record of a non-empty result set is ever recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepresentativeMovie {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
}

impl From<&Movie> for RepresentativeMovie {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
        }
    }
}

impl RepresentativeMovie {
    /// Rejects records without a usable id or title.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !self.id.is_valid() {
            return Err(TrackerError::MalformedResult(format!(
                "movie id {} is not a valid identifier",
                self.id
            )));
        }
        if self.title.trim().is_empty() {
            return Err(TrackerError::MalformedResult(format!(
                "movie {} has no title",
                self.id
            )));
        }
        Ok(())
    }
}

/// Trending projection consumed by the trending view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendingSearch {
    pub rank: usize,
    pub key: String,
    pub count: i64,
    pub movie_id: MovieId,
    pub poster_url: String,
    pub title: String,
}

impl TrendingSearch {
    #[must_use]
    pub fn from_counter(rank: usize, counter: SearchCounter) -> Self {
        Self {
            rank,
            key: counter.key,
            count: counter.count,
            movie_id: counter.movie_id,
            poster_url: counter.poster_url,
            title: counter.title,
        }
    }
}

#[async_trait::async_trait]
pub trait PopularityService: Send + Sync {
    /// Registers a search for `query` attributed to `movie`.
    ///
    /// `query` must not be blank after normalization; callers filter blank
    /// queries out before getting here. An existing counter keeps its original
    /// movie, poster and title.
    async fn record_search(
        &self,
        query: &str,
        movie: &RepresentativeMovie,
    ) -> Result<RecordOutcome, TrackerError>;

    /// The `limit` most searched queries, highest count first, ties in
    /// creation order. `limit` is clamped to `1..=max_limit`.
    async fn top_searches(&self, limit: u64) -> Result<Vec<TrendingSearch>, TrackerError>;
}
