pub mod tmdb;

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::MovieId;
use crate::models::movie::{Genre, Keyword, Movie, RegionProviders, Video};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("TMDB bearer token is not configured")]
    MissingToken,

    #[error("TMDB rejected the credentials")]
    Unauthorized,

    #[error("TMDB resource not found: {0}")]
    NotFound(String),

    #[error("TMDB returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("TMDB request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Source of movie records and per-movie metadata.
///
/// `TmdbClient` is the production implementation; tests substitute canned
/// providers.
#[async_trait]
pub trait MovieProvider: Send + Sync {
    /// Movies matching `query`, in provider relevance order.
    async fn search_movies(&self, query: &str) -> Result<Vec<Movie>, ProviderError>;

    /// Popular movies, used when there is no query.
    async fn discover_popular(&self) -> Result<Vec<Movie>, ProviderError>;

    async fn genres(&self) -> Result<Vec<Genre>, ProviderError>;

    async fn keywords(&self, id: MovieId) -> Result<Vec<Keyword>, ProviderError>;

    async fn videos(&self, id: MovieId) -> Result<Vec<Video>, ProviderError>;

    /// Watch providers keyed by ISO 3166-1 region code.
    async fn watch_providers(
        &self,
        id: MovieId,
    ) -> Result<BTreeMap<String, RegionProviders>, ProviderError>;
}
