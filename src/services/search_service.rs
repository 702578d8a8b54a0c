//! User-facing movie search.
//!
//! A search fetches results from the provider and, when the result set is
//! non-empty, dispatches a separate task that records the query in the
//! popularity tracker. The search never waits on that task and never sees
//! its errors.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clients::{MovieProvider, ProviderError};
use crate::domain::normalize_query;
use crate::models::movie::Movie;
use crate::models::search_counter::RecordOutcome;
use crate::services::popularity_service::{PopularityService, RepresentativeMovie, TrackerError};

/// Background recording task spawned by a search.
///
/// Dropping the handle detaches the task; it still runs to completion.
#[derive(Debug)]
pub struct RecordingHandle(JoinHandle<Result<RecordOutcome, TrackerError>>);

impl RecordingHandle {
    /// Waits for the recording to finish. `None` if the task was cancelled.
    pub async fn outcome(self) -> Option<Result<RecordOutcome, TrackerError>> {
        self.0.await.ok()
    }
}

#[derive(Debug)]
pub struct SearchResults {
    /// Trimmed query, or `None` when this was a popularity listing.
    pub query: Option<String>,
    pub movies: Vec<Movie>,
    pub recording: Option<RecordingHandle>,
}

pub struct MovieSearchService {
    provider: Arc<dyn MovieProvider>,
    tracker: Arc<dyn PopularityService>,
    record_searches: bool,
}

impl MovieSearchService {
    #[must_use]
    pub fn new(
        provider: Arc<dyn MovieProvider>,
        tracker: Arc<dyn PopularityService>,
        record_searches: bool,
    ) -> Self {
        Self {
            provider,
            tracker,
            record_searches,
        }
    }

    /// Searches for `query`, or lists popular movies when it is blank.
    pub async fn search(&self, query: &str) -> Result<SearchResults, ProviderError> {
        if normalize_query(query).is_empty() {
            let movies = self.provider.discover_popular().await?;
            return Ok(SearchResults {
                query: None,
                movies,
                recording: None,
            });
        }

        let query = query.trim().to_string();
        let movies = self.provider.search_movies(&query).await?;
        debug!(query = %query, results = movies.len(), "Movie search finished");

        let recording = match movies.first() {
            Some(first) if self.record_searches => Some(self.spawn_recording(
                query.clone(),
                RepresentativeMovie::from(first),
            )),
            _ => None,
        };

        Ok(SearchResults {
            query: Some(query),
            movies,
            recording,
        })
    }

    fn spawn_recording(&self, query: String, movie: RepresentativeMovie) -> RecordingHandle {
        let tracker = self.tracker.clone();

        RecordingHandle(tokio::spawn(async move {
            let result = tracker.record_search(&query, &movie).await;
            if let Err(e) = &result {
                warn!(query = %query, error = %e, "Failed to record search count");
            }
            result
        }))
    }
}
