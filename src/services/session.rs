//! Interactive search session.
//!
//! State changes go through [`SessionState::update`], a reducer that returns
//! the effects to run. Two generation counters make the ordering explicit:
//! `keystroke` invalidates pending debounce timers when the user keeps
//! typing, and `request` invalidates responses for superseded fetches.
//! [`SessionDriver`] owns the state in a single task and turns effects into
//! timers and fetch tasks that report back as events.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::models::movie::Movie;
use crate::services::popularity_service::{PopularityService, TrendingSearch};
use crate::services::search_service::MovieSearchService;

/// Shown instead of results when the current fetch failed.
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching movies. Please try again later.";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Session opened: load popular movies and the trending list.
    Started,
    QueryChanged(String),
    DebounceElapsed { keystroke: u64 },
    FetchResolved { request: u64, movies: Vec<Movie> },
    FetchFailed { request: u64, message: String },
    TrendingLoaded(Vec<TrendingSearch>),
    TrendingFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ScheduleDebounce { keystroke: u64 },
    Fetch { request: u64, query: String },
    LoadTrending,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub search_term: String,
    pub debounced_term: String,
    pub keystroke: u64,
    pub request: u64,
    pub is_loading: bool,
    pub movies: Vec<Movie>,
    pub error_message: Option<String>,
    pub trending: Vec<TrendingSearch>,
}

impl SessionState {
    #[must_use]
    pub fn update(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::Started => {
                let mut effects = self.begin_fetch();
                effects.push(Effect::LoadTrending);
                effects
            }
            SessionEvent::QueryChanged(term) => {
                self.search_term = term;
                self.keystroke += 1;
                vec![Effect::ScheduleDebounce {
                    keystroke: self.keystroke,
                }]
            }
            SessionEvent::DebounceElapsed { keystroke } => {
                if keystroke != self.keystroke || self.search_term == self.debounced_term {
                    return Vec::new();
                }
                self.debounced_term = self.search_term.clone();
                self.begin_fetch()
            }
            SessionEvent::FetchResolved { request, movies } => {
                if request != self.request {
                    debug!(request, current = self.request, "Dropping stale search response");
                    return Vec::new();
                }
                self.is_loading = false;
                self.error_message = None;
                self.movies = movies;
                Vec::new()
            }
            SessionEvent::FetchFailed { request, message } => {
                if request != self.request {
                    return Vec::new();
                }
                warn!(error = %message, "Movie fetch failed");
                self.is_loading = false;
                self.error_message = Some(FETCH_ERROR_MESSAGE.to_string());
                Vec::new()
            }
            SessionEvent::TrendingLoaded(trending) => {
                self.trending = trending;
                Vec::new()
            }
            SessionEvent::TrendingFailed(message) => {
                warn!(error = %message, "Trending searches unavailable");
                Vec::new()
            }
        }
    }

    fn begin_fetch(&mut self) -> Vec<Effect> {
        self.request += 1;
        self.is_loading = true;
        self.error_message = None;
        vec![Effect::Fetch {
            request: self.request,
            query: self.debounced_term.clone(),
        }]
    }
}

pub struct SessionDriver {
    search: Arc<MovieSearchService>,
    tracker: Arc<dyn PopularityService>,
    debounce: Duration,
    trending_limit: u64,
}

/// Handle to a running session.
pub struct SessionHandle {
    pub input: mpsc::Sender<SessionEvent>,
    pub state: watch::Receiver<SessionState>,
    pub task: JoinHandle<()>,
}

impl SessionDriver {
    #[must_use]
    pub fn new(
        search: Arc<MovieSearchService>,
        tracker: Arc<dyn PopularityService>,
        debounce: Duration,
        trending_limit: u64,
    ) -> Self {
        Self {
            search,
            tracker,
            debounce,
            trending_limit,
        }
    }

    /// Starts the session task. It stops once every `input` sender is dropped.
    #[must_use]
    pub fn spawn(self) -> SessionHandle {
        let (input_tx, mut input_rx) = mpsc::channel::<SessionEvent>(32);
        let (internal_tx, mut internal_rx) = mpsc::channel::<SessionEvent>(32);
        let (state_tx, state_rx) = watch::channel(SessionState::default());

        let task = tokio::spawn(async move {
            let mut state = SessionState::default();
            let effects = state.update(SessionEvent::Started);
            self.run_effects(effects, &internal_tx);
            state_tx.send_replace(state.clone());

            loop {
                let event = tokio::select! {
                    event = input_rx.recv() => match event {
                        Some(event) => event,
                        None => break,
                    },
                    Some(event) = internal_rx.recv() => event,
                };

                let effects = state.update(event);
                self.run_effects(effects, &internal_tx);
                state_tx.send_replace(state.clone());
            }

            debug!("Search session closed");
        });

        SessionHandle {
            input: input_tx,
            state: state_rx,
            task,
        }
    }

    fn run_effects(&self, effects: Vec<Effect>, events: &mpsc::Sender<SessionEvent>) {
        for effect in effects {
            let events = events.clone();
            match effect {
                Effect::ScheduleDebounce { keystroke } => {
                    let delay = self.debounce;
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = events.send(SessionEvent::DebounceElapsed { keystroke }).await;
                    });
                }
                Effect::Fetch { request, query } => {
                    let search = self.search.clone();
                    tokio::spawn(async move {
                        let event = match search.search(&query).await {
                            Ok(results) => SessionEvent::FetchResolved {
                                request,
                                movies: results.movies,
                            },
                            Err(e) => SessionEvent::FetchFailed {
                                request,
                                message: e.to_string(),
                            },
                        };
                        let _ = events.send(event).await;
                    });
                }
                Effect::LoadTrending => {
                    let tracker = self.tracker.clone();
                    let limit = self.trending_limit;
                    tokio::spawn(async move {
                        let event = match tracker.top_searches(limit).await {
                            Ok(trending) => SessionEvent::TrendingLoaded(trending),
                            Err(e) => SessionEvent::TrendingFailed(e.to_string()),
                        };
                        let _ = events.send(event).await;
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{MovieProvider, ProviderError};
    use crate::config::Config;
    use crate::domain::MovieId;
    use crate::models::movie::{Genre, Keyword, RegionProviders, Video};
    use crate::services::PopularityTracker;
    use crate::services::popularity_service_impl::tests::MemoryCounterStore;
    use crate::services::search_service::tests::movie;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use tokio::sync::RwLock;

    /// Answers each search with a single movie titled after the query.
    #[derive(Default)]
    struct EchoProvider {
        searches: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MovieProvider for EchoProvider {
        async fn search_movies(&self, query: &str) -> Result<Vec<Movie>, ProviderError> {
            self.searches.lock().unwrap().push(query.to_string());
            Ok(vec![movie(1, &format!("{query} result"), None)])
        }

        async fn discover_popular(&self) -> Result<Vec<Movie>, ProviderError> {
            Ok(vec![movie(550, "Fight Club", None)])
        }

        async fn genres(&self) -> Result<Vec<Genre>, ProviderError> {
            Ok(Vec::new())
        }

        async fn keywords(&self, _id: MovieId) -> Result<Vec<Keyword>, ProviderError> {
            Ok(Vec::new())
        }

        async fn videos(&self, _id: MovieId) -> Result<Vec<Video>, ProviderError> {
            Ok(Vec::new())
        }

        async fn watch_providers(
            &self,
            _id: MovieId,
        ) -> Result<BTreeMap<String, RegionProviders>, ProviderError> {
            Ok(BTreeMap::new())
        }
    }

    #[test]
    fn start_fetches_popular_and_trending() {
        let mut state = SessionState::default();
        let effects = state.update(SessionEvent::Started);
        assert_eq!(
            effects,
            vec![
                Effect::Fetch {
                    request: 1,
                    query: String::new()
                },
                Effect::LoadTrending
            ]
        );
        assert!(state.is_loading);
    }

    #[test]
    fn only_the_latest_keystroke_fetches() {
        let mut state = SessionState::default();
        let _ = state.update(SessionEvent::QueryChanged("bat".to_string()));
        let _ = state.update(SessionEvent::QueryChanged("batman".to_string()));

        assert!(state.update(SessionEvent::DebounceElapsed { keystroke: 1 }).is_empty());

        let effects = state.update(SessionEvent::DebounceElapsed { keystroke: 2 });
        assert_eq!(
            effects,
            vec![Effect::Fetch {
                request: 1,
                query: "batman".to_string()
            }]
        );
        assert_eq!(state.debounced_term, "batman");
    }

    #[test]
    fn unchanged_debounced_term_does_not_refetch() {
        let mut state = SessionState::default();
        let _ = state.update(SessionEvent::QueryChanged("dune".to_string()));
        let _ = state.update(SessionEvent::DebounceElapsed { keystroke: 1 });
        let _ = state.update(SessionEvent::QueryChanged("dune".to_string()));
        assert!(state.update(SessionEvent::DebounceElapsed { keystroke: 2 }).is_empty());
        assert_eq!(state.request, 1);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut state = SessionState::default();
        let _ = state.update(SessionEvent::QueryChanged("bat".to_string()));
        let _ = state.update(SessionEvent::DebounceElapsed { keystroke: 1 });
        let _ = state.update(SessionEvent::QueryChanged("alien".to_string()));
        let _ = state.update(SessionEvent::DebounceElapsed { keystroke: 2 });

        let _ = state.update(SessionEvent::FetchResolved {
            request: 2,
            movies: vec![movie(348, "Alien", None)],
        });
        let _ = state.update(SessionEvent::FetchResolved {
            request: 1,
            movies: vec![movie(268, "Batman", None)],
        });

        assert_eq!(state.movies.len(), 1);
        assert_eq!(state.movies[0].title, "Alien");
        assert!(!state.is_loading);
    }

    #[test]
    fn failure_sets_message_and_keeps_previous_movies() {
        let mut state = SessionState::default();
        let _ = state.update(SessionEvent::Started);
        let _ = state.update(SessionEvent::FetchResolved {
            request: 1,
            movies: vec![movie(550, "Fight Club", None)],
        });

        let _ = state.update(SessionEvent::QueryChanged("x".to_string()));
        let _ = state.update(SessionEvent::DebounceElapsed { keystroke: 1 });
        let _ = state.update(SessionEvent::FetchFailed {
            request: 2,
            message: "timeout".to_string(),
        });

        assert_eq!(state.error_message.as_deref(), Some(FETCH_ERROR_MESSAGE));
        assert_eq!(state.movies[0].title, "Fight Club");
        assert!(!state.is_loading);
    }

    #[test]
    fn stale_failure_is_ignored() {
        let mut state = SessionState::default();
        let _ = state.update(SessionEvent::Started);
        let _ = state.update(SessionEvent::QueryChanged("x".to_string()));
        let _ = state.update(SessionEvent::DebounceElapsed { keystroke: 1 });
        let _ = state.update(SessionEvent::FetchFailed {
            request: 1,
            message: "late".to_string(),
        });
        assert!(state.error_message.is_none());
        assert!(state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn driver_publishes_only_the_last_debounced_query() {
        let provider = Arc::new(EchoProvider::default());
        let tracker: Arc<dyn PopularityService> = Arc::new(PopularityTracker::new(
            Arc::new(MemoryCounterStore::default()),
            Arc::new(RwLock::new(Config::default())),
        ));
        let search = Arc::new(MovieSearchService::new(
            provider.clone(),
            tracker.clone(),
            true,
        ));

        let SessionHandle {
            input,
            mut state,
            task,
        } = SessionDriver::new(search, tracker, Duration::from_millis(500), 5).spawn();

        input
            .send(SessionEvent::QueryChanged("bat".to_string()))
            .await
            .unwrap();
        input
            .send(SessionEvent::QueryChanged("batman".to_string()))
            .await
            .unwrap();

        let settled = tokio::time::timeout(
            Duration::from_secs(5),
            state.wait_for(|s| s.debounced_term == "batman" && !s.is_loading),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();

        assert_eq!(settled.request, 2);
        assert_eq!(settled.movies.len(), 1);
        assert_eq!(settled.movies[0].title, "batman result");
        assert!(settled.error_message.is_none());
        assert_eq!(*provider.searches.lock().unwrap(), vec!["batman".to_string()]);

        drop(input);
        task.await.unwrap();
    }
}
