//! `CounterStore`-backed implementation of the `PopularityService` trait.

use crate::config::Config;
use crate::db::CounterStore;
use crate::domain::SearchKey;
use crate::models::search_counter::{NewCounter, RecordOutcome};
use crate::services::popularity_service::{
    PopularityService, RepresentativeMovie, TrackerError, TrendingSearch,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub struct PopularityTracker {
    store: Arc<dyn CounterStore>,
    config: Arc<RwLock<Config>>,
}

impl PopularityTracker {
    #[must_use]
    pub fn new(store: Arc<dyn CounterStore>, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl PopularityService for PopularityTracker {
    async fn record_search(
        &self,
        query: &str,
        movie: &RepresentativeMovie,
    ) -> Result<RecordOutcome, TrackerError> {
        let key = SearchKey::normalize(query).ok_or(TrackerError::InvalidQuery)?;
        movie.validate()?;

        let poster_url = self
            .config
            .read()
            .await
            .poster_url(movie.poster_path.as_deref());

        let outcome = self
            .store
            .increment_or_create(NewCounter {
                key: key.clone(),
                movie_id: movie.id,
                poster_url,
                title: movie.title.clone(),
            })
            .await?;

        metrics::counter!("search_counter_records_total", "outcome" => outcome.as_str())
            .increment(1);

        if outcome.is_created() {
            info!(key = %key, movie_id = %movie.id, "Started tracking search");
        } else {
            debug!(key = %key, count = outcome.counter().count, "Search count incremented");
        }

        Ok(outcome)
    }

    async fn top_searches(&self, limit: u64) -> Result<Vec<TrendingSearch>, TrackerError> {
        let max_limit = self.config.read().await.trending.max_limit.max(1);
        let limit = limit.clamp(1, max_limit);

        let counters = self.store.list(limit).await?;

        Ok(counters
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .enumerate()
            .map(|(i, c)| TrendingSearch::from_counter(i + 1, c))
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::Store;
    use crate::domain::MovieId;
    use crate::models::search_counter::{CounterPatch, SearchCounter};
    use tokio::sync::Mutex;

    /// Backend without an atomic upsert, exercising the lookup-then-write path.
    #[derive(Default)]
    pub(crate) struct MemoryCounterStore {
        rows: Mutex<Vec<SearchCounter>>,
    }

    #[async_trait]
    impl CounterStore for MemoryCounterStore {
        async fn find_one(&self, key: &SearchKey) -> anyhow::Result<Option<SearchCounter>> {
            tokio::task::yield_now().await;
            let rows = self.rows.lock().await;
            Ok(rows.iter().find(|c| c.key == key.as_str()).cloned())
        }

        async fn create(&self, counter: NewCounter) -> anyhow::Result<SearchCounter> {
            tokio::task::yield_now().await;
            let mut rows = self.rows.lock().await;
            if rows.iter().any(|c| c.key == counter.key.as_str()) {
                anyhow::bail!("duplicate key {}", counter.key);
            }
            let id = i32::try_from(rows.len()).unwrap_or(i32::MAX) + 1;
            let row = SearchCounter {
                id,
                key: counter.key.into_inner(),
                count: 1,
                movie_id: counter.movie_id,
                poster_url: counter.poster_url,
                title: counter.title,
                created_at: String::new(),
                updated_at: String::new(),
            };
            rows.push(row.clone());
            Ok(row)
        }

        async fn update(&self, id: i32, patch: CounterPatch) -> anyhow::Result<SearchCounter> {
            tokio::task::yield_now().await;
            let mut rows = self.rows.lock().await;
            let row = rows
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| anyhow::anyhow!("no counter {id}"))?;
            row.count = patch.count;
            Ok(row.clone())
        }

        async fn list(&self, limit: u64) -> anyhow::Result<Vec<SearchCounter>> {
            let mut rows = self.rows.lock().await.clone();
            rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.id.cmp(&b.id)));
            rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            Ok(rows)
        }
    }

    /// Backend whose every call fails, as an unreachable database would.
    pub(crate) struct FailingStore;

    #[async_trait]
    impl CounterStore for FailingStore {
        async fn find_one(&self, _key: &SearchKey) -> anyhow::Result<Option<SearchCounter>> {
            anyhow::bail!("database is unavailable")
        }

        async fn create(&self, _counter: NewCounter) -> anyhow::Result<SearchCounter> {
            anyhow::bail!("database is unavailable")
        }

        async fn update(&self, _id: i32, _patch: CounterPatch) -> anyhow::Result<SearchCounter> {
            anyhow::bail!("database is unavailable")
        }

        async fn list(&self, _limit: u64) -> anyhow::Result<Vec<SearchCounter>> {
            anyhow::bail!("database is unavailable")
        }
    }

    fn config() -> Arc<RwLock<Config>> {
        Arc::new(RwLock::new(Config::default()))
    }

    fn batman() -> RepresentativeMovie {
        RepresentativeMovie {
            id: MovieId::new(268),
            title: "Batman".to_string(),
            poster_path: Some("/abc.jpg".to_string()),
        }
    }

    fn movie(id: i64, title: &str) -> RepresentativeMovie {
        RepresentativeMovie {
            id: MovieId::new(id),
            title: title.to_string(),
            poster_path: None,
        }
    }

    async fn sqlite_tracker() -> PopularityTracker {
        let store = Store::new("sqlite::memory:").await.unwrap();
        PopularityTracker::new(Arc::new(store), config())
    }

    fn memory_tracker() -> PopularityTracker {
        PopularityTracker::new(Arc::new(MemoryCounterStore::default()), config())
    }

    #[tokio::test]
    async fn batman_scenario_creates_then_increments() {
        for tracker in [sqlite_tracker().await, memory_tracker()] {
            let first = tracker.record_search("batman", &batman()).await.unwrap();
            assert!(first.is_created());
            let counter = first.counter();
            assert_eq!(counter.key, "batman");
            assert_eq!(counter.count, 1);
            assert_eq!(counter.title, "Batman");
            assert_eq!(counter.poster_url, "https://image.tmdb.org/t/p/w500/abc.jpg");

            let second = tracker
                .record_search("  Batman  ", &batman())
                .await
                .unwrap();
            assert!(!second.is_created());
            assert_eq!(second.counter().id, counter.id);
            assert_eq!(second.counter().count, 2);
        }
    }

    #[tokio::test]
    async fn equal_normalized_queries_share_one_counter() {
        let tracker = sqlite_tracker().await;
        tracker.record_search("Star  Wars", &movie(11, "Star Wars")).await.unwrap();
        tracker.record_search("star wars ", &movie(11, "Star Wars")).await.unwrap();

        let top = tracker.top_searches(10).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].count, 2);
        assert_eq!(top[0].key, "star wars");
    }

    #[tokio::test]
    async fn count_equals_number_of_sequential_calls() {
        for tracker in [sqlite_tracker().await, memory_tracker()] {
            for _ in 0..7 {
                tracker.record_search("alien", &movie(348, "Alien")).await.unwrap();
            }
            let top = tracker.top_searches(1).await.unwrap();
            assert_eq!(top[0].count, 7);
        }
    }

    #[tokio::test]
    async fn single_counter_reads_back_unchanged() {
        let tracker = sqlite_tracker().await;
        tracker.record_search("batman", &batman()).await.unwrap();

        let top = tracker.top_searches(1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[0].count, 1);
        assert_eq!(top[0].title, "Batman");
        assert_eq!(top[0].poster_url, "https://image.tmdb.org/t/p/w500/abc.jpg");
        assert_eq!(top[0].movie_id, MovieId::new(268));
    }

    #[tokio::test]
    async fn later_results_do_not_replace_display_metadata() {
        let tracker = sqlite_tracker().await;
        tracker.record_search("batman", &batman()).await.unwrap();
        let outcome = tracker
            .record_search("batman", &movie(414906, "The Batman"))
            .await
            .unwrap();

        let counter = outcome.into_counter();
        assert_eq!(counter.count, 2);
        assert_eq!(counter.movie_id, MovieId::new(268));
        assert_eq!(counter.title, "Batman");
    }

    #[tokio::test]
    async fn missing_poster_uses_placeholder() {
        let tracker = memory_tracker();
        let outcome = tracker.record_search("heat", &movie(949, "Heat")).await.unwrap();
        assert_eq!(outcome.counter().poster_url, "/no-movie.png");
    }

    #[tokio::test]
    async fn top_searches_orders_by_count_with_creation_tie_break() {
        for tracker in [sqlite_tracker().await, memory_tracker()] {
            let plan = [("one", 1), ("three-a", 3), ("five", 5), ("three-b", 3)];
            for (query, times) in plan {
                for _ in 0..times {
                    tracker.record_search(query, &movie(1, query)).await.unwrap();
                }
            }

            let top = tracker.top_searches(2).await.unwrap();
            assert_eq!(top.len(), 2);
            assert_eq!((top[0].key.as_str(), top[0].count), ("five", 5));
            assert_eq!((top[1].key.as_str(), top[1].count), ("three-a", 3));

            let all = tracker.top_searches(10).await.unwrap();
            let counts: Vec<i64> = all.iter().map(|t| t.count).collect();
            assert_eq!(counts, vec![5, 3, 3, 1]);
            let ranks: Vec<usize> = all.iter().map(|t| t.rank).collect();
            assert_eq!(ranks, vec![1, 2, 3, 4]);
        }
    }

    #[tokio::test]
    async fn top_searches_clamps_limit() {
        let tracker = memory_tracker();
        for i in 0..60 {
            tracker
                .record_search(&format!("query {i}"), &movie(i + 1, "Film"))
                .await
                .unwrap();
        }

        assert_eq!(tracker.top_searches(0).await.unwrap().len(), 1);
        assert_eq!(tracker.top_searches(1000).await.unwrap().len(), 50);
    }

    #[tokio::test]
    async fn blank_query_is_rejected_without_writing() {
        let tracker = sqlite_tracker().await;
        let err = tracker.record_search("   ", &batman()).await.unwrap_err();
        assert!(matches!(err, TrackerError::InvalidQuery));
        assert!(tracker.top_searches(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_record_is_skipped() {
        let tracker = sqlite_tracker().await;
        let err = tracker
            .record_search("batman", &movie(0, "Batman"))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::MalformedResult(_)));

        let err = tracker
            .record_search("batman", &movie(268, ""))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::MalformedResult(_)));

        assert!(tracker.top_searches(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failures_surface_as_persistence_errors() {
        let tracker = PopularityTracker::new(Arc::new(FailingStore), config());

        let err = tracker.record_search("batman", &batman()).await.unwrap_err();
        assert!(matches!(err, TrackerError::Persistence(_)));

        let err = tracker.top_searches(5).await.unwrap_err();
        assert!(matches!(err, TrackerError::Persistence(_)));
    }

    #[tokio::test]
    async fn concurrent_lookup_then_write_never_overcounts() {
        let tracker = Arc::new(memory_tracker());
        let calls = 32;

        let handles: Vec<_> = (0..calls)
            .map(|_| {
                let tracker = tracker.clone();
                tokio::spawn(async move { tracker.record_search("dune", &movie(438631, "Dune")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        let top = tracker.top_searches(10).await.unwrap();
        assert_eq!(top.len(), 1, "at most one counter per key");
        assert!(top[0].count >= 1);
        assert!(top[0].count <= successes);
        assert!(successes <= calls);
    }
}
