use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::MovieProvider;
use crate::clients::tmdb::TmdbClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{CatalogService, MovieSearchService, PopularityService, PopularityTracker};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused by every HTTP-based service so connections are pooled.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("Cinetrend/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub provider: Arc<dyn MovieProvider>,

    pub tracker: Arc<dyn PopularityService>,

    pub search_service: Arc<MovieSearchService>,

    pub catalog: Arc<CatalogService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.tmdb.request_timeout_seconds.into())?;
        let tmdb = TmdbClient::with_shared_client(http_client, &config.tmdb);
        if !tmdb.has_token() {
            tracing::warn!("TMDB bearer token is not configured; movie lookups will fail");
        }

        Self::with_provider(config, Arc::new(tmdb)).await
    }

    /// Builds the state around an arbitrary movie provider.
    pub async fn with_provider(
        config: Config,
        provider: Arc<dyn MovieProvider>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let record_searches = config.search.record_searches;
        let region = config.tmdb.region.clone();
        let config = Arc::new(RwLock::new(config));

        let tracker = Arc::new(PopularityTracker::new(
            Arc::new(store.clone()),
            config.clone(),
        )) as Arc<dyn PopularityService>;

        let search_service = Arc::new(MovieSearchService::new(
            provider.clone(),
            tracker.clone(),
            record_searches,
        ));

        let catalog = Arc::new(CatalogService::new(provider.clone(), region));

        Ok(Self {
            config,
            store,
            provider,
            tracker,
            search_service,
            catalog,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
