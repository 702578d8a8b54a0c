use crate::domain::SearchKey;
use crate::models::search_counter::{CounterPatch, NewCounter, RecordOutcome, SearchCounter};
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod counter_store;
pub mod migrator;
pub mod repositories;

pub use counter_store::CounterStore;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn counter_repo(&self) -> repositories::search_counter::SearchCounterRepository {
        repositories::search_counter::SearchCounterRepository::new(self.conn.clone())
    }

    pub async fn count_search_counters(&self) -> Result<u64> {
        self.counter_repo().total().await
    }
}

#[async_trait]
impl CounterStore for Store {
    async fn find_one(&self, key: &SearchKey) -> Result<Option<SearchCounter>> {
        self.counter_repo().find_by_key(key).await
    }

    async fn create(&self, counter: NewCounter) -> Result<SearchCounter> {
        self.counter_repo().insert(counter).await
    }

    async fn update(&self, id: i32, patch: CounterPatch) -> Result<SearchCounter> {
        self.counter_repo().update(id, patch).await
    }

    async fn list(&self, limit: u64) -> Result<Vec<SearchCounter>> {
        self.counter_repo().list_top(limit).await
    }

    async fn increment_or_create(&self, counter: NewCounter) -> Result<RecordOutcome> {
        self.counter_repo().upsert_increment(counter).await
    }
}
