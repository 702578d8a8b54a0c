use crate::domain::{MovieId, SearchKey};
use crate::entities::{prelude::*, search_counters};
use crate::models::search_counter::{CounterPatch, NewCounter, RecordOutcome, SearchCounter};
use anyhow::Result;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

/// Repository for search popularity counters
pub struct SearchCounterRepository {
    conn: DatabaseConnection,
}

impl SearchCounterRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: search_counters::Model) -> SearchCounter {
        SearchCounter {
            id: m.id,
            key: m.search_key,
            count: m.count,
            movie_id: MovieId::new(m.movie_id),
            poster_url: m.poster_url,
            title: m.title,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }

    fn new_active_model(counter: NewCounter, now: &str) -> search_counters::ActiveModel {
        search_counters::ActiveModel {
            search_key: Set(counter.key.into_inner()),
            count: Set(1),
            movie_id: Set(counter.movie_id.value()),
            poster_url: Set(counter.poster_url),
            title: Set(counter.title),
            created_at: Set(now.to_string()),
            updated_at: Set(now.to_string()),
            ..Default::default()
        }
    }

    pub async fn find_by_key(&self, key: &SearchKey) -> Result<Option<SearchCounter>> {
        let row = SearchCounters::find()
            .filter(search_counters::Column::SearchKey.eq(key.as_str()))
            .one(&self.conn)
            .await?;

        Ok(row.map(Self::map_model))
    }

    pub async fn insert(&self, counter: NewCounter) -> Result<SearchCounter> {
        let now = chrono::Utc::now().to_rfc3339();
        let model = Self::new_active_model(counter, &now)
            .insert(&self.conn)
            .await?;

        Ok(Self::map_model(model))
    }

    pub async fn update(&self, id: i32, patch: CounterPatch) -> Result<SearchCounter> {
        let existing = SearchCounters::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Search counter {id} not found"))?;

        let mut active = existing.into_active_model();
        active.count = Set(patch.count);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&self.conn).await?;
        Ok(Self::map_model(model))
    }

    pub async fn list_top(&self, limit: u64) -> Result<Vec<SearchCounter>> {
        let rows = SearchCounters::find()
            .order_by_desc(search_counters::Column::Count)
            .order_by_asc(search_counters::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    /// Single-statement upsert: `INSERT .. ON CONFLICT(search_key) DO UPDATE
    /// SET count = count + 1`. Display fields of an existing row are kept.
    pub async fn upsert_increment(&self, counter: NewCounter) -> Result<RecordOutcome> {
        let now = chrono::Utc::now().to_rfc3339();
        let key = counter.key.clone();
        let txn = self.conn.begin().await?;

        SearchCounters::insert(Self::new_active_model(counter, &now))
            .on_conflict(
                OnConflict::column(search_counters::Column::SearchKey)
                    .value(
                        search_counters::Column::Count,
                        Expr::col(search_counters::Column::Count).add(1),
                    )
                    .value(search_counters::Column::UpdatedAt, Expr::value(now.clone()))
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        let row = SearchCounters::find()
            .filter(search_counters::Column::SearchKey.eq(key.as_str()))
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Search counter '{key}' vanished after upsert"))?;

        txn.commit().await?;

        debug!(key = %key, count = row.count, "Search counter upserted");

        let counter = Self::map_model(row);
        if counter.count == 1 {
            Ok(RecordOutcome::Created(counter))
        } else {
            Ok(RecordOutcome::Incremented(counter))
        }
    }

    pub async fn total(&self) -> Result<u64> {
        Ok(SearchCounters::find().count(&self.conn).await?)
    }
}
