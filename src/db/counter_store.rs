//! Persistence seam for search counters.
//!
//! The tracker only ever talks to this trait. `find_one`, `create`, `update`
//! and `list` are the document operations every backend must provide;
//! `increment_or_create` has a lookup-then-write default and should be
//! overridden by backends that can do it atomically.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::SearchKey;
use crate::models::search_counter::{CounterPatch, NewCounter, RecordOutcome, SearchCounter};

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Exact-match lookup on the normalized key.
    async fn find_one(&self, key: &SearchKey) -> Result<Option<SearchCounter>>;

    /// Inserts a counter with `count = 1`.
    async fn create(&self, counter: NewCounter) -> Result<SearchCounter>;

    async fn update(&self, id: i32, patch: CounterPatch) -> Result<SearchCounter>;

    /// Counters ordered by `count` descending, ties broken by creation order
    /// (oldest first), truncated to `limit`.
    async fn list(&self, limit: u64) -> Result<Vec<SearchCounter>>;

    /// Adds one to the counter for `counter.key`, creating it when missing.
    ///
    /// The default is not atomic: two concurrent callers may both miss and
    /// both create, or both read the same count and write the same `count + 1`.
    /// Either way the stored count can only fall short of the number of
    /// calls, never exceed it.
    async fn increment_or_create(&self, counter: NewCounter) -> Result<RecordOutcome> {
        match self.find_one(&counter.key).await? {
            Some(existing) => {
                let updated = self
                    .update(existing.id, CounterPatch::count(existing.count + 1))
                    .await?;
                Ok(RecordOutcome::Incremented(updated))
            }
            None => {
                let created = self.create(counter).await?;
                Ok(RecordOutcome::Created(created))
            }
        }
    }
}
