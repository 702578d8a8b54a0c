use serde::Serialize;

use crate::domain::{MovieId, SearchKey};

/// Persisted popularity counter for one normalized query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchCounter {
    pub id: i32,
    pub key: String,
    pub count: i64,
    pub movie_id: MovieId,
    pub poster_url: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for a counter that does not exist yet. `count` starts at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCounter {
    pub key: SearchKey,
    pub movie_id: MovieId,
    pub poster_url: String,
    pub title: String,
}

/// Update applied to an existing counter. Display fields are frozen at
/// creation, so the count is the only mutable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterPatch {
    pub count: i64,
}

impl CounterPatch {
    #[must_use]
    pub const fn count(count: i64) -> Self {
        Self { count }
    }
}

/// What an increment-or-create did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Created(SearchCounter),
    Incremented(SearchCounter),
}

impl RecordOutcome {
    #[must_use]
    pub const fn counter(&self) -> &SearchCounter {
        match self {
            Self::Created(c) | Self::Incremented(c) => c,
        }
    }

    #[must_use]
    pub fn into_counter(self) -> SearchCounter {
        match self {
            Self::Created(c) | Self::Incremented(c) => c,
        }
    }

    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// Label used for metrics and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Incremented(_) => "incremented",
        }
    }
}
