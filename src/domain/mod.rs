//! Domain primitives shared by the tracker, the provider client and the API.
//!
//! Newtypes keep movie identifiers and aggregation keys from being mixed up
//! with arbitrary integers and raw user input.

use serde::{Deserialize, Serialize};
use std::fmt;

/// TMDB movie identifier.
///
/// # Examples
///
/// ```rust
/// use cinetrend::domain::MovieId;
///
/// let id = MovieId::new(268);
/// assert_eq!(id.value(), 268);
/// assert_eq!(id.to_string(), "268");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MovieId(i64);

impl MovieId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// TMDB never issues ids below 1.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<MovieId> for i64 {
    fn from(id: MovieId) -> Self {
        id.0
    }
}

impl From<i64> for MovieId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

impl Serialize for MovieId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = i64::deserialize(deserializer)?;
        Ok(Self::new(id))
    }
}

/// Canonical aggregation key for a search query.
///
/// Built only through [`SearchKey::normalize`], so every key in the store went
/// through the same rule: surrounding whitespace trimmed, inner whitespace runs
/// collapsed to one space, and the whole string lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SearchKey(String);

impl SearchKey {
    /// Returns `None` when nothing is left after normalization.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        let key = normalize_query(raw);
        if key.is_empty() { None } else { Some(Self(key)) }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SearchKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Maps a raw search string to its aggregation bucket.
///
/// Pure; the empty string comes back for blank input.
#[must_use]
pub fn normalize_query(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
