use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::MovieId;

/// A movie as returned by TMDB search and discovery endpoints.
///
/// `id` and `title` default when absent so a malformed record still
/// deserializes; the popularity tracker rejects such records itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    #[serde(default)]
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub release_date: Option<String>,
    pub original_language: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

impl Movie {
    /// Release year parsed from `release_date` (`YYYY-MM-DD`).
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Keyword {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Video {
    pub key: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl Video {
    /// Embed/watch URL for the hosting site, when the site is known.
    #[must_use]
    pub fn watch_url(&self) -> Option<String> {
        match self.site.as_str() {
            "YouTube" => Some(format!("https://www.youtube.com/watch?v={}", self.key)),
            "Vimeo" => Some(format!("https://vimeo.com/{}", self.key)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchProvider {
    pub provider_id: i64,
    pub provider_name: String,
    pub logo_path: Option<String>,
}

/// Where a movie can be watched in a single region.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionProviders {
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Vec<WatchProvider>,
    #[serde(default)]
    pub rent: Vec<WatchProvider>,
    #[serde(default)]
    pub buy: Vec<WatchProvider>,
}

impl RegionProviders {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flatrate.is_empty() && self.rent.is_empty() && self.buy.is_empty()
    }
}

/// Genre id to display name, as the detail view renders it.
pub type GenreMap = BTreeMap<i64, String>;

#[must_use]
pub fn genre_map(genres: Vec<Genre>) -> GenreMap {
    genres.into_iter().map(|g| (g.id, g.name)).collect()
}

/// Joins the image host, size segment and poster path fragment.
///
/// Missing or blank fragments yield `placeholder`.
#[must_use]
pub fn poster_url(
    image_base: &str,
    size: &str,
    poster_path: Option<&str>,
    placeholder: &str,
) -> String {
    match poster_path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => {
            let base = image_base.trim_end_matches('/');
            if path.starts_with('/') {
                format!("{base}/{size}{path}")
            } else {
                format!("{base}/{size}/{path}")
            }
        }
        None => placeholder.to_string(),
    }
}
