//! Per-movie metadata lookups backing the detail view.

use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::clients::{MovieProvider, ProviderError};
use crate::domain::MovieId;
use crate::models::movie::{GenreMap, Keyword, RegionProviders, Video, genre_map};

/// Keywords shown on a detail page.
pub const DETAIL_KEYWORD_LIMIT: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct Trailer {
    pub key: String,
    pub site: String,
    pub name: String,
    pub url: Option<String>,
}

impl From<Video> for Trailer {
    fn from(video: Video) -> Self {
        let url = video.watch_url();
        Self {
            key: video.key,
            site: video.site,
            name: video.name,
            url,
        }
    }
}

/// Everything the detail view loads besides the movie record itself.
///
/// Each part degrades on its own: a failed lookup leaves it empty.
#[derive(Debug, Clone, Serialize)]
pub struct MovieExtras {
    pub movie_id: MovieId,
    pub keywords: Vec<Keyword>,
    pub trailer: Option<Trailer>,
    pub region: String,
    pub providers: RegionProviders,
}

pub struct CatalogService {
    provider: Arc<dyn MovieProvider>,
    default_region: String,
}

impl CatalogService {
    #[must_use]
    pub fn new(provider: Arc<dyn MovieProvider>, default_region: impl Into<String>) -> Self {
        Self {
            provider,
            default_region: default_region.into(),
        }
    }

    pub async fn genre_map(&self) -> Result<GenreMap, ProviderError> {
        Ok(genre_map(self.provider.genres().await?))
    }

    pub async fn keywords(&self, id: MovieId, limit: usize) -> Result<Vec<Keyword>, ProviderError> {
        let mut keywords = self.provider.keywords(id).await?;
        keywords.truncate(limit);
        Ok(keywords)
    }

    /// First video listed for the movie.
    pub async fn trailer(&self, id: MovieId) -> Result<Option<Trailer>, ProviderError> {
        let videos = self.provider.videos(id).await?;
        Ok(videos.into_iter().next().map(Trailer::from))
    }

    /// Providers for `region` (default region when `None`); empty when the
    /// movie is not available there.
    pub async fn watch_providers(
        &self,
        id: MovieId,
        region: Option<&str>,
    ) -> Result<(String, RegionProviders), ProviderError> {
        let region = region
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.default_region)
            .to_uppercase();

        let mut all = self.provider.watch_providers(id).await?;
        let providers = all.remove(&region).unwrap_or_default();
        Ok((region, providers))
    }

    pub async fn extras(&self, id: MovieId, region: Option<&str>) -> MovieExtras {
        let (keywords, trailer, providers) = futures::join!(
            self.keywords(id, DETAIL_KEYWORD_LIMIT),
            self.trailer(id),
            self.watch_providers(id, region),
        );

        let keywords = keywords.unwrap_or_else(|e| {
            warn!(movie_id = %id, error = %e, "Keyword lookup failed");
            Vec::new()
        });
        let trailer = trailer.unwrap_or_else(|e| {
            warn!(movie_id = %id, error = %e, "Trailer lookup failed");
            None
        });
        let (region, providers) = providers.unwrap_or_else(|e| {
            warn!(movie_id = %id, error = %e, "Watch provider lookup failed");
            (self.default_region.to_uppercase(), RegionProviders::default())
        });

        MovieExtras {
            movie_id: id,
            keywords,
            trailer,
            region,
            providers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::movie::{Genre, Movie, WatchProvider};
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    struct DetailProvider {
        fail_keywords: bool,
    }

    #[async_trait]
    impl MovieProvider for DetailProvider {
        async fn search_movies(&self, _query: &str) -> Result<Vec<Movie>, ProviderError> {
            Ok(vec![])
        }

        async fn discover_popular(&self) -> Result<Vec<Movie>, ProviderError> {
            Ok(vec![])
        }

        async fn genres(&self) -> Result<Vec<Genre>, ProviderError> {
            Ok(vec![
                Genre { id: 28, name: "Action".to_string() },
                Genre { id: 35, name: "Comedy".to_string() },
            ])
        }

        async fn keywords(&self, _id: MovieId) -> Result<Vec<Keyword>, ProviderError> {
            if self.fail_keywords {
                return Err(ProviderError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok((1..=12)
                .map(|i| Keyword { id: i, name: format!("kw{i}") })
                .collect())
        }

        async fn videos(&self, id: MovieId) -> Result<Vec<Video>, ProviderError> {
            if id.value() == 1 {
                return Ok(vec![]);
            }
            Ok(vec![
                Video {
                    key: "first".to_string(),
                    site: "YouTube".to_string(),
                    name: "Teaser".to_string(),
                    kind: "Teaser".to_string(),
                },
                Video {
                    key: "second".to_string(),
                    site: "YouTube".to_string(),
                    name: "Trailer".to_string(),
                    kind: "Trailer".to_string(),
                },
            ])
        }

        async fn watch_providers(
            &self,
            _id: MovieId,
        ) -> Result<BTreeMap<String, RegionProviders>, ProviderError> {
            let mut map = BTreeMap::new();
            map.insert(
                "US".to_string(),
                RegionProviders {
                    link: None,
                    flatrate: vec![WatchProvider {
                        provider_id: 8,
                        provider_name: "Netflix".to_string(),
                        logo_path: None,
                    }],
                    rent: vec![],
                    buy: vec![],
                },
            );
            Ok(map)
        }
    }

    fn service(fail_keywords: bool) -> CatalogService {
        CatalogService::new(Arc::new(DetailProvider { fail_keywords }), "US")
    }

    #[tokio::test]
    async fn keywords_are_truncated() {
        let keywords = service(false)
            .keywords(MovieId::new(268), DETAIL_KEYWORD_LIMIT)
            .await
            .unwrap();
        assert_eq!(keywords.len(), 8);
        assert_eq!(keywords[0].name, "kw1");
    }

    #[tokio::test]
    async fn trailer_is_first_video() {
        let trailer = service(false).trailer(MovieId::new(268)).await.unwrap().unwrap();
        assert_eq!(trailer.key, "first");
        assert_eq!(
            trailer.url.as_deref(),
            Some("https://www.youtube.com/watch?v=first")
        );

        assert!(service(false).trailer(MovieId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn providers_default_region_and_case() {
        let svc = service(false);
        let (region, providers) = svc.watch_providers(MovieId::new(268), None).await.unwrap();
        assert_eq!(region, "US");
        assert_eq!(providers.flatrate.len(), 1);

        let (region, providers) = svc
            .watch_providers(MovieId::new(268), Some("gb"))
            .await
            .unwrap();
        assert_eq!(region, "GB");
        assert!(providers.is_empty());
    }

    #[tokio::test]
    async fn extras_degrade_per_lookup() {
        let extras = service(true).extras(MovieId::new(268), None).await;
        assert!(extras.keywords.is_empty());
        assert_eq!(extras.trailer.map(|t| t.key).as_deref(), Some("first"));
        assert_eq!(extras.providers.flatrate[0].provider_name, "Netflix");
    }

    #[tokio::test]
    async fn genre_map_resolves_names() {
        let map = service(false).genre_map().await.unwrap();
        assert_eq!(map.get(&35).map(String::as_str), Some("Comedy"));
    }
}
