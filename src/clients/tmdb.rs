use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use super::{MovieProvider, ProviderError};
use crate::config::TmdbConfig;
use crate::domain::MovieId;
use crate::models::movie::{Genre, Keyword, Movie, RegionProviders, Video};

#[derive(Deserialize)]
struct PagedResponse<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Deserialize)]
struct GenreResponse {
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Deserialize)]
struct KeywordResponse {
    #[serde(default)]
    keywords: Vec<Keyword>,
}

#[derive(Deserialize)]
struct WatchProviderResponse {
    #[serde(default)]
    results: BTreeMap<String, RegionProviders>,
}

/// TMDB v3 REST client authenticated with a v4 bearer token.
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    language: String,
    token: Option<String>,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.into()))
            .user_agent("Cinetrend/1.0")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build TMDB HTTP client: {e}"))?;

        Ok(Self::with_shared_client(client, config))
    }

    #[must_use]
    pub fn with_shared_client(client: Client, config: &TmdbConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            token: config.resolve_token(),
        }
    }

    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let token = self.token.as_deref().ok_or(ProviderError::MissingToken)?;
        let url = format!("{}{}", self.base_url, path);

        debug!(path = %path, "TMDB request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MovieProvider for TmdbClient {
    async fn search_movies(&self, query: &str) -> Result<Vec<Movie>, ProviderError> {
        let response: PagedResponse<Movie> = self
            .get(
                "/search/movie",
                &[
                    ("query", query),
                    ("include_adult", "false"),
                    ("language", self.language.as_str()),
                    ("page", "1"),
                ],
            )
            .await?;

        Ok(response.results)
    }

    async fn discover_popular(&self) -> Result<Vec<Movie>, ProviderError> {
        let response: PagedResponse<Movie> = self
            .get(
                "/discover/movie",
                &[("sort_by", "popularity.desc"), ("language", self.language.as_str())],
            )
            .await?;

        Ok(response.results)
    }

    async fn genres(&self) -> Result<Vec<Genre>, ProviderError> {
        let response: GenreResponse = self.get("/genre/movie/list", &[("language", "en")]).await?;
        Ok(response.genres)
    }

    async fn keywords(&self, id: MovieId) -> Result<Vec<Keyword>, ProviderError> {
        let response: KeywordResponse = self.get(&format!("/movie/{id}/keywords"), &[]).await?;
        Ok(response.keywords)
    }

    async fn videos(&self, id: MovieId) -> Result<Vec<Video>, ProviderError> {
        let response: PagedResponse<Video> = self
            .get(&format!("/movie/{id}/videos"), &[("language", self.language.as_str())])
            .await?;

        Ok(response.results)
    }

    async fn watch_providers(
        &self,
        id: MovieId,
    ) -> Result<BTreeMap<String, RegionProviders>, ProviderError> {
        let response: WatchProviderResponse = self
            .get(&format!("/movie/{id}/watch/providers"), &[])
            .await?;

        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_response_tolerates_missing_results() {
        let parsed: PagedResponse<Movie> = serde_json::from_str(r#"{"page": 1}"#).unwrap();
        assert!(parsed.results.is_empty());
    }

    #[test]
    fn watch_providers_parse_by_region() {
        let json = r#"{
            "id": 268,
            "results": {
                "US": {
                    "link": "https://www.themoviedb.org/movie/268/watch?locale=US",
                    "flatrate": [{"provider_id": 8, "provider_name": "Netflix", "logo_path": "/n.jpg"}]
                },
                "GB": {"rent": [{"provider_id": 2, "provider_name": "Apple TV", "logo_path": null}]}
            }
        }"#;

        let parsed: WatchProviderResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results["US"].flatrate[0].provider_name, "Netflix");
        assert!(parsed.results["GB"].flatrate.is_empty());
        assert_eq!(parsed.results["GB"].rent.len(), 1);
    }

    #[tokio::test]
    async fn missing_token_fails_before_any_request() {
        let config = TmdbConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..TmdbConfig::default()
        };
        let client = TmdbClient {
            client: Client::new(),
            base_url: config.base_url.clone(),
            language: config.language.clone(),
            token: None,
        };

        let err = client.search_movies("batman").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingToken));
    }
}
