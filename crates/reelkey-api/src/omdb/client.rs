use std::time::Duration;

use reelkey_parse::MediaKind;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::error::OmdbError;
use super::types::{OmdbEnvelope, OmdbSearchItem, OmdbSearchResponse, OmdbTitle};
use crate::traits::{MetadataService, SearchResult, TitleDetails};

pub const BASE_URL: &str = "https://www.omdbapi.com/";

/// OMDb returns at most 10 rows per page; the overlay shows fewer.
pub const DEFAULT_MAX_RESULTS: usize = 8;

/// OMDb (Open Movie Database) client.
pub struct OmdbClient {
    api_key: String,
    base_url: String,
    max_results: usize,
    http: Client,
}

impl OmdbClient {
    pub fn new(api_key: String) -> Self {
        Self::with_http(Client::new(), api_key)
    }

    /// Build on a shared `reqwest::Client` (connection pool, timeout).
    pub fn with_http(http: Client, api_key: String) -> Self {
        Self {
            api_key,
            base_url: BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            http,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// A `reqwest::Client` whose requests give up after `timeout`.
    pub fn http_client(timeout: Duration) -> Result<Client, OmdbError> {
        Ok(Client::builder().timeout(timeout).build()?)
    }

    fn require_key(&self) -> Result<&str, OmdbError> {
        let key = self.api_key.trim();
        if key.is_empty() {
            Err(OmdbError::MissingApiKey)
        } else {
            Ok(key)
        }
    }

    /// GET the API root with `params` and decode the body.
    ///
    /// OMDb reports most failures as `{"Response":"False","Error":...}`, sometimes
    /// with a 4xx status (invalid key), so the envelope is checked before the
    /// status code.
    async fn get_json<T: DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, OmdbError> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(params)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if let Ok(envelope) = serde_json::from_str::<OmdbEnvelope>(&body) {
            if let Some(message) = envelope.failure() {
                return Err(OmdbError::Response(message));
            }
        }
        if !status.is_success() {
            return Err(OmdbError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| OmdbError::Parse(e.to_string()))
    }
}

impl MetadataService for OmdbClient {
    type Error = OmdbError;

    async fn search_titles(
        &self,
        query: &str,
        filter: Option<MediaKind>,
    ) -> Result<Vec<SearchResult>, OmdbError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let key = self.require_key()?;

        let mut params = vec![("apikey", key), ("s", query), ("page", "1"), ("r", "json")];
        if let Some(kind) = filter {
            params.push(("type", kind.as_str()));
        }

        tracing::debug!(query, ?filter, "omdb search");
        let resp: OmdbSearchResponse = self.get_json(&params).await?;

        Ok(resp
            .search
            .into_iter()
            .take(self.max_results)
            .map(OmdbSearchItem::into_search_result)
            .collect())
    }

    async fn get_title(&self, id: &str) -> Result<TitleDetails, OmdbError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(OmdbError::InvalidInput("missing identifier".into()));
        }
        let key = self.require_key()?;

        tracing::debug!(id, "omdb lookup");
        let title: OmdbTitle = self
            .get_json(&[("apikey", key), ("i", id), ("r", "json")])
            .await?;

        Ok(title.into_details())
    }
}
