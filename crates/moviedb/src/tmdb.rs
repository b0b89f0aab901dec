use std::time::Duration;

use async_trait::async_trait;
use moviedb_core::page::ResultPage;
use moviedb_core::search::SearchQuery;
use moviedb_core::tmdb::{
    search_query_params, transform_search_response, TmdbSearchResponse, TMDB_API_BASE,
};

use crate::error::Error;
use crate::service::SearchService;

/// TMDB configuration from environment variables
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub language: Option<String>,
    pub include_adult: bool,
    pub timeout: Duration,
}

impl TmdbConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Load configuration from environment variables
    ///
    /// Uses TMDB_API_KEY (required), TMDB_BASE_URL, TMDB_LANGUAGE,
    /// TMDB_INCLUDE_ADULT and TMDB_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let include_adult = match lookup("TMDB_INCLUDE_ADULT") {
            Some(value) => parse_bool(&value).ok_or_else(|| {
                Error::Config(format!("TMDB_INCLUDE_ADULT must be true or false, got {value}"))
            })?,
            None => false,
        };

        let timeout_secs = match lookup("TMDB_TIMEOUT_SECS") {
            Some(value) => value.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("TMDB_TIMEOUT_SECS must be a number, got {value}"))
            })?,
            None => Self::DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key: lookup("TMDB_API_KEY").unwrap_or_default(),
            base_url: lookup("TMDB_BASE_URL").unwrap_or_else(|| TMDB_API_BASE.to_string()),
            language: lookup("TMDB_LANGUAGE").filter(|l| !l.is_empty()),
            include_adult,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(
        mut self,
        api_key: Option<String>,
        base_url: Option<String>,
        language: Option<String>,
    ) -> Self {
        if let Some(key) = api_key {
            self.api_key = key;
        }
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(language) = language {
            self.language = Some(language);
        }
        self
    }

    /// Fail early when no API key was provided by any source
    pub fn validate(self) -> Result<Self, Error> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config(
                "TMDB_API_KEY environment variable not set and no --api-key given".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn search_url(&self) -> String {
        format!("{}/search/movie", self.base_url.trim_end_matches('/'))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Create the HTTP client used to talk to TMDB
pub fn create_tmdb_client(config: &TmdbConfig) -> Result<reqwest::Client, Error> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(concat!("moviedb/", env!("CARGO_PKG_VERSION")))
        .timeout(config.timeout)
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))
}

/// [`SearchService`] backed by the TMDB `search/movie` endpoint
#[derive(Debug, Clone)]
pub struct TmdbSearchService {
    client: reqwest::Client,
    search_url: String,
    language: Option<String>,
    include_adult: bool,
}

impl TmdbSearchService {
    pub fn new(client: reqwest::Client, config: &TmdbConfig) -> Self {
        Self {
            client,
            search_url: config.search_url(),
            language: config.language.clone(),
            include_adult: config.include_adult,
        }
    }
}

#[async_trait]
impl SearchService for TmdbSearchService {
    async fn fetch(&self, api_key: &str, query: &str, page: u32) -> Result<ResultPage, Error> {
        let query =
            SearchQuery::new(query, page).map_err(|e| Error::InvalidRequest(e.to_string()))?;
        let params =
            search_query_params(api_key, &query, self.language.as_deref(), self.include_adult);

        log::debug!("GET {} query={:?} page={}", self.search_url, query.text(), page);

        let response = self
            .client
            .get(&self.search_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Network(format!("Request to TMDB timed out: {e}"))
                } else {
                    Error::Network(format!("Failed to send request to TMDB: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("TMDB returned HTTP {status}");
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("Failed to read TMDB response: {e}")))?;

        let search_response: TmdbSearchResponse =
            serde_json::from_slice(&bytes).map_err(|e| Error::Decode(e.to_string()))?;

        transform_search_response(search_response)
            .map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}
