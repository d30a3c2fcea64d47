//! HTTP client for the X API v2 recent-search endpoint.
//!
//! Wraps `reqwest` with bearer authentication, status mapping, retry on
//! transient failures and `next_token` pagination. Each page is normalized
//! into [`RawPost`] records as it arrives.

use std::time::Duration;

use chrono::Utc;
use pulse_core::{AppConfig, RawPost};
use reqwest::{Client, Response, StatusCode, Url};

use crate::error::FetchError;
use crate::normalize::normalize_page;
use crate::retry::retry_with_backoff;
use crate::source::{PostSource, SearchRequest};
use crate::types::SearchResponse;

const DEFAULT_BASE_URL: &str = "https://api.x.com/2/";
const SEARCH_PATH: &str = "tweets/search/recent";

/// Page size bounds accepted by `max_results`.
const MIN_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

const TWEET_FIELDS: &str = "created_at,public_metrics,author_id,text";
const USER_FIELDS: &str = "username,name,public_metrics,location";

/// Client for X API v2 recent search.
///
/// Use [`XClient::new`] for production or [`XClient::with_base_url`] to
/// point at a mock server in tests.
pub struct XClient {
    client: Client,
    bearer_token: String,
    search_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl XClient {
    /// Creates a client pointed at the production X API.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(bearer_token: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        Self::with_base_url(bearer_token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`FetchError::InvalidConfig`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        bearer_token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("campaign-pulse/0.1 (sentiment-analysis)")
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let search_url = Url::parse(&normalised)
            .and_then(|base| base.join(SEARCH_PATH))
            .map_err(|e| {
                FetchError::InvalidConfig(format!("invalid base URL '{base_url}': {e}"))
            })?;

        Ok(Self {
            client,
            bearer_token: bearer_token.to_owned(),
            search_url,
            max_retries: 3,
            backoff_base_ms: 1_000,
        })
    }

    /// Overrides the retry budget for transient failures.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Builds a client from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidConfig`] when no bearer token is
    /// configured or the base URL is malformed.
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let token = config
            .require_bearer_token()
            .map_err(|e| FetchError::InvalidConfig(e.to_string()))?;
        Ok(
            Self::with_base_url(token, config.fetch_timeout_secs, &config.x_api_base_url)?
                .with_retry(config.fetch_max_retries, config.fetch_retry_backoff_ms),
        )
    }

    /// Fetches up to `request.count` posts, following `next_token` pages.
    ///
    /// # Errors
    ///
    /// - [`FetchError::RateLimited`] on HTTP 429 (not retried).
    /// - [`FetchError::Unauthorized`] on HTTP 401/403 (not retried).
    /// - [`FetchError::UnexpectedStatus`] on any other non-2xx after retries.
    /// - [`FetchError::Deserialize`] if a page does not match the v2 shape.
    pub async fn search_recent(&self, request: &SearchRequest) -> Result<Vec<RawPost>, FetchError> {
        let mut posts: Vec<RawPost> = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0u32;

        while posts.len() < request.count {
            let remaining = request.count - posts.len();
            let url = self.build_search_url(request, next_token.as_deref(), remaining);
            let page = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                self.request_page(&url)
            })
            .await?;
            pages += 1;

            let fetched = page.data.len();
            next_token = page.meta.next_token.clone();
            posts.extend(normalize_page(page));

            tracing::debug!(
                page = pages,
                fetched,
                total = posts.len(),
                has_next = next_token.is_some(),
                "fetched search page"
            );

            if fetched == 0 || next_token.is_none() {
                break;
            }
        }

        posts.truncate(request.count);
        tracing::info!(
            query = %request.query,
            pages,
            posts = posts.len(),
            "X search complete"
        );
        Ok(posts)
    }

    /// Builds the recent-search URL with percent-encoded query parameters.
    ///
    /// `remaining` is clamped into the 10..=100 range the endpoint accepts.
    pub(crate) fn build_search_url(
        &self,
        request: &SearchRequest,
        next_token: Option<&str>,
        remaining: usize,
    ) -> Url {
        let mut url = self.search_url.clone();
        let page_size = remaining.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &request.query);
            pairs.append_pair("max_results", &page_size.to_string());
            pairs.append_pair("expansions", "author_id");
            pairs.append_pair("tweet.fields", TWEET_FIELDS);
            pairs.append_pair("user.fields", USER_FIELDS);
            if let Some(since) = request.since {
                pairs.append_pair("start_time", &format!("{}T00:00:00Z", since.format("%Y-%m-%d")));
            }
            if let Some(token) = next_token {
                pairs.append_pair("next_token", token);
            }
        }
        url
    }

    async fn request_page(&self, url: &Url) -> Result<SearchResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })
    }

    /// Maps non-2xx responses onto [`FetchError`] variants.
    async fn check_status(response: Response) -> Result<Response, FetchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get("x-rate-limit-reset")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<i64>().ok())
                    .and_then(|reset| u64::try_from(reset - Utc::now().timestamp()).ok());
                Err(FetchError::RateLimited { retry_after_secs })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FetchError::Unauthorized {
                status: status.as_u16(),
            }),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(FetchError::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

impl PostSource for XClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawPost>, FetchError> {
        self.search_recent(request).await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
