use std::path::PathBuf;

use crate::ConfigError;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub output_dir: PathBuf,
    pub x_bearer_token: Option<String>,
    pub x_api_base_url: String,
    pub fetch_timeout_secs: u64,
    pub fetch_max_retries: u32,
    pub fetch_retry_backoff_ms: u64,
    pub default_post_count: usize,
    pub lookback_days: u32,
    pub cluster_count: usize,
    pub top_n: usize,
    pub graph_max_nodes: usize,
    pub analysis_workers: usize,
    pub analyzer_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("output_dir", &self.output_dir)
            .field(
                "x_bearer_token",
                &self.x_bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .field("x_api_base_url", &self.x_api_base_url)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("fetch_max_retries", &self.fetch_max_retries)
            .field("fetch_retry_backoff_ms", &self.fetch_retry_backoff_ms)
            .field("default_post_count", &self.default_post_count)
            .field("lookback_days", &self.lookback_days)
            .field("cluster_count", &self.cluster_count)
            .field("top_n", &self.top_n)
            .field("graph_max_nodes", &self.graph_max_nodes)
            .field("analysis_workers", &self.analysis_workers)
            .field("analyzer_timeout_secs", &self.analyzer_timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// The X API bearer token, required for live fetches.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `X_BEARER_TOKEN` is unset.
    pub fn require_bearer_token(&self) -> Result<&str, ConfigError> {
        self.x_bearer_token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("X_BEARER_TOKEN".to_string()))
    }
}
