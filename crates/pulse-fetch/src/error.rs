use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by post sources.
///
/// Every variant halts the pipeline: a source that could not be reached is
/// reported differently from one that returned no posts (`Ok(vec![])`).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429. `retry_after_secs` comes from the rate-limit reset header.
    #[error("rate limited by the X API")]
    RateLimited { retry_after_secs: Option<u64> },

    /// HTTP 401 or 403: bad, expired or under-privileged bearer token.
    #[error("X API rejected the credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Any other non-2xx response.
    #[error("unexpected HTTP {status} from X API: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source is not usable as configured (bad base URL, missing token).
    #[error("invalid source configuration: {0}")]
    InvalidConfig(String),
}

impl FetchError {
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited { .. })
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Unauthorized { .. })
    }
}
