//! Shared types for campaign-pulse: post records, the analysis result
//! contract, text normalization and environment configuration.

pub mod app_config;
pub mod config;
pub mod post;
pub mod result;
pub mod text;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use post::{Post, PostTable, RawPost};
pub use result::{
    AnalysisResult, ClusterSummary, Influencer, PostSentiment, RankedTerm, SentimentCounts,
    SentimentLabel, TagCount,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
