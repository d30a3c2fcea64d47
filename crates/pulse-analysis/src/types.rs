use std::time::Duration;

use chrono::{DateTime, Utc};
use pulse_core::{AnalysisResult, AppConfig, PostTable};
use serde::Serialize;
use uuid::Uuid;

use crate::influence::InfluenceGraph;

/// Tuning for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Requested number of topic clusters (`k`).
    pub cluster_count: usize,
    /// Number of keywords and hashtags kept by the trend extractor.
    pub top_n: usize,
    /// Maximum number of analyzers running at once.
    pub workers: usize,
    /// Per-analyzer deadline. `None` waits indefinitely.
    pub analyzer_timeout: Option<Duration>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cluster_count: 3,
            top_n: 20,
            workers: 4,
            analyzer_timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            cluster_count: config.cluster_count,
            top_n: config.top_n,
            workers: config.analysis_workers,
            analyzer_timeout: Some(Duration::from_secs(config.analyzer_timeout_secs)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    Sentiment,
    Trends,
    Clusters,
    Influence,
}

impl std::fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzerKind::Sentiment => write!(f, "sentiment"),
            AnalyzerKind::Trends => write!(f, "trends"),
            AnalyzerKind::Clusters => write!(f, "clusters"),
            AnalyzerKind::Influence => write!(f, "influence"),
        }
    }
}

/// An analyzer that did not contribute to the result. Its fields stay absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzerFailure {
    pub analyzer: AnalyzerKind,
    pub reason: String,
}

/// Lifecycle of one run. `Failed` is only reachable from `Fetched`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Fetched,
    Analyzing,
    Aggregated,
    Insights,
    Done,
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Fetched => "fetched",
            RunState::Analyzing => "analyzing",
            RunState::Aggregated => "aggregated",
            RunState::Insights => "insights",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A completed run. Built once by the orchestrator and never mutated after.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub run_id: Uuid,
    pub query: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub state: RunState,
    pub posts: PostTable,
    pub result: AnalysisResult,
    pub influence_graph: Option<InfluenceGraph>,
    pub failures: Vec<AnalyzerFailure>,
}

impl AnalysisRun {
    #[must_use]
    pub fn failed(&self, analyzer: AnalyzerKind) -> bool {
        self.failures.iter().any(|f| f.analyzer == analyzer)
    }
}
