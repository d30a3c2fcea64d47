//! Runs the four analyzers concurrently over one post table and merges their
//! outputs into a single [`AnalysisRun`].

use std::sync::Arc;

use chrono::Utc;
use pulse_core::{AnalysisResult, ClusterSummary, PostTable};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::cluster::cluster_topics;
use crate::error::AnalysisError;
use crate::influence::{map_influence, InfluenceReport};
use crate::insights::generate_insights;
use crate::sentiment::{analyze_sentiment, SentimentReport};
use crate::trends::{extract_trends, TrendReport};
use crate::types::{AnalysisConfig, AnalysisRun, AnalyzerFailure, AnalyzerKind, RunState};

/// The analyzer implementations an [`Orchestrator`] dispatches to.
///
/// Each method is a blocking, compute-bound batch job over a read-only table.
pub trait Analyzers: Send + Sync {
    /// # Errors
    ///
    /// Implementation-defined; the orchestrator records the error and leaves
    /// the sentiment fields absent.
    fn sentiment(&self, table: &PostTable) -> Result<SentimentReport, AnalysisError>;

    /// # Errors
    ///
    /// Implementation-defined; keyword and hashtag fields stay absent.
    fn trends(&self, table: &PostTable, top_n: usize) -> Result<TrendReport, AnalysisError>;

    /// `Ok(None)` means clustering produced no usable result.
    ///
    /// # Errors
    ///
    /// Implementation-defined; the cluster field stays absent.
    fn clusters(&self, table: &PostTable, k: usize)
        -> Result<Option<ClusterSummary>, AnalysisError>;

    /// # Errors
    ///
    /// Implementation-defined; the influencer field stays absent.
    fn influence(&self, table: &PostTable) -> Result<InfluenceReport, AnalysisError>;
}

/// The built-in analyzers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAnalyzers;

impl Analyzers for DefaultAnalyzers {
    fn sentiment(&self, table: &PostTable) -> Result<SentimentReport, AnalysisError> {
        Ok(analyze_sentiment(table))
    }

    fn trends(&self, table: &PostTable, top_n: usize) -> Result<TrendReport, AnalysisError> {
        Ok(extract_trends(table, top_n))
    }

    fn clusters(
        &self,
        table: &PostTable,
        k: usize,
    ) -> Result<Option<ClusterSummary>, AnalysisError> {
        match cluster_topics(table, k) {
            Ok(summary) => Ok(Some(summary)),
            Err(e) => {
                tracing::info!(error = %e, "clustering produced no result");
                Ok(None)
            }
        }
    }

    fn influence(&self, table: &PostTable) -> Result<InfluenceReport, AnalysisError> {
        Ok(map_influence(table))
    }
}

pub struct Orchestrator {
    config: AnalysisConfig,
    analyzers: Arc<dyn Analyzers>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            analyzers: Arc::new(DefaultAnalyzers),
        }
    }

    /// Replaces the analyzer implementations.
    #[must_use]
    pub fn with_analyzers(mut self, analyzers: Arc<dyn Analyzers>) -> Self {
        self.analyzers = analyzers;
        self
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes `posts` and returns the frozen run.
    ///
    /// All four analyzers run concurrently; the result is assembled only after
    /// every one of them has finished, failed, or timed out. A failed analyzer
    /// leaves its fields absent and is listed in [`AnalysisRun::failures`].
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::NoData`] when `posts` is empty. No analyzer is
    /// invoked in that case.
    pub async fn run(
        &self,
        query: Option<&str>,
        posts: PostTable,
    ) -> Result<AnalysisRun, AnalysisError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut state = RunState::Idle;

        advance(&mut state, RunState::Fetched, run_id);
        if posts.is_empty() {
            advance(&mut state, RunState::Failed, run_id);
            tracing::warn!(%run_id, "no posts to analyze");
            return Err(AnalysisError::NoData);
        }

        advance(&mut state, RunState::Analyzing, run_id);
        tracing::info!(
            %run_id,
            posts = posts.len(),
            authors = posts.unique_authors(),
            "starting analysis"
        );

        let top_n = self.config.top_n;
        let k = self.config.cluster_count;
        let permits = Semaphore::new(self.config.workers.max(1));
        let (sentiment, trends, clusters, influence) = tokio::join!(
            self.dispatch(AnalyzerKind::Sentiment, &permits, &posts, |a, t| a.sentiment(t)),
            self.dispatch(AnalyzerKind::Trends, &permits, &posts, move |a, t| a.trends(t, top_n)),
            self.dispatch(AnalyzerKind::Clusters, &permits, &posts, move |a, t| a.clusters(t, k)),
            self.dispatch(AnalyzerKind::Influence, &permits, &posts, |a, t| a.influence(t)),
        );

        let mut result = AnalysisResult::default();
        let mut failures = Vec::new();
        let mut influence_graph = None;

        if let Some(report) = record(AnalyzerKind::Sentiment, sentiment, &mut failures) {
            result.sentiment_counts = Some(report.counts);
            result.post_sentiments = Some(report.posts);
            result.average_compound = Some(report.average_compound);
        }
        if let Some(report) = record(AnalyzerKind::Trends, trends, &mut failures) {
            result.top_keywords = Some(report.keywords);
            result.top_hashtags = Some(report.hashtags);
        }
        if let Some(summary) = record(AnalyzerKind::Clusters, clusters, &mut failures) {
            result.clusters = summary;
        }
        if let Some(report) = record(AnalyzerKind::Influence, influence, &mut failures) {
            result.top_influencers = Some(report.top_influencers);
            influence_graph = Some(report.graph);
        }
        advance(&mut state, RunState::Aggregated, run_id);

        advance(&mut state, RunState::Insights, run_id);
        result.strategy_insights = generate_insights(&result, posts.average_engagement());

        advance(&mut state, RunState::Done, run_id);
        tracing::info!(
            %run_id,
            failed = failures.len(),
            insights = result.strategy_insights.len(),
            "analysis complete"
        );

        Ok(AnalysisRun {
            run_id,
            query: query.map(str::to_string),
            started_at,
            finished_at: Utc::now(),
            state,
            posts,
            result,
            influence_graph,
            failures,
        })
    }

    /// Runs one analyzer on the blocking pool, bounded by the run's worker
    /// permits and the per-analyzer deadline.
    ///
    /// The deadline starts once a permit is held. The permit stays with this
    /// future rather than the blocking thread, so a timed-out analyzer frees
    /// its slot immediately; the abandoned thread finishes outside the worker
    /// limit and its output is discarded.
    async fn dispatch<T, F>(
        &self,
        kind: AnalyzerKind,
        permits: &Semaphore,
        posts: &PostTable,
        job: F,
    ) -> Result<T, AnalysisError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn Analyzers, &PostTable) -> Result<T, AnalysisError> + Send + 'static,
    {
        let _permit = permits
            .acquire()
            .await
            .map_err(|_| AnalysisError::AggregationIncomplete { analyzer: kind })?;

        let analyzers = Arc::clone(&self.analyzers);
        let table = posts.clone();
        tracing::debug!(analyzer = %kind, posts = table.len(), "analyzer started");

        let handle = tokio::task::spawn_blocking(move || job(analyzers.as_ref(), &table));

        let joined = match self.config.analyzer_timeout {
            Some(limit) => match tokio::time::timeout(limit, handle).await {
                Ok(joined) => joined,
                Err(_) => return Err(AnalysisError::Timeout { analyzer: kind, limit }),
            },
            None => handle.await,
        };

        match joined {
            Ok(outcome) => {
                tracing::debug!(analyzer = %kind, ok = outcome.is_ok(), "analyzer finished");
                outcome
            }
            Err(e) if e.is_panic() => Err(AnalysisError::Analyzer {
                analyzer: kind,
                reason: "analyzer panicked".to_string(),
            }),
            Err(_) => Err(AnalysisError::AggregationIncomplete { analyzer: kind }),
        }
    }
}

/// Keeps a successful output, or logs the error and records the failure.
fn record<T>(
    kind: AnalyzerKind,
    outcome: Result<T, AnalysisError>,
    failures: &mut Vec<AnalyzerFailure>,
) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(e) => {
            if matches!(e, AnalysisError::AggregationIncomplete { .. }) {
                tracing::error!(analyzer = %kind, error = %e, "analyzer task lost");
            } else {
                tracing::warn!(analyzer = %kind, error = %e, "analyzer failed, field left empty");
            }
            failures.push(AnalyzerFailure {
                analyzer: kind,
                reason: e.to_string(),
            });
            None
        }
    }
}

fn advance(state: &mut RunState, next: RunState, run_id: Uuid) {
    tracing::debug!(%run_id, from = %state, to = %next, "run state");
    *state = next;
}
