//! JSON exports: the analysis result with run metadata, and the influence
//! subgraph for rendering.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use pulse_analysis::{AnalysisRun, AnalyzerFailure, RunState};
use pulse_core::post::timestamp_format;
use pulse_core::AnalysisResult;
use serde::Serialize;
use uuid::Uuid;

pub(crate) const ANALYSIS_FILE: &str = "analysis.json";
pub(crate) const GRAPH_FILE: &str = "influence_graph.json";

#[derive(Debug, Serialize)]
pub(crate) struct AnalysisExport<'a> {
    pub run_id: Uuid,
    pub query: Option<&'a str>,
    #[serde(serialize_with = "timestamp_format::serialize")]
    pub started_at: DateTime<Utc>,
    #[serde(serialize_with = "timestamp_format::serialize")]
    pub finished_at: DateTime<Utc>,
    pub state: RunState,
    pub post_count: usize,
    pub unique_authors: usize,
    pub failures: &'a [AnalyzerFailure],
    pub result: &'a AnalysisResult,
}

impl<'a> AnalysisExport<'a> {
    pub(crate) fn from_run(run: &'a AnalysisRun) -> Self {
        Self {
            run_id: run.run_id,
            query: run.query.as_deref(),
            started_at: run.started_at,
            finished_at: run.finished_at,
            state: run.state,
            post_count: run.posts.len(),
            unique_authors: run.posts.unique_authors(),
            failures: &run.failures,
            result: &run.result,
        }
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(value)
        .with_context(|| format!("serializing {}", path.display()))?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("writing {}", path.display()))
}

/// Writes `analysis.json` into `dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub(crate) async fn write_analysis(dir: &Path, run: &AnalysisRun) -> anyhow::Result<PathBuf> {
    let path = dir.join(ANALYSIS_FILE);
    write_json(&path, &AnalysisExport::from_run(run)).await?;
    tracing::info!(path = %path.display(), "wrote analysis result");
    Ok(path)
}

/// Writes `influence_graph.json` when the influence analyzer produced a graph.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub(crate) async fn write_influence_graph(
    dir: &Path,
    run: &AnalysisRun,
    max_nodes: usize,
) -> anyhow::Result<Option<PathBuf>> {
    let Some(graph) = run.influence_graph.as_ref() else {
        tracing::warn!("no influence graph for this run, skipping export");
        return Ok(None);
    };
    let export = graph.top_subgraph(max_nodes);
    let path = dir.join(GRAPH_FILE);
    write_json(&path, &export).await?;
    tracing::info!(
        path = %path.display(),
        nodes = export.nodes.len(),
        edges = export.edges.len(),
        "wrote influence graph"
    );
    Ok(Some(path))
}
