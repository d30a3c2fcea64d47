//! Markdown report rendering.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use pulse_analysis::AnalysisRun;
use pulse_core::SentimentLabel;

pub(crate) const REPORT_FILE: &str = "report.md";

/// Rows shown in the keyword and hashtag tables.
const TABLE_ROWS: usize = 10;

const NOT_AVAILABLE: &str = "_Not available for this run._";

/// Writes `report.md` into `dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub(crate) async fn write_report(
    dir: &Path,
    run: &AnalysisRun,
    generated_at: DateTime<Utc>,
) -> anyhow::Result<PathBuf> {
    let path = dir.join(REPORT_FILE);
    tokio::fs::write(&path, render_report(run, generated_at))
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote markdown report");
    Ok(path)
}

#[allow(clippy::too_many_lines)]
pub(crate) fn render_report(run: &AnalysisRun, generated_at: DateTime<Utc>) -> String {
    let result = &run.result;
    let mut out: Vec<String> = Vec::new();

    out.push("# Campaign Pulse Report".to_string());
    out.push(String::new());
    out.push(format!(
        "**Query**: {}",
        run.query.as_deref().unwrap_or("(none)")
    ));
    out.push(format!(
        "**Generated**: {}",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    out.push(format!("**Posts analyzed**: {}", run.posts.len()));
    out.push(format!("**Unique authors**: {}", run.posts.unique_authors()));
    if let Some((first, last)) = run.posts.time_span() {
        out.push(format!(
            "**Time span**: {} to {}",
            first.format("%Y-%m-%d %H:%M"),
            last.format("%Y-%m-%d %H:%M")
        ));
    }
    if let Some(avg) = run.posts.average_engagement() {
        out.push(format!("**Average engagement**: {avg:.1}"));
    }
    if !run.failures.is_empty() {
        let failed: Vec<String> = run
            .failures
            .iter()
            .map(|f| format!("{} ({})", f.analyzer, f.reason))
            .collect();
        out.push(format!("**Incomplete**: {}", failed.join("; ")));
    }
    out.push(String::new());
    out.push("---".to_string());
    out.push(String::new());

    out.push("## Sentiment".to_string());
    out.push(String::new());
    match result.sentiment_counts {
        Some(counts) => {
            out.push("| Sentiment | Posts | Share |".to_string());
            out.push("|-----------|-------|-------|".to_string());
            for label in SentimentLabel::ALL {
                let share = counts.ratio(label).unwrap_or(0.0) * 100.0;
                out.push(format!(
                    "| {label} | {} | {share:.1}% |",
                    counts.get(label)
                ));
            }
            if let Some(avg) = result.average_compound {
                out.push(String::new());
                out.push(format!("Mean compound score: {avg:.3}"));
            }
        }
        None => out.push(NOT_AVAILABLE.to_string()),
    }
    out.push(String::new());

    out.push("## Top Keywords".to_string());
    out.push(String::new());
    match result.top_keywords.as_deref() {
        Some([]) => out.push("_No recurring keywords._".to_string()),
        Some(keywords) => {
            out.push("| Keyword | TF-IDF |".to_string());
            out.push("|---------|--------|".to_string());
            for kw in keywords.iter().take(TABLE_ROWS) {
                out.push(format!("| {} | {:.3} |", kw.term, kw.score));
            }
        }
        None => out.push(NOT_AVAILABLE.to_string()),
    }
    out.push(String::new());

    out.push("## Top Hashtags".to_string());
    out.push(String::new());
    match result.top_hashtags.as_deref() {
        Some([]) => out.push("_No hashtags used._".to_string()),
        Some(tags) => {
            out.push("| Hashtag | Uses |".to_string());
            out.push("|---------|------|".to_string());
            for tag in tags.iter().take(TABLE_ROWS) {
                out.push(format!("| #{} | {} |", tag.tag, tag.count));
            }
        }
        None => out.push(NOT_AVAILABLE.to_string()),
    }
    out.push(String::new());

    out.push("## Topic Clusters".to_string());
    out.push(String::new());
    match result.clusters.as_ref() {
        Some(clusters) => {
            out.push("| Cluster | Posts | Top terms |".to_string());
            out.push("|---------|-------|-----------|".to_string());
            for (id, terms) in &clusters.cluster_terms {
                let size = clusters.cluster_counts.get(id).copied().unwrap_or(0);
                out.push(format!("| {id} | {size} | {} |", terms.join(", ")));
            }
        }
        None => out.push(NOT_AVAILABLE.to_string()),
    }
    out.push(String::new());

    out.push("## Key Influencers".to_string());
    out.push(String::new());
    match result.top_influencers.as_deref() {
        Some([]) => out.push("_No mention network in these posts._".to_string()),
        Some(influencers) => {
            out.push("| User | Degree centrality | Betweenness |".to_string());
            out.push("|------|-------------------|-------------|".to_string());
            for inf in influencers {
                let betweenness = inf
                    .betweenness
                    .map_or_else(|| "\u{2014}".to_string(), |b| format!("{b:.3}"));
                out.push(format!(
                    "| @{} | {:.3} | {betweenness} |",
                    inf.user, inf.centrality
                ));
            }
        }
        None => out.push(NOT_AVAILABLE.to_string()),
    }
    out.push(String::new());

    out.push("## Strategy Insights".to_string());
    out.push(String::new());
    for line in &result.strategy_insights {
        out.push(format!("- {line}"));
    }
    out.push(String::new());

    out.join("\n")
}
