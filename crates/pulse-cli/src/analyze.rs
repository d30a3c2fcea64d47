//! The `analyze` command: fetch, analyze, write outputs.
//!
//! A source that cannot be reached halts the command with a non-zero exit.
//! A source that returns no posts is a normal outcome and exits cleanly
//! without running the analysis.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use pulse_analysis::{AnalysisConfig, AnalysisRun, Orchestrator};
use pulse_core::{AppConfig, PostTable, RawPost};
use pulse_fetch::{FetchError, FileSource, PostSource, SearchRequest, XClient};

pub(crate) const SOURCE_UNREACHABLE: &str = "could not reach the data source";
pub(crate) const NO_RESULTS: &str = "no results for this query";

/// Command-line overrides for a single `analyze` invocation.
#[derive(Debug, Clone)]
pub(crate) struct AnalyzeOptions {
    pub query: String,
    pub count: Option<usize>,
    pub since: Option<NaiveDate>,
    pub input: Option<PathBuf>,
    pub clusters: Option<usize>,
    pub top_n: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub write_report: bool,
}

/// Builds the fetch request from flags and configuration.
///
/// An explicit `--since` always wins. Otherwise live fetches look back
/// `lookback_days`; file input is taken as-is.
pub(crate) fn build_request(
    config: &AppConfig,
    options: &AnalyzeOptions,
    today: NaiveDate,
) -> SearchRequest {
    let request = SearchRequest::new(
        options.query.clone(),
        options.count.unwrap_or(config.default_post_count),
    );
    match (options.since, &options.input) {
        (Some(since), _) => request.with_since(since),
        (None, None) => request.with_lookback(today, config.lookback_days),
        (None, Some(_)) => request,
    }
}

/// Applies `--clusters` and `--top-n` on top of the configured defaults.
///
/// # Errors
///
/// Returns an error when either override is zero.
pub(crate) fn analysis_config(
    config: &AppConfig,
    options: &AnalyzeOptions,
) -> anyhow::Result<AnalysisConfig> {
    let mut analysis = AnalysisConfig::from_app_config(config);
    if let Some(k) = options.clusters {
        anyhow::ensure!(k > 0, "--clusters must be greater than zero");
        analysis.cluster_count = k;
    }
    if let Some(n) = options.top_n {
        anyhow::ensure!(n > 0, "--top-n must be greater than zero");
        analysis.top_n = n;
    }
    Ok(analysis)
}

/// One-line guidance for a failed fetch, naming the token on credential
/// failures and the wait on rate limits.
pub(crate) fn fetch_failure_hint(e: &FetchError) -> String {
    if e.is_unauthorized() {
        return "the X API rejected the credentials; check X_BEARER_TOKEN".to_string();
    }
    if e.is_rate_limited() {
        return match e {
            FetchError::RateLimited {
                retry_after_secs: Some(secs),
            } => format!("the X API rate limit was hit; try again in {secs}s"),
            _ => "the X API rate limit was hit; try again later".to_string(),
        };
    }
    e.to_string()
}

async fn fetch<S: PostSource>(
    source: &S,
    request: &SearchRequest,
) -> Result<Vec<RawPost>, FetchError> {
    source.search(request).await
}

async fn fetch_posts(
    config: &AppConfig,
    options: &AnalyzeOptions,
    request: &SearchRequest,
) -> Result<Vec<RawPost>, FetchError> {
    match &options.input {
        Some(path) => fetch(&FileSource::new(path), request).await,
        None => fetch(&XClient::from_config(config)?, request).await,
    }
}

/// Runs the full pipeline for one query.
///
/// # Errors
///
/// Returns an error if the source cannot be reached, a flag is invalid, or
/// an output file cannot be written.
pub(crate) async fn run_analyze(config: &AppConfig, options: AnalyzeOptions) -> anyhow::Result<()> {
    let analysis = analysis_config(config, &options)?;
    let request = build_request(config, &options, Utc::now().date_naive());

    let source_kind = if options.input.is_some() { "file" } else { "x" };
    tracing::info!(
        query = %request.query,
        count = request.count,
        since = ?request.since,
        source = source_kind,
        "fetching posts"
    );

    let raw = match fetch_posts(config, &options, &request).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(
                error = %e,
                rate_limited = e.is_rate_limited(),
                unauthorized = e.is_unauthorized(),
                "fetch failed"
            );
            eprintln!("{SOURCE_UNREACHABLE}: {}", fetch_failure_hint(&e));
            return Err(e).context(SOURCE_UNREACHABLE);
        }
    };

    let table = PostTable::from_raw(raw);
    if table.is_empty() {
        println!("{NO_RESULTS}");
        return Ok(());
    }

    let run = Orchestrator::new(analysis)
        .run(Some(&options.query), table)
        .await?;

    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());
    let written = write_outputs(config, &run, &output_dir, options.write_report).await?;

    print_summary(&run);
    for path in written {
        println!("wrote {}", path.display());
    }
    Ok(())
}

async fn write_outputs(
    config: &AppConfig,
    run: &AnalysisRun,
    output_dir: &std::path::Path,
    write_report: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let mut written = vec![crate::export::write_analysis(output_dir, run).await?];
    if let Some(path) =
        crate::export::write_influence_graph(output_dir, run, config.graph_max_nodes).await?
    {
        written.push(path);
    }
    if write_report {
        written.push(crate::report::write_report(output_dir, run, Utc::now()).await?);
    }
    Ok(written)
}

fn print_summary(run: &AnalysisRun) {
    println!(
        "analyzed {} posts from {} authors",
        run.posts.len(),
        run.posts.unique_authors()
    );
    if let Some(counts) = run.result.sentiment_counts {
        println!(
            "sentiment: {} positive, {} negative, {} neutral",
            counts.positive, counts.negative, counts.neutral
        );
    }
    for failure in &run.failures {
        println!("warning: {} analysis failed: {}", failure.analyzer, failure.reason);
    }
    println!();
    println!("Strategy insights:");
    for line in &run.result.strategy_insights {
        println!("  - {line}");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config() -> AppConfig {
        let vars: HashMap<&str, &str> = HashMap::new();
        pulse_core::config::build_app_config(|key| {
            vars.get(key)
                .map(|v| (*v).to_string())
                .ok_or(std::env::VarError::NotPresent)
        })
        .expect("default config")
    }

    fn options() -> AnalyzeOptions {
        AnalyzeOptions {
            query: "TVK".to_string(),
            count: None,
            since: None,
            input: None,
            clusters: None,
            top_n: None,
            output_dir: None,
            write_report: true,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn credential_failure_hint_names_the_token() {
        let hint = fetch_failure_hint(&FetchError::Unauthorized { status: 401 });
        assert!(hint.contains("X_BEARER_TOKEN"));
        assert!(!hint.contains("rate limit"));
    }

    #[test]
    fn rate_limit_hint_is_distinct_and_carries_retry_after() {
        let hint = fetch_failure_hint(&FetchError::RateLimited {
            retry_after_secs: Some(900),
        });
        assert!(hint.contains("rate limit"));
        assert!(hint.contains("900s"));
        assert!(!hint.contains("X_BEARER_TOKEN"));

        let hint = fetch_failure_hint(&FetchError::RateLimited {
            retry_after_secs: None,
        });
        assert!(hint.ends_with("try again later"));
    }

    #[test]
    fn other_failures_hint_with_the_error_itself() {
        let err = FetchError::UnexpectedStatus {
            status: 503,
            body: "over capacity".to_string(),
        };
        assert_eq!(fetch_failure_hint(&err), err.to_string());
    }

    #[test]
    fn live_fetch_defaults_to_lookback_window() {
        let request = build_request(&config(), &options(), day(2024, 5, 8));
        assert_eq!(request.count, 100);
        assert_eq!(request.since, Some(day(2024, 5, 1)));
    }

    #[test]
    fn explicit_since_and_count_win() {
        let opts = AnalyzeOptions {
            count: Some(25),
            since: Some(day(2024, 1, 1)),
            ..options()
        };
        let request = build_request(&config(), &opts, day(2024, 5, 8));
        assert_eq!(request.count, 25);
        assert_eq!(request.since, Some(day(2024, 1, 1)));
    }

    #[test]
    fn file_input_has_no_implicit_window() {
        let opts = AnalyzeOptions {
            input: Some(PathBuf::from("posts.json")),
            ..options()
        };
        let request = build_request(&config(), &opts, day(2024, 5, 8));
        assert!(request.since.is_none());
    }

    #[test]
    fn flag_overrides_apply_to_analysis_config() {
        let opts = AnalyzeOptions {
            clusters: Some(5),
            top_n: Some(7),
            ..options()
        };
        let analysis = analysis_config(&config(), &opts).unwrap();
        assert_eq!(analysis.cluster_count, 5);
        assert_eq!(analysis.top_n, 7);
        assert_eq!(analysis.workers, 4);
    }

    #[test]
    fn zero_clusters_is_rejected() {
        let opts = AnalyzeOptions {
            clusters: Some(0),
            ..options()
        };
        assert!(analysis_config(&config(), &opts).is_err());
    }

    #[tokio::test]
    async fn empty_file_exits_cleanly_without_outputs() {
        let dir = std::env::temp_dir().join(format!("pulse-cli-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("posts.json");
        std::fs::write(&input, "[]").unwrap();
        let out = dir.join("out");

        let opts = AnalyzeOptions {
            input: Some(input),
            output_dir: Some(out.clone()),
            ..options()
        };
        run_analyze(&config(), opts).await.unwrap();
        assert!(!out.exists(), "no outputs for an empty result");
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn unreadable_input_halts_with_error() {
        let opts = AnalyzeOptions {
            input: Some(PathBuf::from("/nonexistent/pulse/posts.json")),
            ..options()
        };
        let err = run_analyze(&config(), opts).await.unwrap_err();
        assert_eq!(err.to_string(), SOURCE_UNREACHABLE);
    }

    #[tokio::test]
    async fn file_run_writes_all_outputs() {
        let dir = std::env::temp_dir().join(format!("pulse-cli-full-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("posts.json");
        std::fs::write(
            &input,
            r#"[
              {"id":"1","text":"Great rally today! #TVK","author":"alice","timestamp":"2024-05-01T09:30:00Z"},
              {"id":"2","text":"Terrible event #TVK @alice","author":"bob","timestamp":"2024-05-01T10:30:00Z"},
              {"id":"3","text":"It was okay #TVK @alice","author":"carol","timestamp":"2024-05-01T11:30:00Z"}
            ]"#,
        )
        .unwrap();
        let out = dir.join("out");

        let opts = AnalyzeOptions {
            input: Some(input),
            output_dir: Some(out.clone()),
            ..options()
        };
        run_analyze(&config(), opts).await.unwrap();

        assert!(out.join(crate::export::ANALYSIS_FILE).exists());
        assert!(out.join(crate::export::GRAPH_FILE).exists());
        assert!(out.join(crate::report::REPORT_FILE).exists());

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("analysis.json")).unwrap())
                .unwrap();
        assert_eq!(json["query"], "TVK");
        assert_eq!(json["post_count"], 3);
        assert_eq!(json["result"]["top_hashtags"][0]["tag"], "tvk");
        std::fs::remove_dir_all(dir).ok();
    }
}
