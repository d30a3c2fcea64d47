use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_succeeds_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.output_dir.to_str(), Some("./pulse_output"));
    assert!(cfg.x_bearer_token.is_none());
    assert_eq!(cfg.x_api_base_url, "https://api.x.com/2/");
    assert_eq!(cfg.fetch_timeout_secs, 30);
    assert_eq!(cfg.fetch_max_retries, 3);
    assert_eq!(cfg.fetch_retry_backoff_ms, 1000);
    assert_eq!(cfg.default_post_count, 100);
    assert_eq!(cfg.lookback_days, 7);
    assert_eq!(cfg.cluster_count, 3);
    assert_eq!(cfg.top_n, 20);
    assert_eq!(cfg.graph_max_nodes, 50);
    assert_eq!(cfg.analysis_workers, 4);
    assert_eq!(cfg.analyzer_timeout_secs, 120);
}

#[test]
fn cluster_count_override() {
    let mut map = HashMap::new();
    map.insert("PULSE_CLUSTER_COUNT", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.cluster_count, 5);
}

#[test]
fn cluster_count_invalid() {
    let mut map = HashMap::new();
    map.insert("PULSE_CLUSTER_COUNT", "three");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PULSE_CLUSTER_COUNT"),
        "expected InvalidEnvVar(PULSE_CLUSTER_COUNT), got: {result:?}"
    );
}

#[test]
fn zero_top_n_is_rejected() {
    let mut map = HashMap::new();
    map.insert("PULSE_TOP_N", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PULSE_TOP_N"),
        "expected InvalidEnvVar(PULSE_TOP_N), got: {result:?}"
    );
}

#[test]
fn zero_retries_is_allowed() {
    let mut map = HashMap::new();
    map.insert("PULSE_FETCH_MAX_RETRIES", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.fetch_max_retries, 0);
}

#[test]
fn analyzer_timeout_override() {
    let mut map = HashMap::new();
    map.insert("PULSE_ANALYZER_TIMEOUT_SECS", "15");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.analyzer_timeout_secs, 15);
}

#[test]
fn workers_invalid() {
    let mut map = HashMap::new();
    map.insert("PULSE_ANALYSIS_WORKERS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PULSE_ANALYSIS_WORKERS"),
        "expected InvalidEnvVar(PULSE_ANALYSIS_WORKERS), got: {result:?}"
    );
}

#[test]
fn blank_bearer_token_is_treated_as_absent() {
    let mut map = HashMap::new();
    map.insert("X_BEARER_TOKEN", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.x_bearer_token.is_none());
}

#[test]
fn debug_redacts_bearer_token() {
    let mut map = HashMap::new();
    map.insert("X_BEARER_TOKEN", "super-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn require_bearer_token_reports_missing_var() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let err = cfg.require_bearer_token().unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "X_BEARER_TOKEN"));
}
