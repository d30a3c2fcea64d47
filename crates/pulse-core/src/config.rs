use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if a value is present but invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;
    use std::str::FromStr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        u64::from_str(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_positive = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let value = parse_num(var, default)?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    };

    let to_usize = |var: &str, value: u64| -> Result<usize, ConfigError> {
        usize::try_from(value).map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let to_u32 = |var: &str, value: u64| -> Result<u32, ConfigError> {
        u32::try_from(value).map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let log_level = or_default("PULSE_LOG_LEVEL", "info");
    let output_dir = PathBuf::from(or_default("PULSE_OUTPUT_DIR", "./pulse_output"));
    let x_bearer_token = lookup("X_BEARER_TOKEN")
        .ok()
        .filter(|token| !token.trim().is_empty());
    let x_api_base_url = or_default("PULSE_X_API_BASE_URL", "https://api.x.com/2/");

    let fetch_timeout_secs = parse_positive("PULSE_FETCH_TIMEOUT_SECS", "30")?;
    let fetch_max_retries = to_u32(
        "PULSE_FETCH_MAX_RETRIES",
        parse_num("PULSE_FETCH_MAX_RETRIES", "3")?,
    )?;
    let fetch_retry_backoff_ms = parse_num("PULSE_FETCH_RETRY_BACKOFF_MS", "1000")?;
    let default_post_count = to_usize(
        "PULSE_DEFAULT_POST_COUNT",
        parse_positive("PULSE_DEFAULT_POST_COUNT", "100")?,
    )?;
    let lookback_days = to_u32(
        "PULSE_LOOKBACK_DAYS",
        parse_num("PULSE_LOOKBACK_DAYS", "7")?,
    )?;

    let cluster_count = to_usize(
        "PULSE_CLUSTER_COUNT",
        parse_positive("PULSE_CLUSTER_COUNT", "3")?,
    )?;
    let top_n = to_usize("PULSE_TOP_N", parse_positive("PULSE_TOP_N", "20")?)?;
    let graph_max_nodes = to_usize(
        "PULSE_GRAPH_MAX_NODES",
        parse_positive("PULSE_GRAPH_MAX_NODES", "50")?,
    )?;
    let analysis_workers = to_usize(
        "PULSE_ANALYSIS_WORKERS",
        parse_positive("PULSE_ANALYSIS_WORKERS", "4")?,
    )?;
    let analyzer_timeout_secs = parse_positive("PULSE_ANALYZER_TIMEOUT_SECS", "120")?;

    Ok(AppConfig {
        log_level,
        output_dir,
        x_bearer_token,
        x_api_base_url,
        fetch_timeout_secs,
        fetch_max_retries,
        fetch_retry_backoff_ms,
        default_post_count,
        lookback_days,
        cluster_count,
        top_n,
        graph_max_nodes,
        analysis_workers,
        analyzer_timeout_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
