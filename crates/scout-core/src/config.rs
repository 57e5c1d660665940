use crate::app_config::AppConfig;
use crate::creators::Platform;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
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
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a
/// `HashMap` without `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = parse_usize(var, default)?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let search_api_url = or_default("SCOUT_SEARCH_API_URL", "https://api.creator-search.example");
    let search_api_key = lookup("SCOUT_SEARCH_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let log_level = or_default("SCOUT_LOG_LEVEL", "info");
    let enabled_platforms = parse_platforms(&or_default(
        "SCOUT_ENABLED_PLATFORMS",
        "tiktok,instagram,youtube",
    ))?;

    let http_timeout_secs = parse_u64("SCOUT_HTTP_TIMEOUT_SECS", "30")?;
    let fetch_timeout_ms = parse_u64("SCOUT_FETCH_TIMEOUT_MS", "15000")?;
    let bio_enrichment_timeout_ms = parse_u64("SCOUT_BIO_ENRICHMENT_TIMEOUT_MS", "8000")?;
    let max_parallel_enrichments = parse_positive_usize("SCOUT_MAX_PARALLEL_ENRICHMENTS", "5")?;
    let enable_bio_enrichment = parse_bool(
        "SCOUT_ENABLE_BIO_ENRICHMENT",
        &or_default("SCOUT_ENABLE_BIO_ENRICHMENT", "true"),
    )?;
    let max_continuation_runs = parse_u32("SCOUT_MAX_CONTINUATION_RUNS", "10")?;
    let runtime_cap_ms = parse_u64("SCOUT_RUNTIME_CAP_MS", "600000")?;
    let max_keywords = parse_positive_usize("SCOUT_MAX_KEYWORDS", "8")?;
    let enrichment_queue_capacity = parse_positive_usize("SCOUT_ENRICHMENT_QUEUE_CAPACITY", "200")?;
    let fetch_max_retries = parse_u32("SCOUT_FETCH_MAX_RETRIES", "2")?;
    let fetch_backoff_base_ms = parse_u64("SCOUT_FETCH_BACKOFF_BASE_MS", "500")?;

    let page_size = parse_u32("SCOUT_PAGE_SIZE", "50")?;
    if !(1..=100).contains(&page_size) {
        return Err(invalid("SCOUT_PAGE_SIZE", "must be between 1 and 100".to_string()));
    }

    let target_overshoot_pct = parse_u32("SCOUT_TARGET_OVERSHOOT_PCT", "10")?;
    if target_overshoot_pct > 100 {
        return Err(invalid(
            "SCOUT_TARGET_OVERSHOOT_PCT",
            "must be at most 100".to_string(),
        ));
    }

    Ok(AppConfig {
        search_api_url,
        search_api_key,
        log_level,
        enabled_platforms,
        http_timeout_secs,
        fetch_timeout_ms,
        bio_enrichment_timeout_ms,
        max_parallel_enrichments,
        enable_bio_enrichment,
        max_continuation_runs,
        runtime_cap_ms,
        max_keywords,
        enrichment_queue_capacity,
        fetch_max_retries,
        fetch_backoff_base_ms,
        page_size,
        target_overshoot_pct,
    })
}

/// Parse a comma-separated platform list, dropping duplicates.
fn parse_platforms(raw: &str) -> Result<Vec<Platform>, ConfigError> {
    let mut platforms = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let platform = part
            .parse::<Platform>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "SCOUT_ENABLED_PLATFORMS".to_string(),
                reason: e.to_string(),
            })?;
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    if platforms.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "SCOUT_ENABLED_PLATFORMS".to_string(),
            reason: "at least one platform must be enabled".to_string(),
        });
    }
    Ok(platforms)
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("\"{other}\" is not a boolean"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
