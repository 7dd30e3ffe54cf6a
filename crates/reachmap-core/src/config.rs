use crate::app_config::{AppConfig, Environment};
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
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
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

    let parse_radius = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid(var, format!("must be a positive number, got {value}")));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("REACHMAP_ENV", "development"))?;
    let bind_addr = parse_addr("REACHMAP_BIND_ADDR", "0.0.0.0:4000")?;
    let log_level = or_default("REACHMAP_LOG_LEVEL", "info");

    let stores_path = PathBuf::from(or_default(
        "REACHMAP_STORES_PATH",
        "./data/walmart-locations.json",
    ));
    let centers_path = PathBuf::from(or_default(
        "REACHMAP_CENTERS_PATH",
        "./data/linac-locations.json",
    ));
    // An explicitly empty value opts out of the aggregate table.
    let aggregates_path = match lookup("REACHMAP_AGGREGATES_PATH") {
        Ok(raw) if raw.trim().is_empty() => None,
        Ok(raw) => Some(PathBuf::from(raw)),
        Err(_) => Some(PathBuf::from("./data/city-centers.json")),
    };

    let default_radius_miles = parse_radius("REACHMAP_DEFAULT_RADIUS_MILES", "35")?;

    let boundary_base_url = or_default(
        "REACHMAP_BOUNDARY_BASE_URL",
        "https://nominatim.openstreetmap.org/",
    );
    let boundary_user_agent = or_default(
        "REACHMAP_BOUNDARY_USER_AGENT",
        "reachmap/0.1 (coverage-dashboard)",
    );
    let boundary_timeout_secs = parse_u64("REACHMAP_BOUNDARY_TIMEOUT_SECS", "5")?;
    let boundary_max_retries = parse_u32("REACHMAP_BOUNDARY_MAX_RETRIES", "2")?;
    let boundary_backoff_base_ms = parse_u64("REACHMAP_BOUNDARY_BACKOFF_BASE_MS", "250")?;
    let boundary_total_timeout_secs = parse_u64("REACHMAP_BOUNDARY_TOTAL_TIMEOUT_SECS", "8")?;
    if boundary_total_timeout_secs == 0 {
        return Err(invalid(
            "REACHMAP_BOUNDARY_TOTAL_TIMEOUT_SECS",
            "must be at least 1".to_string(),
        ));
    }

    let metrics_cache_ttl_secs = parse_u64("REACHMAP_METRICS_CACHE_TTL_SECS", "60")?;
    let reload_cron = or_default("REACHMAP_RELOAD_CRON", "0 */10 * * * *");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        stores_path,
        centers_path,
        aggregates_path,
        default_radius_miles,
        boundary_base_url,
        boundary_user_agent,
        boundary_timeout_secs,
        boundary_max_retries,
        boundary_backoff_base_ms,
        boundary_total_timeout_secs,
        metrics_cache_ttl_secs,
        reload_cron,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REACHMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
