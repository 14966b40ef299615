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
/// Decoupled from the real environment so it can be tested with a `HashMap` lookup.
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

    let env = parse_environment(&or_default("STORELYTICS_ENV", "development"))?;

    let bind_addr = or_default("STORELYTICS_BIND_ADDR", "0.0.0.0:8000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("STORELYTICS_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("STORELYTICS_LOG_LEVEL", "info");

    let catalog_base_url = or_default("STORELYTICS_CATALOG_BASE_URL", "https://itunes.apple.com");
    if !(catalog_base_url.starts_with("http://") || catalog_base_url.starts_with("https://")) {
        return Err(invalid(
            "STORELYTICS_CATALOG_BASE_URL",
            format!("\"{catalog_base_url}\" is not an http(s) URL"),
        ));
    }

    let request_timeout_secs = parse_u64("STORELYTICS_REQUEST_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("STORELYTICS_USER_AGENT", "storelytics/1.0");
    let inter_page_delay_ms = parse_u64("STORELYTICS_INTER_PAGE_DELAY_MS", "1000")?;
    let max_retries = parse_u32("STORELYTICS_MAX_RETRIES", "2")?;
    let retry_backoff_ms = parse_u64("STORELYTICS_RETRY_BACKOFF_MS", "500")?;
    let data_dir = PathBuf::from(or_default("STORELYTICS_DATA_DIR", "data"));

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        catalog_base_url,
        request_timeout_secs,
        user_agent,
        inter_page_delay_ms,
        max_retries,
        retry_backoff_ms,
        data_dir,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STORELYTICS_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
