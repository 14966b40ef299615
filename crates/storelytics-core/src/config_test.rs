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
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "STORELYTICS_ENV"));
}

#[test]
fn build_app_config_uses_defaults_when_env_is_empty() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.catalog_base_url, "https://itunes.apple.com");
    assert_eq!(cfg.request_timeout_secs, 15);
    assert_eq!(cfg.user_agent, "storelytics/1.0");
    assert_eq!(cfg.inter_page_delay_ms, 1000);
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_ms, 500);
    assert_eq!(cfg.data_dir, std::path::PathBuf::from("data"));
}

#[test]
fn build_app_config_applies_overrides() {
    let mut map = HashMap::new();
    map.insert("STORELYTICS_INTER_PAGE_DELAY_MS", "0");
    map.insert("STORELYTICS_MAX_RETRIES", "5");
    map.insert("STORELYTICS_USER_AGENT", "custom-agent/2.0");
    map.insert("STORELYTICS_CATALOG_BASE_URL", "http://127.0.0.1:9999");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.inter_page_delay_ms, 0);
    assert_eq!(cfg.max_retries, 5);
    assert_eq!(cfg.user_agent, "custom-agent/2.0");
    assert_eq!(cfg.catalog_base_url, "http://127.0.0.1:9999");
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("STORELYTICS_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORELYTICS_BIND_ADDR"),
        "expected InvalidEnvVar(STORELYTICS_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_non_numeric_delay() {
    let mut map = HashMap::new();
    map.insert("STORELYTICS_INTER_PAGE_DELAY_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORELYTICS_INTER_PAGE_DELAY_MS"),
        "expected InvalidEnvVar(STORELYTICS_INTER_PAGE_DELAY_MS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_http_base_url() {
    let mut map = HashMap::new();
    map.insert("STORELYTICS_CATALOG_BASE_URL", "ftp://itunes.apple.com");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORELYTICS_CATALOG_BASE_URL"),
        "expected InvalidEnvVar(STORELYTICS_CATALOG_BASE_URL), got: {result:?}"
    );
}
