//! Configuration parsing tests
//!
//! Values come from a map instead of the process environment so tests can
//! run in parallel.

use std::collections::HashMap;
use std::time::Duration;

use snaplink::config::AppConfig;
use snaplink::logger::Stack;

fn load(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_defaults() {
    let config = load(&[]).unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.max_urls, 5);
    assert_eq!(config.log.timeout, Duration::from_secs(5));
    assert_eq!(config.log.stack, Stack::Backend);
    assert!(config.log.endpoint.is_some());
}

#[test]
fn test_overrides() {
    let config = load(&[
        ("PORT", "9000"),
        ("BASE_URL", "https://go.example.com/"),
        ("LOG_TIMEOUT_MS", "250"),
        ("LOG_STACK", "Frontend"),
        ("LOG_ENDPOINT", ""),
    ])
    .unwrap();

    assert_eq!(config.port, 9000);
    assert_eq!(config.base_url, "https://go.example.com");
    assert_eq!(config.log.timeout, Duration::from_millis(250));
    assert_eq!(config.log.stack, Stack::Frontend);
    assert!(config.log.endpoint.is_none());
}

#[test]
fn test_rejects_zero_log_timeout() {
    let err = load(&[("LOG_TIMEOUT_MS", "0")]).unwrap_err();
    assert!(err.to_string().contains("LOG_TIMEOUT_MS"));
}

#[test]
fn test_rejects_invalid_values() {
    assert!(load(&[("MAX_URLS", "0")]).is_err());
    assert!(load(&[("PORT", "not-a-port")]).is_err());
    assert!(load(&[("LOG_TIMEOUT_MS", "soon")]).is_err());
    assert!(load(&[("LOG_STACK", "middle")]).is_err());
}

#[test]
fn test_debug_output_hides_credentials() {
    let config = load(&[
        ("LOG_AUTH_TOKEN", "bearer-token-value"),
        ("LOG_CLIENT_SECRET", "client-secret-value"),
    ])
    .unwrap();

    let printed = format!("{:?}", config);
    assert!(!printed.contains("bearer-token-value"));
    assert!(!printed.contains("client-secret-value"));
}
