//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use fyxed_domain::{CommissionRates, FyxedError};
use fyxed_infra::config;
use tempfile::TempDir;

#[test]
fn test_load_config_from_json_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("fyxed.json");
    std::fs::write(
        &path,
        r#"{
            "database": { "path": "/tmp/integration_test.db", "pool_size": 10 },
            "commission": { "currency": "EUR" },
            "logging": { "level": "fyxed=trace", "json": true }
        }"#,
    )
    .expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("Failed to load config from JSON file");

    assert_eq!(config.database.path, "/tmp/integration_test.db");
    assert_eq!(config.database.pool_size, 10);
    assert_eq!(config.commission.currency, "EUR");
    assert_eq!(config.commission.default_rates, CommissionRates::default());
    assert_eq!(config.logging.level, "fyxed=trace");
    assert!(config.logging.json);
}

#[test]
fn test_empty_toml_file_yields_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "").expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("empty TOML is valid");
    assert_eq!(config, fyxed_domain::Config::default());
}

#[test]
fn test_invalid_toml_reports_config_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[database\npath = ").expect("Failed to write config");

    let err = config::load_from_file(Some(path)).unwrap_err();
    assert!(matches!(err, FyxedError::Config(ref msg) if msg.starts_with("Invalid TOML format")));
}
