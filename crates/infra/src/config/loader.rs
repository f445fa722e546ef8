//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If a required variable is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `FYXED_DB_PATH`: Database file path (required)
//! - `FYXED_DB_POOL_SIZE`: Connection pool size (required)
//! - `FYXED_CURRENCY`: ISO 4217 code for sales recorded without one
//! - `FYXED_LOG_LEVEL`: `EnvFilter` directive used when `RUST_LOG` is unset
//! - `FYXED_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! Default commission rates can only be set from a config file; the admin
//! setting stored in the database overrides them either way.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./fyxed.json` or `./fyxed.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use fyxed_domain::{Config, DatabaseConfig, FyxedError, LoggingConfig, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `FyxedError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Required variables must be present; optional ones fall back to the
/// defaults in [`Config::default`].
///
/// # Errors
/// Returns `FyxedError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("FYXED_DB_PATH")?;
    let db_pool_size = env_var("FYXED_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| FyxedError::Config(format!("Invalid pool size: {}", e)))
    })?;

    let mut config = Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        ..Config::default()
    };

    if let Ok(currency) = std::env::var("FYXED_CURRENCY") {
        config.commission.currency = currency;
    }

    let defaults = LoggingConfig::default();
    config.logging = LoggingConfig {
        level: std::env::var("FYXED_LOG_LEVEL").unwrap_or(defaults.level),
        json: env_bool("FYXED_LOG_JSON", defaults.json),
    };

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `FyxedError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(FyxedError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            FyxedError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| FyxedError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let config: Config = match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| FyxedError::Config(format!("Invalid TOML format: {}", e)))?,
        "json" => serde_json::from_str(contents)
            .map_err(|e| FyxedError::Config(format!("Invalid JSON format: {}", e)))?,
        _ => return Err(FyxedError::Config(format!("Unsupported config format: {}", extension))),
    };

    config.commission.default_rates.validate().map_err(|e| {
        FyxedError::Config(format!("Invalid default rates in {}: {}", path.display(), e))
    })?;
    Ok(config)
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./config.{json,toml}`,
///    `./fyxed.{json,toml}`)
/// 2. Parent directories (up to 2 levels)
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("fyxed.json"),
        dir.join("fyxed.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `FyxedError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| FyxedError::Config(format!("Missing required environment variable: {}", key)))
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
/// Returns `default` if the variable is not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
