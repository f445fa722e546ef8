//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CURRENCY, DEFAULT_DB_PATH, DEFAULT_LOG_LEVEL, DEFAULT_POOL_SIZE};
use crate::types::CommissionRates;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub commission: CommissionConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Commission defaults used until an admin stores rates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionConfig {
    /// ISO 4217 code assigned to sales recorded without one
    pub currency: String,
    pub default_rates: CommissionRates,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: DEFAULT_POOL_SIZE }
    }
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self { currency: DEFAULT_CURRENCY.to_string(), default_rates: CommissionRates::default() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), json: false }
    }
}
