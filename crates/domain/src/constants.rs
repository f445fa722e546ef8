//! Application constants
//!
//! Centralized location for domain-level constants.

// Rates
pub const BASIS_POINTS_SCALE: u32 = 10_000;
pub const DEFAULT_SELLER_RATE_BPS: u32 = 5_000;
pub const DEFAULT_LEADER_RATE_BPS: u32 = 1_000;
pub const DEFAULT_SPONSOR_RATE_BPS: u32 = 1_000;
pub const DEFAULT_FYXED_RATE_BPS: u32 = 3_000;

// Money
pub const DEFAULT_CURRENCY: &str = "USD";
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

// Database
pub const DEFAULT_DB_PATH: &str = "fyxed.db";
pub const DEFAULT_POOL_SIZE: u32 = 8;

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";
