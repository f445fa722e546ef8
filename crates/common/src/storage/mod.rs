//! Storage primitives for the SQLite-backed ledger
//!
//! This module provides generic storage infrastructure: an r2d2 connection
//! pool, per-connection pragmas, transaction wrappers, pool metrics and a
//! bounded retry for transient failures.

pub mod error;
pub mod metrics;
pub mod retry;
pub mod sqlite;
pub mod types;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use metrics::StorageMetrics;
pub use retry::StorageRetry;
pub use sqlite::{apply_connection_pragmas, SqliteConnection, SqlitePool, SqlitePoolConfig};
pub use types::{HealthStatus, PoolMetrics, Transaction};
