//! SQLite connection pool
//!
//! r2d2-based pooling with pragmas applied on connect.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{debug, info, instrument, warn};

use super::config::SqlitePoolConfig;
use super::connection::SqliteConnection;
use super::pragmas::apply_connection_pragmas;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::metrics::StorageMetrics;
use crate::storage::types::{HealthStatus, PoolMetrics};

/// SQLite connection pool
///
/// Every connection has WAL, foreign keys and the busy timeout configured
/// before it is handed out.
#[derive(Debug)]
pub struct SqlitePool {
    pool: Pool<SqliteConnectionManager>,
    config: SqlitePoolConfig,
    metrics: Arc<StorageMetrics>,
}

impl SqlitePool {
    /// Open (or create) the database at `path` and build the pool
    ///
    /// # Errors
    /// Returns an error if the file can't be opened or the first connection
    /// fails its pragma setup.
    #[instrument(fields(db_path = ?path, pool_size = config.max_size))]
    pub fn new(path: &Path, config: SqlitePoolConfig) -> StorageResult<Self> {
        if config.max_size == 0 {
            return Err(StorageError::InvalidConfig("pool size must be at least 1".to_string()));
        }

        info!("Creating SQLite connection pool");

        let metrics = Arc::new(StorageMetrics::new(config.max_size));
        let pool_config = config.clone();

        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            apply_connection_pragmas(conn, &pool_config)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        });

        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|e| {
                warn!(error = %e, "Failed to create connection pool");
                StorageError::Connection(format!("Failed to create pool: {e}"))
            })?;

        info!(pool_size = config.max_size, "SQLite pool created");

        Ok(Self { pool, config, metrics })
    }

    /// Get a connection from the pool, recording acquisition metrics
    #[instrument(skip(self), fields(pool_size = self.config.max_size))]
    pub fn get_sqlite_connection(&self) -> StorageResult<SqliteConnection> {
        let start = Instant::now();

        match self.pool.get() {
            Ok(conn) => {
                let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                self.metrics.record_connection_acquired(duration_ms);
                debug!(duration_ms, "Connection acquired");
                Ok(SqliteConnection::new(conn))
            }
            Err(e) => {
                let err_str = e.to_string().to_lowercase();
                if err_str.contains("timed out") || err_str.contains("timeout") {
                    self.metrics.record_connection_timeout();
                    warn!(timeout = ?self.config.connection_timeout, "Connection timeout");
                    Err(StorageError::Timeout(self.config.connection_timeout.as_secs()))
                } else {
                    self.metrics.record_connection_error();
                    warn!(error = %e, "Connection error");
                    Err(StorageError::Connection(format!("Failed to get connection: {e}")))
                }
            }
        }
    }

    /// Shared metric counters
    pub fn storage_metrics(&self) -> &Arc<StorageMetrics> {
        &self.metrics
    }

    /// Snapshot of the pool counters
    pub fn metrics(&self) -> PoolMetrics {
        self.metrics.snapshot()
    }

    /// Check that a connection can be acquired and report pool state
    pub fn health_check(&self) -> StorageResult<HealthStatus> {
        let state = self.pool.state();

        match self.pool.get() {
            Ok(_conn) => Ok(HealthStatus::healthy(
                state.connections as usize,
                state.idle_connections as usize,
                self.config.max_size as usize,
            )),
            Err(e) => Ok(HealthStatus::unhealthy(format!("Pool unhealthy: {e}"))),
        }
    }
}
