//! Database connection manager backed by the shared SQLite pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fyxed_common::storage::{
    HealthStatus, PoolMetrics, SqliteConnection, SqlitePool, SqlitePoolConfig, StorageRetry,
};
use fyxed_domain::{FyxedError, Result};
use rusqlite::params;
use tracing::info;

use crate::errors::{map_storage_error, InfraError};

/// Highest schema version this build can open.
pub const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Database manager that wraps an [`SqlitePool`].
///
/// Connection acquisition is retried when the pool reports a transient
/// failure (exhaustion, timeout, a busy database during connect).
pub struct DbManager {
    pool: Arc<SqlitePool>,
    path: PathBuf,
    retry: StorageRetry,
}

impl DbManager {
    /// Open the database at `db_path` with up to `pool_size` connections.
    pub fn new<P: AsRef<Path>>(db_path: P, pool_size: u32) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let config = SqlitePoolConfig::with_max_size(pool_size.max(1));
        let pool = SqlitePool::new(&path, config).map_err(map_storage_error)?;

        info!(
            db_path = %path.display(),
            max_connections = pool.storage_metrics().max_pool_size(),
            "sqlite pool initialised"
        );

        Ok(Self { pool: Arc::new(pool), path, retry: StorageRetry::default() })
    }

    /// Borrow the underlying pool.
    pub fn pool(&self) -> &Arc<SqlitePool> {
        &self.pool
    }

    /// Replace the retry limits used for connection acquisition.
    #[must_use]
    pub fn with_retry(mut self, retry: StorageRetry) -> Self {
        self.retry = retry;
        self
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<SqliteConnection> {
        self.retry
            .run("acquire connection", || self.pool.get_sqlite_connection())
            .map_err(map_storage_error)
    }

    /// Ensure the full schema exists on the current database.
    ///
    /// # Errors
    /// `Database` when the file was written by a newer schema version.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        create_schema(&conn)?;
        Ok(())
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verify the database is reachable and answering queries.
    ///
    /// An unhealthy pool is reported in the status, not as an error.
    pub fn health_check(&self) -> Result<HealthStatus> {
        let status = self.pool.health_check().map_err(map_storage_error)?;
        if !status.healthy {
            return Ok(status);
        }

        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0))
            .map_err(map_storage_error)?;
        Ok(status)
    }

    /// Snapshot of pool counters.
    pub fn metrics(&self) -> PoolMetrics {
        self.pool.metrics()
    }
}

fn create_schema(conn: &SqliteConnection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;

    let found: Option<i32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", params![], |row| row.get(0))
        .map_err(map_storage_error)?;
    if let Some(found) = found.filter(|found| *found > SCHEMA_VERSION) {
        return Err(FyxedError::Database(format!(
            "schema version {found} is newer than supported version {SCHEMA_VERSION}"
        )));
    }

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, CAST(strftime('%s','now') AS INTEGER))",
        params![SCHEMA_VERSION],
    )
    .map_err(map_storage_error)?;
    Ok(())
}

fn map_sql_error(err: rusqlite::Error) -> FyxedError {
    FyxedError::from(InfraError::from(err))
}
