//! Storage value types
//!
//! Transaction guard, pool health and metric snapshots.

use rusqlite::{Row, ToSql, Transaction as RusqliteTransaction};

use super::error::{StorageError, StorageResult};

/// Transaction wrapper
///
/// Rolls back on drop unless [`Transaction::commit`] was called. Every
/// multi-row write in the ledger goes through one of these so a failed batch
/// leaves the database untouched.
pub struct Transaction<'conn> {
    inner: Option<RusqliteTransaction<'conn>>,
}

impl<'conn> Transaction<'conn> {
    /// Create a new transaction wrapper
    pub fn new(transaction: RusqliteTransaction<'conn>) -> Self {
        Self { inner: Some(transaction) }
    }

    /// Commit the transaction
    pub fn commit(mut self) -> StorageResult<()> {
        match self.inner.take() {
            Some(tx) => tx.commit().map_err(StorageError::from),
            None => Err(consumed()),
        }
    }

    /// Roll the transaction back explicitly
    pub fn rollback(mut self) -> StorageResult<()> {
        match self.inner.take() {
            Some(tx) => tx.rollback().map_err(StorageError::from),
            None => Err(consumed()),
        }
    }

    /// Execute a statement within the transaction
    pub fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> StorageResult<usize> {
        match self.inner.as_ref() {
            Some(tx) => tx.execute(sql, params).map_err(StorageError::from),
            None => Err(consumed()),
        }
    }

    /// Query a single row within the transaction
    pub fn query_row<T, F>(&self, sql: &str, params: &[&dyn ToSql], f: F) -> StorageResult<T>
    where
        F: FnOnce(&Row<'_>) -> Result<T, rusqlite::Error>,
    {
        match self.inner.as_ref() {
            Some(tx) => tx.query_row(sql, params, f).map_err(StorageError::from),
            None => Err(consumed()),
        }
    }

    /// Execute a cached prepared statement once per parameter set
    ///
    /// Returns the total number of affected rows.
    pub fn execute_many<'p, I>(&self, sql: &str, rows: I) -> StorageResult<usize>
    where
        I: IntoIterator<Item = Vec<&'p dyn ToSql>>,
    {
        let tx = self.inner.as_ref().ok_or_else(consumed)?;
        let mut stmt = tx.prepare_cached(sql)?;
        let mut affected = 0;
        for params in rows {
            affected += stmt.execute(params.as_slice())?;
        }
        Ok(affected)
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if let Some(tx) = self.inner.take() {
            let _ = tx.rollback();
        }
    }
}

fn consumed() -> StorageError {
    StorageError::Query("Transaction already consumed".to_string())
}

/// Health status of the storage system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub healthy: bool,

    /// Number of open connections
    pub active_connections: usize,

    /// Number of idle connections
    pub idle_connections: usize,

    /// Maximum pool size
    pub max_connections: usize,

    /// Optional error message if unhealthy
    pub message: Option<String>,
}

impl HealthStatus {
    /// Create a healthy status
    pub fn healthy(active: usize, idle: usize, max: usize) -> Self {
        Self {
            healthy: true,
            active_connections: active,
            idle_connections: idle,
            max_connections: max,
            message: None,
        }
    }

    /// Create an unhealthy status
    pub fn unhealthy(message: String) -> Self {
        Self {
            healthy: false,
            active_connections: 0,
            idle_connections: 0,
            max_connections: 0,
            message: Some(message),
        }
    }
}

/// Connection pool metrics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolMetrics {
    /// Total connections acquired
    pub connections_acquired: u64,

    /// Total connection timeouts
    pub connections_timeout: u64,

    /// Total connection errors
    pub connections_error: u64,

    /// Average connection acquisition time (milliseconds)
    pub avg_acquisition_time_ms: u64,

    /// Total queries executed
    pub queries_executed: u64,

    /// Total query failures
    pub queries_failed: u64,
}
