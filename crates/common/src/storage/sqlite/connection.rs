//! Pooled SQLite connection wrapper

use std::ops::{Deref, DerefMut};

use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection as RusqliteConnection, Row, Statement as RusqliteStatement, ToSql};
use tracing::instrument;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::Transaction;

/// Pooled rusqlite connection
///
/// Returned to the pool when dropped.
pub struct SqliteConnection {
    inner: PooledConnection<SqliteConnectionManager>,
}

impl SqliteConnection {
    /// Create a new connection wrapper from a pooled connection
    pub fn new(conn: PooledConnection<SqliteConnectionManager>) -> Self {
        Self { inner: conn }
    }

    /// Execute a SQL statement that doesn't return rows
    #[instrument(skip(self, params), fields(sql = %sql))]
    pub fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> StorageResult<usize> {
        self.inner.execute(sql, params).map_err(StorageError::from)
    }

    /// Execute a SQL query that returns a single row
    #[instrument(skip(self, params, f), fields(sql = %sql))]
    pub fn query_row<T, F>(&self, sql: &str, params: &[&dyn ToSql], f: F) -> StorageResult<T>
    where
        F: FnOnce(&Row<'_>) -> Result<T, rusqlite::Error>,
    {
        self.inner.query_row(sql, params, f).map_err(StorageError::from)
    }

    /// Prepare a SQL statement
    #[instrument(skip(self), fields(sql = %sql))]
    pub fn prepare(&self, sql: &str) -> StorageResult<SqliteStatement<'_>> {
        let stmt = self.inner.prepare(sql).map_err(StorageError::from)?;
        Ok(SqliteStatement::new(stmt))
    }

    /// Begin a transaction that rolls back unless committed
    #[instrument(skip(self))]
    pub fn transaction(&mut self) -> StorageResult<Transaction<'_>> {
        let tx = self.inner.transaction().map_err(StorageError::from)?;
        Ok(Transaction::new(tx))
    }
}

impl Deref for SqliteConnection {
    type Target = RusqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for SqliteConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

/// Prepared statement wrapper
pub struct SqliteStatement<'conn> {
    inner: RusqliteStatement<'conn>,
}

impl<'conn> SqliteStatement<'conn> {
    /// Create a new statement wrapper
    pub fn new(stmt: RusqliteStatement<'conn>) -> Self {
        Self { inner: stmt }
    }

    /// Execute the statement with parameters
    pub fn execute(&mut self, params: &[&dyn ToSql]) -> StorageResult<usize> {
        self.inner.execute(params).map_err(StorageError::from)
    }

    /// Query with the statement and collect mapped rows
    pub fn query_map<T, F>(&mut self, params: &[&dyn ToSql], mut f: F) -> StorageResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> Result<T, rusqlite::Error>,
    {
        let rows = self.inner.query_map(params, |row| f(row)).map_err(StorageError::from)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
    }
}
