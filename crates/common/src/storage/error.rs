//! Storage error types
//!
//! Defines error types for the storage layer, integrating with the common
//! error classification system.

use thiserror::Error;

use crate::error::{ErrorClassification, ErrorSeverity};

/// Storage error type
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(String),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Database pool exhausted")]
    PoolExhausted,

    #[error("Connection timeout after {0}s")]
    Timeout(u64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: i32, found: i32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Rusqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    R2d2(#[from] r2d2::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

/// Storage result type
pub type StorageResult<T> = Result<T, StorageError>;

impl ErrorClassification for StorageError {
    /// Retryable errors include pool exhaustion, connection timeouts and
    /// SQLite BUSY/LOCKED responses.
    fn is_retryable(&self) -> bool {
        match self {
            Self::PoolExhausted => true,
            Self::Timeout(_) => true,
            Self::Connection(_) => true,
            Self::Rusqlite(err) => {
                matches!(
                    err.sqlite_error_code(),
                    Some(rusqlite::ErrorCode::DatabaseBusy)
                        | Some(rusqlite::ErrorCode::DatabaseLocked)
                )
            }
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Connection(_) => ErrorSeverity::Error,
            Self::Query(_) => ErrorSeverity::Error,
            Self::Migration(_) => ErrorSeverity::Critical,
            Self::PoolExhausted => ErrorSeverity::Warning,
            Self::Timeout(_) => ErrorSeverity::Warning,
            Self::InvalidConfig(_) => ErrorSeverity::Error,
            Self::SchemaVersionMismatch { .. } => ErrorSeverity::Critical,
            Self::Io(_) => ErrorSeverity::Error,
            Self::Rusqlite(_) if self.is_retryable() => ErrorSeverity::Warning,
            Self::Rusqlite(_) => ErrorSeverity::Error,
            Self::R2d2(_) => ErrorSeverity::Error,
            Self::SerdeJson(_) => ErrorSeverity::Error,
        }
    }
}
