//! Conversions from external infrastructure errors into domain errors.

use fyxed_common::storage::StorageError;
use fyxed_common::ErrorClassification;
use fyxed_domain::FyxedError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;
use tracing::error;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub FyxedError);

impl From<InfraError> for FyxedError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<FyxedError> for InfraError {
    fn from(value: FyxedError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoFyxedError {
    fn into_fyxed(self) -> FyxedError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → FyxedError */
/* -------------------------------------------------------------------------- */

impl IntoFyxedError for SqlError {
    fn into_fyxed(self) -> FyxedError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => FyxedError::Database("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        FyxedError::Database("database is locked".into())
                    }
                    // SQLITE_CONSTRAINT_PRIMARYKEY / SQLITE_CONSTRAINT_UNIQUE
                    (ErrorCode::ConstraintViolation, 1555 | 2067) => {
                        FyxedError::Database(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        FyxedError::Database("foreign key constraint violation".into())
                    }
                    _ => FyxedError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => FyxedError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                FyxedError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                FyxedError::Database(format!("invalid column type for '{name}': {ty}"))
            }
            RE::Utf8Error(_) => FyxedError::Database("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidParameterName(parameter_name) => {
                FyxedError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => FyxedError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => FyxedError::Database("invalid SQL query".into()),
            other => FyxedError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_fyxed())
    }
}

/* -------------------------------------------------------------------------- */
/* StorageError → FyxedError */
/* -------------------------------------------------------------------------- */

impl IntoFyxedError for StorageError {
    fn into_fyxed(self) -> FyxedError {
        match self {
            StorageError::Rusqlite(err) => err.into_fyxed(),
            StorageError::InvalidConfig(msg) => FyxedError::Config(msg),
            StorageError::Timeout(secs) => {
                FyxedError::Database(format!("timed out acquiring a connection after {secs}s"))
            }
            StorageError::SerdeJson(err) => FyxedError::Internal(err.to_string()),
            other => FyxedError::Database(other.to_string()),
        }
    }
}

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        InfraError(value.into_fyxed())
    }
}

/// Convert a storage-layer failure into the domain error
///
/// Critical failures are logged before their classification is lost.
pub fn map_storage_error(err: StorageError) -> FyxedError {
    if err.is_critical() {
        error!(severity = %err.severity(), error = %err, "Critical storage failure");
    }
    err.into_fyxed()
}

/// Convert a failed blocking task into the domain error
pub fn map_join_error(err: JoinError) -> FyxedError {
    FyxedError::Internal(format!("Task join error: {err}"))
}
