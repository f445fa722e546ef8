//! Error classification shared across layers
//!
//! Errors that flow through storage implement [`ErrorClassification`] so
//! callers can decide whether to retry and how loudly to log.
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | Resource not found, empty results |
//! | **Warning** | Degraded but operational | Lock contention, pool exhaustion |
//! | **Error** | Failure requiring attention | Invalid input, config errors |
//! | **Critical** | System integrity at risk | Schema mismatch, failed migration |

use std::fmt;

/// Standard interface for classifying errors
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient (timeouts, busy databases, lock
    /// contention) and may succeed on a later attempt.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }
}

/// Error severity levels for logging and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
