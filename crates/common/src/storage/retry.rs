//! Bounded retry for transient storage failures
//!
//! Only errors classified as retryable are attempted again. Delays grow
//! exponentially from `initial_delay` and are capped at `max_delay`.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ErrorClassification;
use crate::storage::error::StorageResult;

/// Retry limits for blocking storage calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRetry {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for StorageRetry {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(25),
            max_delay: Duration::from_millis(500),
        }
    }
}

impl StorageRetry {
    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1_u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails permanently or runs out of attempts
    ///
    /// Must be called from a blocking context; waits use `thread::sleep`.
    pub fn run<T>(
        &self,
        operation: &str,
        mut op: impl FnMut() -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "Storage call recovered after retry");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        severity = %err.severity(),
                        error = %err,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Transient storage failure, retrying"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
