use std::time::Duration;

use fyxed_domain::{FyxedError, LoggingConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.level`. Logs go to stderr so command output
/// on stdout stays machine-readable. Calling this twice is a no-op.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let installed =
        if config.json { builder.json().try_init().is_ok() } else { builder.try_init().is_ok() };

    if !installed {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Log the outcome of a command execution with structured fields.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(
    command: &str,
    elapsed: Duration,
    success: bool,
    error_type: Option<&str>,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    if success {
        info!(command, duration_ms, success, "command_execution_success");
    } else {
        warn!(command, duration_ms, success, error_type, "command_execution_failure");
    }
}

/// Convert a `FyxedError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &FyxedError) -> &'static str {
    error.label()
}
