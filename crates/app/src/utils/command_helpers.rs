//! Command execution helpers
//!
//! Provides utilities to reduce boilerplate when implementing commands with
//! timing and logging.

use std::future::Future;
use std::time::Instant;

use fyxed_domain::Result as DomainResult;

use crate::utils::logging::{error_label, log_command_execution};

/// Execute a command with automatic timing and logging
///
/// # Example
///
/// ```rust,ignore
/// pub async fn approve_sale(ctx: &AppContext, sale_id: &str) -> DomainResult<Sale> {
///     execute_command("commissions::approve_sale", || ctx.commissions.approve_sale(sale_id))
///         .await
/// }
/// ```
pub async fn execute_command<F, Fut, T>(command_name: &str, command_fn: F) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command_fn().await;

    let error_type = result.as_ref().err().map(error_label);
    log_command_execution(command_name, start.elapsed(), result.is_ok(), error_type);

    result
}
