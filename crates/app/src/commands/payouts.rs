//! Payout preview and settlement

use fyxed_domain::{PayoutBatch, Result as DomainResult, SaleFilter};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Payout batch for approved sales in the window, without writing.
pub async fn preview_payouts(ctx: &AppContext, filter: &SaleFilter) -> DomainResult<PayoutBatch> {
    execute_command("payouts::preview", || ctx.payouts.preview(filter)).await
}

/// Generate the batch and mark its sales paid in one transaction.
pub async fn settle_payouts(ctx: &AppContext, filter: &SaleFilter) -> DomainResult<PayoutBatch> {
    execute_command("payouts::settle", || ctx.payouts.settle(filter)).await
}
