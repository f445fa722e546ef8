//! Sale recording, approval and the audited recompute

use fyxed_domain::{
    NewSale, RecomputeConfirmation, RecomputeReport, Result as DomainResult, Sale,
};
use tracing::info;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Record an open sale with its split computed from the stored upline.
pub async fn record_sale(ctx: &AppContext, new_sale: NewSale) -> DomainResult<Sale> {
    execute_command("commissions::record_sale", || ctx.commissions.record_sale(new_sale)).await
}

/// Move an open sale to approved.
pub async fn approve_sale(ctx: &AppContext, sale_id: &str) -> DomainResult<Sale> {
    execute_command("commissions::approve_sale", || ctx.commissions.approve_sale(sale_id)).await
}

/// Rewrite every stored split with the current rates and upline.
///
/// Requires both confirmation flags. Nothing is written when any sale fails;
/// the report then lists the failures.
pub async fn recompute_commissions(
    ctx: &AppContext,
    confirmation: RecomputeConfirmation,
) -> DomainResult<RecomputeReport> {
    info!(
        confirmed = confirmation.confirmed,
        acknowledge_overwrite = confirmation.acknowledge_overwrite,
        "Recompute requested"
    );
    execute_command("commissions::recompute_all", || ctx.commissions.recompute_all(confirmation))
        .await
}
