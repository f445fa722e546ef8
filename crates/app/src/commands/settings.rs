//! Commission rate settings

use fyxed_domain::{CommissionRates, Result as DomainResult};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Stored rates, or the configured defaults when none were saved.
pub async fn get_commission_rates(ctx: &AppContext) -> DomainResult<CommissionRates> {
    execute_command("settings::get_commission_rates", || ctx.settings.current_rates()).await
}

/// Validate and persist new rates. Existing sales keep their splits.
pub async fn update_commission_rates(
    ctx: &AppContext,
    rates: CommissionRates,
) -> DomainResult<CommissionRates> {
    execute_command("settings::update_commission_rates", || ctx.settings.update_rates(rates)).await
}
