//! Hierarchy report and team view commands

use fyxed_domain::{HierarchyNode, HierarchyReport, Result as DomainResult, SaleFilter};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Full sponsor forest with per-node earnings and integrity warnings.
pub async fn get_hierarchy(ctx: &AppContext, filter: &SaleFilter) -> DomainResult<HierarchyReport> {
    execute_command("hierarchy::get_hierarchy", || ctx.hierarchy.report(filter)).await
}

/// Subtree rooted at `user_id` ("My Team").
pub async fn get_team(
    ctx: &AppContext,
    user_id: &str,
    filter: &SaleFilter,
) -> DomainResult<HierarchyNode> {
    execute_command("hierarchy::get_team", || ctx.hierarchy.team_of(user_id, filter)).await
}
