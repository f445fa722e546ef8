//! Hierarchy views over the stored snapshot

use std::sync::Arc;

use fyxed_domain::{FyxedError, HierarchyNode, HierarchyReport, Result, SaleFilter};
use tracing::info;

use super::aggregator::HierarchyAggregator;
use crate::sales::ports::SaleRepository;
use crate::settings::SettingsService;
use crate::user::ports::UserRepository;

/// Loads users and sales, then aggregates them
pub struct HierarchyService {
    users: Arc<dyn UserRepository>,
    sales: Arc<dyn SaleRepository>,
    settings: Arc<SettingsService>,
    currency: Option<String>,
}

impl HierarchyService {
    /// Service reading snapshots from the given repositories
    pub fn new(
        users: Arc<dyn UserRepository>,
        sales: Arc<dyn SaleRepository>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self { users, sales, settings, currency: None }
    }

    /// Restrict reports to one currency
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Full forest for the sales matching `filter`
    ///
    /// # Errors
    /// Repository failures, or `AmountOverflow` when a rollup leaves `i64`.
    pub async fn report(&self, filter: &SaleFilter) -> Result<HierarchyReport> {
        let users = self.users.list_users().await?;
        let sales = self.sales.list_sales(filter).await?;

        let mut aggregator = HierarchyAggregator::new(self.settings.calculator().await?);
        if let Some(currency) = &self.currency {
            aggregator = aggregator.with_currency(currency.clone());
        }

        let report = aggregator.build(&users, &sales)?;
        info!(
            users = users.len(),
            sales = sales.len(),
            roots = report.roots.len(),
            warnings = report.warnings.len(),
            "Hierarchy report generated"
        );
        Ok(report)
    }

    /// Subtree rooted at `user_id` (the "my team" view)
    ///
    /// # Errors
    /// `NotFound` when the user is not part of the forest, including users
    /// dropped for integrity warnings.
    pub async fn team_of(&self, user_id: &str, filter: &SaleFilter) -> Result<HierarchyNode> {
        let report = self.report(filter).await?;
        report
            .into_subtree(user_id)
            .ok_or_else(|| FyxedError::NotFound(format!("user '{user_id}' in hierarchy")))
    }
}
