//! Sale recording, approval and the audited bulk recompute

use std::sync::Arc;

use chrono::Utc;
use fyxed_domain::{
    ComputedShares, FyxedError, NewSale, RecomputeConfirmation, RecomputeFailure,
    RecomputeReport, Result, Sale, SaleFilter, SaleStatus,
};
use tracing::{info, warn};

use super::calculator::CommissionCalculator;
use super::upline::resolve_upline;
use crate::directory::UserDirectory;
use crate::sales::ports::{ComputedUpdate, SaleRepository};
use crate::settings::SettingsService;
use crate::user::ports::UserRepository;

/// Commission workflow over the user and sale stores
pub struct CommissionService {
    users: Arc<dyn UserRepository>,
    sales: Arc<dyn SaleRepository>,
    settings: Arc<SettingsService>,
    currency: String,
}

impl CommissionService {
    /// `currency` is assigned to sales recorded without one
    pub fn new(
        users: Arc<dyn UserRepository>,
        sales: Arc<dyn SaleRepository>,
        settings: Arc<SettingsService>,
        currency: impl Into<String>,
    ) -> Self {
        Self { users, sales, settings, currency: currency.into() }
    }

    /// Validate, split and persist a new sale
    ///
    /// The computed block is written together with the sale and is not
    /// touched again outside [`Self::recompute_all`].
    pub async fn record_sale(&self, new_sale: NewSale) -> Result<Sale> {
        if !new_sale.amount.is_positive() {
            return Err(FyxedError::InvalidAmount(new_sale.amount.minor_units()));
        }
        let currency =
            normalize_currency(new_sale.currency.as_deref().unwrap_or(self.currency.as_str()))?;

        let users = self.users.list_users().await?;
        let directory = UserDirectory::new(&users);
        let upline = resolve_upline(&new_sale.seller_id, &directory)?;
        let split = self.settings.calculator().await?.compute_for(new_sale.amount, &upline)?;

        let sale = Sale {
            id: Sale::new_id(),
            seller_id: new_sale.seller_id,
            amount: new_sale.amount,
            currency,
            status: SaleStatus::Open,
            created_at: new_sale.created_at.unwrap_or_else(Utc::now),
            computed: Some(ComputedShares::new(split, upline)),
        };

        self.sales.insert_sales(vec![sale.clone()]).await?;
        info!(
            sale_id = %sale.id,
            seller_id = %sale.seller_id,
            amount = sale.amount.minor_units(),
            seller_share = split.seller_share.minor_units(),
            fyxed_share = split.fyxed_share.minor_units(),
            "Sale recorded"
        );
        Ok(sale)
    }

    /// Move an open sale to approved
    pub async fn approve_sale(&self, sale_id: &str) -> Result<Sale> {
        let mut sale = self
            .sales
            .get_sale(sale_id)
            .await?
            .ok_or_else(|| FyxedError::NotFound(format!("sale '{sale_id}'")))?;

        let next = sale.status.transition_to(SaleStatus::Approved)?;
        self.sales.update_status(sale_id, sale.status, next).await?;
        sale.status = next;

        info!(sale_id, "Sale approved");
        Ok(sale)
    }

    /// Recompute every sale's computed block with the current rates
    ///
    /// All splits are computed in memory first. If any sale fails, nothing
    /// is written and the report lists every failure. Otherwise the changed
    /// blocks are written in one transaction. Running it twice in a row
    /// reports zero changes the second time.
    ///
    /// # Errors
    /// `InvalidInput` unless both confirmation flags are set.
    pub async fn recompute_all(&self, confirmation: RecomputeConfirmation) -> Result<RecomputeReport> {
        if !confirmation.is_granted() {
            return Err(FyxedError::InvalidInput(
                "recompute requires both confirmed and acknowledge_overwrite".to_string(),
            ));
        }

        let users = self.users.list_users().await?;
        let sales = self.sales.list_sales(&SaleFilter::default()).await?;
        let calculator = self.settings.calculator().await?;

        let plan = plan_recompute(&calculator, &UserDirectory::new(&users), &sales);
        let mut report = RecomputeReport {
            total: count(sales.len()),
            changed: count(plan.updates.len()),
            unchanged: plan.unchanged,
            failed: plan.failures,
            applied: false,
        };

        if !report.failed.is_empty() {
            warn!(
                total = report.total,
                failed = report.failed.len(),
                "Recompute aborted, no sales were modified"
            );
            return Ok(report);
        }

        if !plan.updates.is_empty() {
            self.sales.apply_computed(plan.updates).await?;
        }
        report.applied = true;

        info!(
            total = report.total,
            changed = report.changed,
            unchanged = report.unchanged,
            failed = 0,
            "Recompute applied"
        );
        Ok(report)
    }
}

struct RecomputePlan {
    updates: Vec<ComputedUpdate>,
    unchanged: u32,
    failures: Vec<RecomputeFailure>,
}

fn plan_recompute(
    calculator: &CommissionCalculator,
    directory: &UserDirectory<'_>,
    sales: &[Sale],
) -> RecomputePlan {
    let mut plan = RecomputePlan { updates: Vec::new(), unchanged: 0, failures: Vec::new() };

    for sale in sales {
        let computed = resolve_upline(&sale.seller_id, directory).and_then(|upline| {
            let split = calculator.compute_for(sale.amount, &upline)?;
            Ok(ComputedShares::new(split, upline))
        });

        match computed {
            Ok(computed) if sale.computed.as_ref() == Some(&computed) => plan.unchanged += 1,
            Ok(computed) => {
                plan.updates.push(ComputedUpdate { sale_id: sale.id.clone(), computed });
            }
            Err(err) => plan
                .failures
                .push(RecomputeFailure { sale_id: sale.id.clone(), reason: err.to_string() }),
        }
    }

    plan
}

/// Trimmed, upper-cased ISO 4217 code
pub(crate) fn normalize_currency(code: &str) -> Result<String> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(FyxedError::InvalidInput(format!("currency '{code}' is not an ISO 4217 code")))
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
