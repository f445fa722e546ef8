//! Payout preview and settlement

use std::sync::Arc;

use fyxed_domain::{Money, PayoutBatch, Result, SaleFilter, SaleStatus};
use tracing::info;

use super::generator::generate_payouts;
use crate::sales::ports::SaleRepository;

/// Generates payout batches and settles them
pub struct PayoutService {
    sales: Arc<dyn SaleRepository>,
}

impl PayoutService {
    /// Service paying out sales from `sales`
    pub fn new(sales: Arc<dyn SaleRepository>) -> Self {
        Self { sales }
    }

    /// Batch for approved sales in the filter's time window, no side effects
    ///
    /// Any status restriction on `filter` is replaced by `approved`.
    pub async fn preview(&self, filter: &SaleFilter) -> Result<PayoutBatch> {
        let filter = SaleFilter { statuses: vec![SaleStatus::Approved], ..filter.clone() };
        let sales = self.sales.list_sales(&filter).await?;
        generate_payouts(&sales)
    }

    /// Generate the batch and mark every included sale paid atomically
    pub async fn settle(&self, filter: &SaleFilter) -> Result<PayoutBatch> {
        let batch = self.preview(filter).await?;
        if batch.is_empty() {
            info!("No approved sales to settle");
            return Ok(batch);
        }

        let updated = self.sales.mark_paid(&batch.sale_ids).await?;
        info!(
            sales = updated,
            recipients = batch.lines.len(),
            payable = ?batch.total_payable().map(Money::minor_units),
            company_share = batch.company_share.minor_units(),
            "Payout batch settled"
        );
        Ok(batch)
    }
}
