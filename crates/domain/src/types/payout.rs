//! Payout batches generated from approved sales

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::money::Money;

/// What one user is owed for the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct PayoutLine {
    pub user_id: String,
    /// Seller shares from the user's own sales
    pub personal: Money,
    /// Leader and sponsor shares
    pub overrides: Money,
    pub total: Money,
    /// Sales that contributed to this line
    pub sale_count: u32,
}

/// Aggregated payout for a set of sales
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct PayoutBatch {
    /// Sorted by user id
    pub lines: Vec<PayoutLine>,
    pub company_share: Money,
    /// Sum of the included sale amounts
    pub gross: Money,
    pub currency: Option<String>,
    pub sale_ids: Vec<String>,
}

impl PayoutBatch {
    pub fn is_empty(&self) -> bool {
        self.sale_ids.is_empty()
    }

    /// Total owed to users (company share excluded), `None` on overflow
    pub fn total_payable(&self) -> Option<Money> {
        Money::checked_sum(self.lines.iter().map(|line| line.total))
    }

    /// Line paying `user_id`, if they earned anything in the batch
    pub fn line_for(&self, user_id: &str) -> Option<&PayoutLine> {
        self.lines.iter().find(|line| line.user_id == user_id)
    }
}
