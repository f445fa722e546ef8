//! Bulk load of user and sale snapshots

use std::sync::Arc;

use fyxed_domain::{FyxedError, Result, Sale, User};
use serde::Serialize;
use tracing::info;

use crate::commission::normalize_currency;
use crate::sales::ports::SaleRepository;
use crate::user::ports::UserRepository;

/// Counts written by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub users: usize,
    pub sales: usize,
}

/// Writes externally fetched snapshots
///
/// Sales keep whatever computed block they arrive with. Sales without one
/// are split on the fly by the hierarchy view until a recompute fills them.
pub struct SnapshotService {
    users: Arc<dyn UserRepository>,
    sales: Arc<dyn SaleRepository>,
}

impl SnapshotService {
    /// Service writing through the given repositories
    pub fn new(users: Arc<dyn UserRepository>, sales: Arc<dyn SaleRepository>) -> Self {
        Self { users, sales }
    }

    /// Upsert `users`, then insert `sales`
    ///
    /// Currency codes are stored upper-cased.
    ///
    /// # Errors
    /// - `InvalidInput` for blank ids, bad currency codes, and computed
    ///   blocks that are not a valid split of the sale amount
    /// - `InvalidAmount` for non-positive sale amounts
    ///
    /// Validation runs before anything is written.
    pub async fn import(&self, users: Vec<User>, mut sales: Vec<Sale>) -> Result<ImportSummary> {
        if let Some(user) = users.iter().find(|user| user.id.trim().is_empty()) {
            return Err(FyxedError::InvalidInput(format!("user '{}' has a blank id", user.name)));
        }
        if let Some(sale) = sales.iter().find(|sale| sale.id.trim().is_empty()) {
            return Err(FyxedError::InvalidInput(format!(
                "sale by '{}' has a blank id",
                sale.seller_id
            )));
        }
        if let Some(sale) = sales.iter().find(|sale| !sale.amount.is_positive()) {
            return Err(FyxedError::InvalidAmount(sale.amount.minor_units()));
        }
        for sale in &mut sales {
            sale.currency = normalize_currency(&sale.currency)?;
            if let Some(computed) = &sale.computed {
                computed.check_against(sale.amount).map_err(|err| match err {
                    FyxedError::InvalidInput(reason) => {
                        FyxedError::InvalidInput(format!("sale '{}': {reason}", sale.id))
                    }
                    other => other,
                })?;
            }
        }

        let summary = ImportSummary {
            users: if users.is_empty() { 0 } else { self.users.upsert_users(users).await? },
            sales: if sales.is_empty() { 0 } else { self.sales.insert_sales(sales).await? },
        };

        info!(users = summary.users, sales = summary.sales, "Snapshot imported");
        Ok(summary)
    }
}
