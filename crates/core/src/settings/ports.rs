//! Port interface for the stored commission rates

use async_trait::async_trait;
use fyxed_domain::{CommissionRates, Result};

/// Single-record store for admin-edited rates
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Stored rates, `None` until an admin saves some
    async fn load_rates(&self) -> Result<Option<CommissionRates>>;

    /// Replace the stored rates
    async fn save_rates(&self, rates: CommissionRates) -> Result<()>;
}
