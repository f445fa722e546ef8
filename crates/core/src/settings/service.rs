//! Rate lookup and validated updates

use std::sync::Arc;

use fyxed_domain::{CommissionRates, Result};
use tracing::{info, warn};

use super::ports::SettingsRepository;
use crate::commission::CommissionCalculator;

/// Resolves the rates in effect and guards updates
pub struct SettingsService {
    repository: Arc<dyn SettingsRepository>,
    defaults: CommissionRates,
}

impl SettingsService {
    /// `defaults` apply until rates are stored
    pub fn new(repository: Arc<dyn SettingsRepository>, defaults: CommissionRates) -> Self {
        Self { repository, defaults }
    }

    /// Stored rates, else the configured defaults
    pub async fn current_rates(&self) -> Result<CommissionRates> {
        Ok(self.repository.load_rates().await?.unwrap_or(self.defaults))
    }

    /// Validate and store new rates
    ///
    /// # Errors
    /// `RateConfiguration` when the rates sum above 100%; nothing is stored.
    pub async fn update_rates(&self, rates: CommissionRates) -> Result<CommissionRates> {
        if let Err(err) = rates.validate() {
            warn!(total_bps = rates.total_bps(), "Rejected commission rate update");
            return Err(err);
        }

        self.repository.save_rates(rates).await?;
        info!(
            seller_bps = rates.seller.value(),
            leader_bps = rates.leader.value(),
            sponsor_bps = rates.sponsor.value(),
            fyxed_bps = rates.fyxed.value(),
            "Commission rates updated"
        );
        Ok(rates)
    }

    /// Calculator for the rates currently in effect
    pub async fn calculator(&self) -> Result<CommissionCalculator> {
        CommissionCalculator::new(self.current_rates().await?)
    }
}
