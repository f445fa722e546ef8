//! Commission rates, splits and recompute bookkeeping

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::money::{BasisPoints, Money};
use crate::constants::{
    BASIS_POINTS_SCALE, DEFAULT_FYXED_RATE_BPS, DEFAULT_LEADER_RATE_BPS, DEFAULT_SELLER_RATE_BPS,
    DEFAULT_SPONSOR_RATE_BPS,
};
use crate::errors::{FyxedError, Result};

/// Admin-editable commission percentages
///
/// `fyxed` is informational: the company always receives whatever the other
/// three shares leave over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct CommissionRates {
    pub seller: BasisPoints,
    pub leader: BasisPoints,
    pub sponsor: BasisPoints,
    pub fyxed: BasisPoints,
}

impl CommissionRates {
    pub const fn new(
        seller: BasisPoints,
        leader: BasisPoints,
        sponsor: BasisPoints,
        fyxed: BasisPoints,
    ) -> Self {
        Self { seller, leader, sponsor, fyxed }
    }

    /// Sum of all four rates in basis points
    pub fn total_bps(&self) -> u64 {
        [self.seller, self.leader, self.sponsor, self.fyxed]
            .iter()
            .map(|rate| u64::from(rate.value()))
            .sum()
    }

    /// Reject configurations that would pay out more than 100%
    pub fn validate(&self) -> Result<()> {
        let total = self.total_bps();
        if total > u64::from(BASIS_POINTS_SCALE) {
            return Err(FyxedError::RateConfiguration(format!(
                "rates sum to {total} bps (seller {}, leader {}, sponsor {}, fyxed {}), above {BASIS_POINTS_SCALE}",
                self.seller.value(),
                self.leader.value(),
                self.sponsor.value(),
                self.fyxed.value(),
            )));
        }
        Ok(())
    }
}

impl Default for CommissionRates {
    fn default() -> Self {
        Self {
            seller: BasisPoints::new(DEFAULT_SELLER_RATE_BPS),
            leader: BasisPoints::new(DEFAULT_LEADER_RATE_BPS),
            sponsor: BasisPoints::new(DEFAULT_SPONSOR_RATE_BPS),
            fyxed: BasisPoints::new(DEFAULT_FYXED_RATE_BPS),
        }
    }
}

/// Four-way split of one sale amount
///
/// The four shares always add up to the sale amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct CommissionSplit {
    pub seller_share: Money,
    pub leader_share: Money,
    pub sponsor_share: Money,
    pub fyxed_share: Money,
}

impl CommissionSplit {
    /// Sum of the four shares, `None` when it leaves `i64`
    pub fn checked_total(&self) -> Option<Money> {
        Money::checked_sum([
            self.seller_share,
            self.leader_share,
            self.sponsor_share,
            self.fyxed_share,
        ])
    }
}

/// Resolved upline of a seller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct Upline {
    /// The seller's direct sponsor
    pub leader_id: Option<String>,
    /// The leader's sponsor
    pub sponsor_id: Option<String>,
}

impl Upline {
    pub fn has_leader(&self) -> bool {
        self.leader_id.is_some()
    }

    /// Sponsor share is only paid when both upline slots are filled
    pub fn has_sponsor(&self) -> bool {
        self.leader_id.is_some() && self.sponsor_id.is_some()
    }
}

/// Double opt-in for the bulk recompute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct RecomputeConfirmation {
    pub confirmed: bool,
    pub acknowledge_overwrite: bool,
}

impl RecomputeConfirmation {
    pub const fn granted() -> Self {
        Self { confirmed: true, acknowledge_overwrite: true }
    }

    pub const fn is_granted(&self) -> bool {
        self.confirmed && self.acknowledge_overwrite
    }
}

/// One sale the recompute could not process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct RecomputeFailure {
    pub sale_id: String,
    pub reason: String,
}

/// Outcome of a recompute run
///
/// When `failed` is non-empty nothing was written and `applied` is false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct RecomputeReport {
    pub total: u32,
    pub changed: u32,
    pub unchanged: u32,
    pub failed: Vec<RecomputeFailure>,
    pub applied: bool,
}

impl RecomputeReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
