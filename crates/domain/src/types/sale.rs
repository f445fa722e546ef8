//! Sales, their lifecycle and the persisted commission block

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;
use uuid::Uuid;

use super::commission::{CommissionSplit, Upline};
use super::money::Money;
use crate::errors::{FyxedError, Result};
use crate::impl_domain_status_conversions;

/// Sale lifecycle: `open -> approved -> paid`, or `open -> paid` directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Open,
    Approved,
    Paid,
}

impl_domain_status_conversions!(SaleStatus {
    Open => "open",
    Approved => "approved",
    Paid => "paid",
});

impl SaleStatus {
    /// Status only moves forward: open to approved or paid, approved to paid
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!((self, next), (Self::Open, Self::Approved | Self::Paid) | (Self::Approved, Self::Paid))
    }

    /// Validate a move to `next`
    pub fn transition_to(self, next: Self) -> Result<Self> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(FyxedError::InvalidTransition { from: self.to_string(), to: next.to_string() })
        }
    }
}

/// Commission split persisted with a sale
///
/// Written once when the sale is recorded. Only the confirmed bulk
/// recompute overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct ComputedShares {
    pub seller_share: Money,
    pub leader_id: Option<String>,
    pub leader_share: Money,
    pub sponsor_id: Option<String>,
    pub sponsor_share: Money,
    pub fyxed_share: Money,
}

impl ComputedShares {
    pub fn new(split: CommissionSplit, upline: Upline) -> Self {
        Self {
            seller_share: split.seller_share,
            leader_id: upline.leader_id,
            leader_share: split.leader_share,
            sponsor_id: upline.sponsor_id,
            sponsor_share: split.sponsor_share,
            fyxed_share: split.fyxed_share,
        }
    }

    pub fn split(&self) -> CommissionSplit {
        CommissionSplit {
            seller_share: self.seller_share,
            leader_share: self.leader_share,
            sponsor_share: self.sponsor_share,
            fyxed_share: self.fyxed_share,
        }
    }

    pub fn upline(&self) -> Upline {
        Upline { leader_id: self.leader_id.clone(), sponsor_id: self.sponsor_id.clone() }
    }

    /// Check that the block is a valid split of `amount`
    ///
    /// # Errors
    /// `InvalidInput` when a share is negative, when a leader or sponsor
    /// share has no recipient, or when the four shares do not add up to
    /// `amount`.
    pub fn check_against(&self, amount: Money) -> Result<()> {
        let split = self.split();
        let shares = [
            ("seller_share", split.seller_share),
            ("leader_share", split.leader_share),
            ("sponsor_share", split.sponsor_share),
            ("fyxed_share", split.fyxed_share),
        ];
        if let Some((name, share)) = shares.iter().find(|(_, share)| share.minor_units() < 0) {
            return Err(FyxedError::InvalidInput(format!(
                "{name} is negative ({})",
                share.minor_units()
            )));
        }
        if self.leader_id.is_none() && split.leader_share != Money::ZERO {
            return Err(FyxedError::InvalidInput("leader_share without leader_id".to_string()));
        }
        if self.sponsor_id.is_none() && split.sponsor_share != Money::ZERO {
            return Err(FyxedError::InvalidInput("sponsor_share without sponsor_id".to_string()));
        }
        if split.checked_total() != Some(amount) {
            return Err(FyxedError::InvalidInput(format!(
                "shares do not add up to amount {}",
                amount.minor_units()
            )));
        }
        Ok(())
    }
}

/// A sale attributed to one seller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct Sale {
    pub id: String,
    pub seller_id: String,
    pub amount: Money,
    /// ISO 4217 code
    pub currency: String,
    pub status: SaleStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<ComputedShares>,
}

impl Sale {
    /// Time-ordered identifier for a new sale
    pub fn new_id() -> String {
        Uuid::now_v7().to_string()
    }
}

/// Input for recording a sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct NewSale {
    pub seller_id: String,
    pub amount: Money,
    /// Falls back to the configured currency
    #[serde(default)]
    pub currency: Option<String>,
    /// Falls back to now
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Upstream filter applied before aggregation or payout
///
/// `from` is inclusive, `to` exclusive. An empty `statuses` list matches
/// every status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct SaleFilter {
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub statuses: Vec<SaleStatus>,
}

impl SaleFilter {
    pub fn with_statuses(statuses: impl Into<Vec<SaleStatus>>) -> Self {
        Self { statuses: statuses.into(), ..Self::default() }
    }

    /// Status and `[from, to)` window check for a single sale
    pub fn matches(&self, sale: &Sale) -> bool {
        self.from.map_or(true, |from| sale.created_at >= from)
            && self.to.map_or(true, |to| sale.created_at < to)
            && (self.statuses.is_empty() || self.statuses.contains(&sale.status))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sale_at(day: u32, status: SaleStatus) -> Sale {
        Sale {
            id: format!("s-{day}"),
            seller_id: "agent".into(),
            amount: Money::from_minor(1_000),
            currency: "USD".into(),
            status,
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            computed: None,
        }
    }

    #[test]
    fn allowed_transitions() {
        assert_eq!(SaleStatus::Open.transition_to(SaleStatus::Approved), Ok(SaleStatus::Approved));
        assert_eq!(SaleStatus::Open.transition_to(SaleStatus::Paid), Ok(SaleStatus::Paid));
        assert_eq!(SaleStatus::Approved.transition_to(SaleStatus::Paid), Ok(SaleStatus::Paid));
    }

    #[test]
    fn rejected_transitions() {
        for (from, to) in [
            (SaleStatus::Paid, SaleStatus::Open),
            (SaleStatus::Paid, SaleStatus::Approved),
            (SaleStatus::Approved, SaleStatus::Open),
            (SaleStatus::Approved, SaleStatus::Approved),
        ] {
            let err = from.transition_to(to).unwrap_err();
            assert_eq!(
                err,
                FyxedError::InvalidTransition { from: from.to_string(), to: to.to_string() }
            );
        }
    }

    #[test]
    fn filter_bounds_and_statuses() {
        let filter = SaleFilter {
            from: Some(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()),
            to: Some(Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()),
            statuses: vec![SaleStatus::Approved],
        };

        assert!(!filter.matches(&sale_at(1, SaleStatus::Approved)));
        assert!(filter.matches(&sale_at(2, SaleStatus::Approved)));
        assert!(filter.matches(&sale_at(3, SaleStatus::Approved)));
        assert!(!filter.matches(&sale_at(3, SaleStatus::Open)));
        assert!(!filter.matches(&sale_at(4, SaleStatus::Approved)));
        assert!(SaleFilter::default().matches(&sale_at(9, SaleStatus::Paid)));
    }

    #[test]
    fn new_ids_are_unique_uuids() {
        let first = Sale::new_id();
        let second = Sale::new_id();
        assert_ne!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    fn shares(seller: i64, leader: i64, sponsor: i64, fyxed: i64) -> ComputedShares {
        ComputedShares {
            seller_share: Money::from_minor(seller),
            leader_id: Some("leader".into()),
            leader_share: Money::from_minor(leader),
            sponsor_id: Some("owner".into()),
            sponsor_share: Money::from_minor(sponsor),
            fyxed_share: Money::from_minor(fyxed),
        }
    }

    #[test]
    fn status_parses_from_text() {
        assert_eq!("APPROVED".parse::<SaleStatus>(), Ok(SaleStatus::Approved));
        assert!("refunded".parse::<SaleStatus>().is_err());
    }

    #[test]
    fn computed_block_must_split_the_amount() {
        let amount = Money::from_minor(1_000);
        assert!(shares(500, 100, 100, 300).check_against(amount).is_ok());

        for bad in [shares(900, 900, 0, -5), shares(500, 100, 100, 299), shares(600, 100, 100, 300)]
        {
            let err = bad.check_against(amount).unwrap_err();
            assert!(matches!(err, FyxedError::InvalidInput(_)), "{bad:?}");
        }
    }

    #[test]
    fn computed_block_needs_recipients_for_overrides() {
        let mut block = shares(500, 100, 100, 300);
        block.leader_id = None;
        let err = block.check_against(Money::from_minor(1_000)).unwrap_err();
        assert_eq!(err, FyxedError::InvalidInput("leader_share without leader_id".into()));
    }

    #[test]
    fn computed_total_overflow_is_rejected() {
        let half = i64::MAX / 2 + 1;
        let block = shares(half, 0, 0, half);
        assert!(block.check_against(Money::from_minor(i64::MAX)).is_err());
    }
}
