//! Four-way commission split
//!
//! Seller, leader and sponsor shares are each `floor(amount * rate)`. The
//! company ("fyxed") share is whatever is left, so the four parts always add
//! up to the sale amount. Missing upline shares fall to the company and are
//! never redistributed to the seller.

use fyxed_domain::{
    BasisPoints, CommissionRates, CommissionSplit, FyxedError, Money, Result, Upline,
};

/// Split a sale amount with the given rates
///
/// `sponsor_present` only counts when a leader is present too.
///
/// # Errors
/// - `InvalidAmount` when `amount <= 0`
/// - `RateConfiguration` when the rates sum above 100%
pub fn compute_commission(
    amount: Money,
    rates: &CommissionRates,
    leader_present: bool,
    sponsor_present: bool,
) -> Result<CommissionSplit> {
    rates.validate()?;
    split(amount, rates, leader_present, leader_present && sponsor_present)
}

/// Calculator bound to a validated rate set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionCalculator {
    rates: CommissionRates,
}

impl CommissionCalculator {
    /// # Errors
    /// `RateConfiguration` when the rates sum above 100%
    pub fn new(rates: CommissionRates) -> Result<Self> {
        rates.validate()?;
        Ok(Self { rates })
    }

    /// Rates this calculator was validated with
    pub fn rates(&self) -> &CommissionRates {
        &self.rates
    }

    /// Split `amount` between seller, leader, sponsor and company
    ///
    /// A sponsor share is only paid when a leader is present too. Shares of
    /// absent recipients fall through to the company share.
    ///
    /// # Errors
    /// `InvalidAmount` for non-positive amounts, `RateConfiguration` when the
    /// shares would exceed the amount.
    pub fn compute(
        &self,
        amount: Money,
        leader_present: bool,
        sponsor_present: bool,
    ) -> Result<CommissionSplit> {
        split(amount, &self.rates, leader_present, leader_present && sponsor_present)
    }

    /// Split for a resolved upline
    pub fn compute_for(&self, amount: Money, upline: &Upline) -> Result<CommissionSplit> {
        self.compute(amount, upline.has_leader(), upline.has_sponsor())
    }
}

impl Default for CommissionCalculator {
    fn default() -> Self {
        Self { rates: CommissionRates::default() }
    }
}

fn split(
    amount: Money,
    rates: &CommissionRates,
    leader_present: bool,
    sponsor_present: bool,
) -> Result<CommissionSplit> {
    if !amount.is_positive() {
        return Err(FyxedError::InvalidAmount(amount.minor_units()));
    }

    let seller_share = share(amount, rates.seller)?;
    let leader_share = if leader_present { share(amount, rates.leader)? } else { Money::ZERO };
    let sponsor_share = if sponsor_present { share(amount, rates.sponsor)? } else { Money::ZERO };

    let fyxed_share = amount
        .checked_sub(seller_share)
        .and_then(|rest| rest.checked_sub(leader_share))
        .and_then(|rest| rest.checked_sub(sponsor_share))
        .filter(|rest| rest.minor_units() >= 0)
        .ok_or_else(|| {
            FyxedError::RateConfiguration(format!(
                "shares exceed sale amount {} at rates {:?}",
                amount.minor_units(),
                rates
            ))
        })?;

    Ok(CommissionSplit { seller_share, leader_share, sponsor_share, fyxed_share })
}

fn share(amount: Money, rate: BasisPoints) -> Result<Money> {
    amount.checked_share(rate).ok_or_else(|| {
        FyxedError::Internal(format!(
            "share of {} at {rate} overflows",
            amount.minor_units()
        ))
    })
}
