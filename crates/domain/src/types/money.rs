//! Money and rate primitives
//!
//! Amounts are integer minor units so every split is exact.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use crate::constants::{BASIS_POINTS_SCALE, MINOR_UNITS_PER_MAJOR};
use crate::errors::FyxedError;

/// Amount in currency minor units (cents)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(transparent)]
pub struct Money(#[cfg_attr(feature = "ts-gen", ts(type = "number"))] i64);

impl Money {
    pub const ZERO: Self = Self(0);

    /// Wrap a raw minor-unit amount
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Raw minor-unit amount
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// `floor(self * rate / 10_000)`, or `None` when the result leaves `i64`
    pub fn checked_share(self, rate: BasisPoints) -> Option<Self> {
        let scaled = i128::from(self.0) * i128::from(rate.value()) / i128::from(BASIS_POINTS_SCALE);
        i64::try_from(scaled).ok().map(Self)
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Sum of `amounts`, or `None` when the total leaves `i64`
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Option<Self> {
        amounts.into_iter().try_fold(Self::ZERO, Self::checked_add)
    }

    /// `self + rhs`, failing with `AmountOverflow` that names the total
    pub fn try_add(self, rhs: Self, total: &str) -> Result<Self, FyxedError> {
        self.checked_add(rhs).ok_or_else(|| {
            FyxedError::AmountOverflow(format!(
                "{total} exceeds {} minor units",
                i64::MAX
            ))
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_major = MINOR_UNITS_PER_MAJOR.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / per_major, abs % per_major)
    }
}

/// Parses major units with up to two decimals, e.g. `"12.5"` is 1 250 minor
impl FromStr for Money {
    type Err = FyxedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, digits) = match s.trim().strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.trim()),
        };
        let minor = parse_fixed_point(digits, 2)
            .ok_or_else(|| FyxedError::InvalidInput(format!("invalid amount '{s}'")))?;
        Ok(Self(if negative { -minor } else { minor }))
    }
}

/// Rate in basis points, 10 000 = 100%
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(transparent)]
pub struct BasisPoints(u32);

impl BasisPoints {
    pub const ZERO: Self = Self(0);
    pub const FULL: Self = Self(BASIS_POINTS_SCALE);

    pub const fn new(bps: u32) -> Self {
        Self(bps)
    }

    /// Whole percent, e.g. `from_percent(50)` is 5 000 bps
    pub const fn from_percent(percent: u32) -> Self {
        Self(percent * 100)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

/// Parses a percentage with up to two decimals, with or without `%`
impl FromStr for BasisPoints {
    type Err = FyxedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
        parse_fixed_point(digits, 2)
            .and_then(|bps| u32::try_from(bps).ok())
            .map(Self)
            .ok_or_else(|| FyxedError::InvalidInput(format!("invalid rate '{s}'")))
    }
}

/// `"12.34"` with `decimals = 2` is 1 234; more decimals than allowed is rejected
fn parse_fixed_point(text: &str, decimals: u32) -> Option<i64> {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
        return None;
    }
    if fraction.len() > decimals as usize {
        return None;
    }

    let scale = 10_i64.checked_pow(decimals)?;
    let padded = format!("{fraction:0<width$}", width = decimals as usize);
    let fraction = if padded.is_empty() { 0 } else { padded.parse::<i64>().ok()? };
    whole.parse::<i64>().ok()?.checked_mul(scale)?.checked_add(fraction)
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}
