//! Commission splitting
//!
//! The calculator is a pure function of amount, rates and upline presence.
//! The service records sales, approves them and runs the audited bulk
//! recompute.

pub mod calculator;
pub mod service;
pub mod upline;

pub use calculator::{compute_commission, CommissionCalculator};
pub use service::CommissionService;
pub(crate) use service::normalize_currency;
pub use upline::resolve_upline;
