//! Payout generation from approved sales

pub mod generator;
pub mod service;

pub use generator::generate_payouts;
pub use service::PayoutService;
