//! Command handlers - one per user-facing operation
//!
//! Each handler takes the [`AppContext`](crate::AppContext) explicitly and
//! returns serializable domain values.

mod commissions;
mod hierarchy;
mod import;
mod payouts;
mod settings;

pub use commissions::*;
pub use hierarchy::*;
pub use import::*;
pub use payouts::*;
pub use settings::*;
