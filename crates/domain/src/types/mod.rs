//! Domain types and models

pub mod commission;
pub mod hierarchy;
pub mod money;
pub mod payout;
pub mod sale;
pub mod user;

pub use commission::{
    CommissionRates, CommissionSplit, RecomputeConfirmation, RecomputeFailure, RecomputeReport,
    Upline,
};
pub use hierarchy::{HierarchyNode, HierarchyReport, HierarchyWarning, TeamStats};
pub use money::{BasisPoints, Money};
pub use payout::{PayoutBatch, PayoutLine};
pub use sale::{ComputedShares, NewSale, Sale, SaleFilter, SaleStatus};
pub use user::{User, UserRole};
