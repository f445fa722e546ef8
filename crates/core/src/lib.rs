//! # Fyxed Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The commission calculator and upline resolution
//! - The hierarchy aggregator and its sponsor normalization pass
//! - Payout generation
//! - Port interfaces (traits) implemented by `fyxed-infra`
//! - Services that orchestrate ports and business rules
//!
//! ## Architecture Principles
//! - Only depends on `fyxed-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod commission;
pub mod directory;
pub mod hierarchy;
pub mod payout;
pub mod sales;
pub mod settings;
pub mod snapshot;
pub mod user;

pub use commission::{compute_commission, resolve_upline, CommissionCalculator, CommissionService};
pub use directory::UserDirectory;
pub use hierarchy::{build_hierarchy, HierarchyAggregator, HierarchyService};
pub use payout::{generate_payouts, PayoutService};
pub use sales::ports::{ComputedUpdate, SaleRepository};
pub use settings::ports::SettingsRepository;
pub use settings::SettingsService;
pub use snapshot::{ImportSummary, SnapshotService};
pub use user::ports::UserRepository;
