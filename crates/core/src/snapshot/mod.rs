//! Snapshot import
//!
//! Users and sales fetched from an external system enter the store here.

pub mod service;

pub use service::{ImportSummary, SnapshotService};
