//! Sponsor tree construction and rollups

pub mod aggregator;
pub mod normalize;
pub mod service;

pub use aggregator::{build_hierarchy, HierarchyAggregator};
pub use normalize::{normalize_sponsors, SponsorForest};
pub use service::HierarchyService;
