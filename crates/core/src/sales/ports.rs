//! Port interfaces for sale storage

use async_trait::async_trait;
use fyxed_domain::{ComputedShares, Result, Sale, SaleFilter, SaleStatus};

/// Replacement computed block for one sale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedUpdate {
    pub sale_id: String,
    pub computed: ComputedShares,
}

/// Trait for sale persistence and retrieval
///
/// Every method that touches more than one row must be atomic: either all
/// rows are written or none are.
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// Sales matching `filter`, ordered by creation time then id
    async fn list_sales(&self, filter: &SaleFilter) -> Result<Vec<Sale>>;

    /// Get a sale by ID
    async fn get_sale(&self, id: &str) -> Result<Option<Sale>>;

    /// Insert new sales in one transaction
    async fn insert_sales(&self, sales: Vec<Sale>) -> Result<usize>;

    /// Move a sale from `from` to `to`
    ///
    /// Fails with `InvalidTransition` if the stored status is no longer `from`.
    async fn update_status(&self, id: &str, from: SaleStatus, to: SaleStatus) -> Result<()>;

    /// Overwrite computed blocks in one transaction
    async fn apply_computed(&self, updates: Vec<ComputedUpdate>) -> Result<usize>;

    /// Flip approved sales to paid in one transaction
    ///
    /// Fails without writing if any listed sale is missing or not approved.
    async fn mark_paid(&self, sale_ids: &[String]) -> Result<usize>;
}
