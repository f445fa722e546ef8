//! Port interfaces for user storage
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations for user operations.

use async_trait::async_trait;
use fyxed_domain::{Result, User};

/// Trait for user persistence and retrieval
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users in insertion order
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Get a user by ID
    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    /// Insert or replace users in one transaction, returning the count written
    async fn upsert_users(&self, users: Vec<User>) -> Result<usize>;
}
