//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Fyxed
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum FyxedError {
    /// Sale amounts must be strictly positive (minor units)
    #[error("Invalid amount: {0} (must be greater than zero)")]
    InvalidAmount(i64),

    /// A total no longer fits in `i64` minor units
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    #[error("Rate configuration error: {0}")]
    RateConfiguration(String),

    #[error("Dangling reference: {entity} '{id}' references missing user '{reference}'")]
    DanglingReference { entity: String, id: String, reference: String },

    #[error("Sponsor cycle detected at user '{0}'")]
    SponsorCycle(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FyxedError {
    /// Dangling reference from a user record to a missing sponsor
    pub fn dangling_sponsor(user_id: impl Into<String>, sponsor_id: impl Into<String>) -> Self {
        Self::DanglingReference {
            entity: "user".to_string(),
            id: user_id.into(),
            reference: sponsor_id.into(),
        }
    }

    /// Stable, low-cardinality label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "invalid_amount",
            Self::AmountOverflow(_) => "amount_overflow",
            Self::RateConfiguration(_) => "rate_configuration",
            Self::DanglingReference { .. } => "dangling_reference",
            Self::SponsorCycle(_) => "sponsor_cycle",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for FyxedError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(format!("malformed JSON: {err}"))
    }
}

/// Result type alias for Fyxed operations
pub type Result<T> = std::result::Result<T, FyxedError>;
