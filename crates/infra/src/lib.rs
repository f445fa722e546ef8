//! # Fyxed Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repositories for users, sales and commission settings
//! - Configuration loading from the environment or config files
//!
//! ## Architecture
//! - Implements traits defined in `fyxed-core`
//! - Uses the pooled storage layer from `fyxed-common`
//! - Contains all "impure" code (database and file I/O)

pub mod config;
pub mod database;
pub mod errors;

// Re-export commonly used items
pub use database::*;
pub use errors::InfraError;
