//! Modular common utilities shared across Fyxed crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error classification shared by every layer
//! - `observability`: optional tracing instrumentation
//! - `platform`: SQLite storage (r2d2 pool, pragmas, transactions)
//! - `test-utils`: temporary directories for integration tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod storage;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{ErrorClassification, ErrorSeverity};
