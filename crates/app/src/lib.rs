//! # Fyxed App
//!
//! Application layer: command handlers, dependency wiring and the CLI.
//!
//! This crate contains:
//! - Command handlers (one per user-facing operation)
//! - Application context (dependency injection)
//! - Argument parsing for the `fyxed` binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - Every handler takes the context explicitly

pub mod cli;
pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
