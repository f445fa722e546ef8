//! Testing utilities shared by the Fyxed crates
//!
//! - **[`temp`]**: self-cleaning scratch directories for database and config
//!   files

pub mod temp;

pub use temp::TempDir;
