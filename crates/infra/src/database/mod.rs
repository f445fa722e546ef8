//! Database implementations

mod columns;
pub mod manager;
pub mod sale_repository;
pub mod settings_repository;
pub mod user_repository;

pub use manager::*;
pub use sale_repository::*;
pub use settings_repository::*;
pub use user_repository::*;
