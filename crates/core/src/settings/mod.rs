//! Admin commission settings

pub mod ports;
pub mod service;

pub use service::SettingsService;
