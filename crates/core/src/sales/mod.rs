//! Sale persistence boundary

pub mod ports;
