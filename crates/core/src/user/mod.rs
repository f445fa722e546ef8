//! User persistence boundary

pub mod ports;
