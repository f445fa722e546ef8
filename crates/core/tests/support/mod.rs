//! Shared test helpers for `fyxed-core` integration tests.
//!
//! In-memory repositories plus small fixture builders so the service tests
//! can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod fixtures;
pub mod repositories;
