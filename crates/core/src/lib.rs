//! Shared domain types for the door-access administration console.
//!
//! This crate has no internal dependencies so the REST client, the
//! binding session and the console views can all build on it.

pub mod batch;
pub mod error;
pub mod models;
pub mod search;
pub mod types;
pub mod validation;
