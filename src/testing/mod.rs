//! Testing utilities for kafka-wire
//!
//! Fixture schemas that exercise one engine behaviour each, shared by the
//! unit tests of the protocol modules. Only compiled when running tests.
//!
//! # Organization
//! - `fixtures.rs` - small MessageSchema instances and matching records

#![cfg(test)]

pub mod fixtures;

// Re-export commonly used items
pub use fixtures::{flexible_threshold_schema, gated_schema, nested_schema, tagged_schema};
