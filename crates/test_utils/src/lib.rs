//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! coverage pricing test suite.
//!
//! # Modules
//!
//! - `fixtures`: Fixed dates, ids and amounts used across scenarios
//! - `builders`: Builder patterns for items, employees, conditions and stores
//! - `assertions`: Custom assertion helpers for pricing results
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
