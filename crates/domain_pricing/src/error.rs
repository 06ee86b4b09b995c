//! Pricing domain errors
//!
//! Calculations themselves never fail: every outcome is a `PricingResult`.
//! These errors cover unusable configuration (reported through the kernel's
//! `CoreError`) and lookups a caller asked the engine to perform.

use thiserror::Error;

use core_kernel::{CoreError, EmployeeId, ItemId};

/// Errors that can occur in the pricing domain
#[derive(Debug, Error)]
pub enum PricingError {
    /// Employee could not be resolved from the store
    #[error("Employee not found: {0}")]
    EmployeeNotFound(EmployeeId),

    /// Item could not be resolved from the store
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Error bubbled up from the kernel
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}
