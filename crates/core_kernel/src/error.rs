//! Kernel error type

use thiserror::Error;
use crate::temporal::TemporalError;

/// Errors raised by kernel types and by engine settings
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// A setting is outside the range the engine supports
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }
}
