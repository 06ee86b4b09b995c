//! CLI error handling

use std::path::PathBuf;

use thiserror::Error;

use domain_pricing::PricingError;
use infra_store::StoreError;

/// Errors surfaced while handling a pricing request
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read request {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed request: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),
}

impl CliError {
    /// Process exit code for the error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Io { .. } | CliError::Store(_) => 3,
            CliError::Parse(_) | CliError::Validation(_) => 2,
            CliError::Pricing(_) => 4,
        }
    }
}
