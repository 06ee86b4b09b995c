//! Store error types
//!
//! Errors raised while loading or validating a pricing snapshot.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building a store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Snapshot file could not be read
    #[error("Failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot document is not valid JSON for the expected shape
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Two records of the same kind share an id
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// A record refers to an entity missing from the snapshot
    #[error("Dangling reference: {0}")]
    DanglingReference(String),
}

impl StoreError {
    /// Creates a duplicate entry error
    ///
    /// # Arguments
    ///
    /// * `entity` - The type of entity
    /// * `id` - The duplicated identifier
    pub fn duplicate(entity: &str, id: impl std::fmt::Display) -> Self {
        StoreError::DuplicateEntry(format!("{} with id '{}' appears more than once", entity, id))
    }

    /// Creates a dangling reference error
    pub fn dangling(entity: &str, id: impl std::fmt::Display, missing: impl std::fmt::Display) -> Self {
        StoreError::DanglingReference(format!("{} '{}' refers to unknown {}", entity, id, missing))
    }

    /// Returns true if the snapshot content, rather than its source, is at fault
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, StoreError::DuplicateEntry(_) | StoreError::DanglingReference(_))
    }
}
