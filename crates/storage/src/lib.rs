//! Storage Layer
//!
//! SQLite persistence behind a repository: sensor readings, alerts,
//! control actions and analysis snapshots.

mod repository;

pub use repository::{AlertFilter, ControlActionRecord, Repository, StorageCounts};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Query or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored JSON payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored timestamp or ID is not in the expected format
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}
