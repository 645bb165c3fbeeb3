//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Version-store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unknown exploration id, or a version beyond the stored history.
    #[error("Exploration {exploration_id}{} not found", version_suffix(.version))]
    NotFound {
        exploration_id: String,
        version: Option<u32>,
    },

    /// An exploration with this id already exists.
    #[error("Exploration {exploration_id} already exists")]
    AlreadyExists { exploration_id: String },

    /// Appended snapshot does not carry the next contiguous version.
    #[error("Snapshot carries version {found}, expected {expected}")]
    NonContiguousVersion { expected: u32, found: u32 },

    /// Revert target outside `[1, current_version - 1]`.
    #[error("Cannot revert to version {version}")]
    CannotRevert { version: i64 },

    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not a store file, or a corrupt one.
    #[error("Invalid store file: {path}")]
    InvalidFormat { path: PathBuf, reason: String },

    /// Store file written by a newer schema.
    #[error("Store file version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion { found: u32, max_supported: u32 },

    /// Serialization failed while writing the store file.
    #[error("Failed to serialize store contents")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },
}

fn version_suffix(version: &Option<u32>) -> String {
    match version {
        Some(version) => format!(" version {version}"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
