//! Defines the custom error type for the `core` module.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Errors that belong to a single item (one metadata lookup, one deleted path)
/// are absorbed by the caller and recorded; the remaining variants abort the
/// operation that produced them and are surfaced to the user.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The scan root is missing or unreadable. No partial entries are returned.
    #[error("Scan failed for {path}: {reason}")]
    Scan { path: PathBuf, reason: String },

    /// A folder could not be described. Recorded as a negative cache entry.
    #[error("No metadata for {path}: {reason}")]
    Metadata { path: PathBuf, reason: String },

    /// The total size of a deletion target could not be computed.
    #[error("Could not calculate size of {path}: {reason}")]
    SizeCalc { path: PathBuf, reason: String },

    /// A single path could not be deleted.
    #[error("Failed to delete {path}: {reason}")]
    DeleteItem { path: PathBuf, reason: String },

    /// An item could not be copied into the backup folder.
    #[error("Backup of {path} failed: {reason}")]
    Backup { path: PathBuf, reason: String },

    /// The platform refused to open a path or URL.
    #[error("Failed to open {target}: {reason}")]
    ExternalOpen { target: String, reason: String },

    /// A catalog identifier that cannot be turned into a URL.
    #[error("Invalid catalog id: {0:?}")]
    InvalidCatalogId(String),

    /// Represents an error that occurred when a Tokio task was joined.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl CoreError {
    pub fn scan(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CoreError::Scan {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn metadata(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CoreError::Metadata {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn size_calc(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CoreError::SizeCalc {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn backup(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CoreError::Backup {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
