//! Progress errors.

use reefwarden_storage::StoreError;

/// Errors from gate checks, commits and provisioning.
///
/// Every variant is terminal for the single operation that raised it; none
/// are retried.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// No player is signed in
    #[error("no player signed in")]
    Inert,

    /// Remote read failed
    #[error("remote fetch failed at {path}: {source}")]
    Fetch {
        /// Path being read
        path: String,
        /// Store error
        #[source]
        source: StoreError,
    },

    /// Remote write failed
    #[error("remote write failed at {path}: {source}")]
    Write {
        /// Path being written
        path: String,
        /// Store error
        #[source]
        source: StoreError,
    },

    /// Stored value does not decode as a progress record
    #[error("malformed record at {path}: {source}")]
    Malformed {
        /// Path of the record
        path: String,
        /// Decode error
        #[source]
        source: serde_json::Error,
    },
}

/// Result alias for progress operations.
pub type Result<T> = std::result::Result<T, ProgressError>;
