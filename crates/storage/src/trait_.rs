//! Remote store trait abstraction.

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Error type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Path is empty or has empty segments
    #[error("Invalid path: '{0}'")]
    InvalidPath(String),

    /// A path segment runs through a non-object value
    #[error("Not a container at '{0}'")]
    NotAContainer(String),

    /// Backend refused or could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Hierarchical key/value store addressed by slash-separated paths.
///
/// Every call is an independent round trip: there are no transactions and
/// no ordering guarantee between two calls in flight at the same time.
/// Implementations use interior mutability so one handle can be shared by
/// concurrently running tasks.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read the value at `path`. `None` if nothing is stored there.
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Replace the value at `path`, creating parents as needed.
    /// Writing `null` removes the node.
    async fn set(&self, path: &str, value: Value) -> Result<()>;

    /// Shallow-merge `fields` into the object at `path`.
    /// A `null` field removes that key; nested objects replace, not merge.
    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<()>;
}
