//! Error types for the object store adapter

use thiserror::Error;

/// Result type alias using `StoreError`
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while talking to the object store or the
/// chunk-offset index.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Object does not exist
    #[error("object not found: {0}")]
    NotFound(String),

    /// An object store API call failed
    #[error("object store {operation} failed: {message}")]
    Api { operation: &'static str, message: String },

    /// Reading the inbound byte stream failed
    #[error("upload stream failed: {0}")]
    Stream(String),

    /// Chunk-offset index operation failed
    #[error("chunk index error: {0}")]
    ChunkIndex(#[from] redis::RedisError),

    /// Chunk-offset index contents could not be decoded
    #[error("chunk index corrupt for blob {blob_id}: {message}")]
    ChunkIndexCorrupt { blob_id: String, message: String },
}

impl StoreError {
    /// Wrap an SDK error for the named operation.
    pub fn api(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Api {
            operation,
            message: err.to_string(),
        }
    }

    /// Wrap a failure of the caller-supplied byte stream.
    pub fn stream(err: impl std::fmt::Display) -> Self {
        Self::Stream(err.to_string())
    }

    /// Whether this error means the object simply was not there.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
