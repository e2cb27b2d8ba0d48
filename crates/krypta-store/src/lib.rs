//! # Krypta object store
//!
//! Adapter for an S3-compatible object store (MinIO in production) holding
//! opaque blob objects, plus the cache-backed chunk-offset index used by
//! chunked uploads.
//!
//! Key layout inside the configured container:
//! - `blobs/<blobId>` — a finished blob
//! - `blobs/<blobId>.chunk.<offset>` — a pending chunk of an in-flight blob

pub mod chunk_index;
pub mod error;
pub mod object_store;

pub use chunk_index::ChunkIndex;
pub use error::StoreError;
pub use object_store::{ObjectStore, ObjectStoreConfig, Reader};

/// Object key for a finished blob.
pub fn blob_key(blob_id: &str) -> String {
    format!("blobs/{blob_id}")
}

/// Object key for a pending chunk of an in-flight blob.
pub fn chunk_key(blob_id: &str, offset: i64) -> String {
    format!("blobs/{blob_id}.chunk.{offset}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_key() {
        assert_eq!(blob_key("a1B2c3D4e5F6g7H8"), "blobs/a1B2c3D4e5F6g7H8");
    }

    #[test]
    fn test_chunk_key() {
        assert_eq!(
            chunk_key("a1B2c3D4e5F6g7H8", 4194304),
            "blobs/a1B2c3D4e5F6g7H8.chunk.4194304"
        );
    }
}
