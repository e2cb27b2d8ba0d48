//! Cache-backed chunk-offset index
//!
//! Each in-flight chunked upload keeps the ordered list of chunk offsets in
//! the cache under `krypta:blob:chunks:<blobId>` as a JSON array. The entry
//! expires after 24 hours so abandoned uploads clean themselves up; clients
//! pausing a transfer have the same window to resume.

use crate::error::{Result, StoreError};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Index lifetime. Long enough for human-scale upload pauses, short enough
/// to reap abandoned uploads.
const INDEX_TTL_SECS: u64 = 24 * 60 * 60;

/// Tracks which chunk offsets have been written for an in-flight blob.
#[derive(Clone)]
pub struct ChunkIndex {
    redis: ConnectionManager,
}

fn index_key(blob_id: &str) -> String {
    format!("krypta:blob:chunks:{blob_id}")
}

impl ChunkIndex {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    /// Record a newly written chunk offset, refreshing the entry TTL.
    ///
    /// Read-modify-write: concurrent appends for the same blob are
    /// last-writer-wins, which is why clients must serialize chunk
    /// submissions for one blob.
    pub async fn append(&self, blob_id: &str, offset: i64) -> Result<()> {
        let mut con = self.redis.clone();
        let key = index_key(blob_id);
        let existing: Option<String> = con.get(&key).await?;
        let mut offsets: Vec<i64> = match existing {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| StoreError::ChunkIndexCorrupt {
                blob_id: blob_id.to_owned(),
                message: e.to_string(),
            })?,
            None => Vec::new(),
        };
        offsets.push(offset);
        let encoded = serde_json::to_string(&offsets).map_err(|e| StoreError::ChunkIndexCorrupt {
            blob_id: blob_id.to_owned(),
            message: e.to_string(),
        })?;
        let _: () = con.set_ex(&key, encoded, INDEX_TTL_SECS).await?;
        Ok(())
    }

    /// All recorded offsets for the blob, in ascending order.
    pub async fn offsets(&self, blob_id: &str) -> Result<Vec<i64>> {
        let mut con = self.redis.clone();
        let raw: Option<String> = con.get(index_key(blob_id)).await?;
        let mut offsets: Vec<i64> = match raw {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| StoreError::ChunkIndexCorrupt {
                blob_id: blob_id.to_owned(),
                message: e.to_string(),
            })?,
            None => Vec::new(),
        };
        offsets.sort_unstable();
        Ok(offsets)
    }

    /// Drop the index entry after a successful compose (or to abandon).
    pub async fn clear(&self, blob_id: &str) -> Result<()> {
        let mut con = self.redis.clone();
        let _: () = con.del(index_key(blob_id)).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ChunkIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkIndex").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_key_format() {
        assert_eq!(
            index_key("a1B2c3D4e5F6g7H8"),
            "krypta:blob:chunks:a1B2c3D4e5F6g7H8"
        );
    }
}
