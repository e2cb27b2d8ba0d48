//! Blob lifecycle
//!
//! A file has at most one current blob: the latest `finished` one. Every
//! successful write garbage-collects the rest synchronously. In-flight
//! (`started`) blobs that never finish are reaped implicitly when their
//! chunk index expires and a later write supersedes them.

use crate::error::{Error, Result};
use crate::ident;
use crate::model::{Blob, BlobStatus};
use crate::repo::BlobRepo;
use bytes::Bytes;
use chrono::Utc;
use futures::Stream;
use krypta_store::{blob_key, chunk_key, ChunkIndex, ObjectStore, Reader, StoreError};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct BlobService {
    blobs: BlobRepo,
    store: ObjectStore,
    chunks: ChunkIndex,
}

impl BlobService {
    pub fn new(blobs: BlobRepo, store: ObjectStore, chunks: ChunkIndex) -> Self {
        Self {
            blobs,
            store,
            chunks,
        }
    }

    /// Register a fresh in-flight blob for (bucket, file).
    pub async fn create_started(
        &self,
        bucket_id: &str,
        file_id: &str,
        crypto_meta_header_content: &str,
        created_by_user_id: &str,
    ) -> Result<Blob> {
        let now = Utc::now();
        let blob = Blob {
            id: ident::new_id(),
            bucket_id: bucket_id.to_owned(),
            file_id: file_id.to_owned(),
            crypto_meta_header_content: crypto_meta_header_content.to_owned(),
            status: BlobStatus::Started,
            started_at: now,
            finished_at: None,
            created_by_user_id: created_by_user_id.to_owned(),
            created_at: now,
            updated_at: now,
        };
        self.blobs.create(&blob).await?;
        Ok(blob)
    }

    /// The blob must exist under (bucket, file) and still be in-flight.
    pub async fn in_progress(&self, bucket_id: &str, file_id: &str, blob_id: &str) -> Result<Blob> {
        self.blobs
            .find_in_progress(bucket_id, file_id, blob_id)
            .await?
            .ok_or_else(|| {
                Error::user("BLOB_INVALID", "No in-progress blob found with the given ID")
            })
    }

    pub async fn mark_finished(&self, blob_id: &str) -> Result<()> {
        self.blobs.mark_finished(blob_id).await
    }

    pub async fn mark_erroneous(&self, blob_id: &str) -> Result<()> {
        self.blobs.mark_erroneous(blob_id).await
    }

    /// The file's current blob, failing with `BLOB_NOT_FOUND` when the
    /// file has no finished content.
    pub async fn latest_finished(&self, bucket_id: &str, file_id: &str) -> Result<Blob> {
        self.blobs
            .find_latest_finished(bucket_id, file_id)
            .await?
            .ok_or_else(|| Error::user("BLOB_NOT_FOUND", "No finished blob found for this file."))
    }

    /// Stream the full payload into the blob's object, returning the bytes
    /// written.
    pub async fn store_stream<S>(&self, blob_id: &str, body: S) -> Result<u64>
    where
        S: Stream<Item = std::result::Result<Bytes, StoreError>> + Send + Unpin,
    {
        Ok(self.store.put(&blob_key(blob_id), body).await?)
    }

    /// Stored size of the blob's object.
    pub async fn object_size(&self, blob_id: &str) -> Result<u64> {
        Ok(self.store.stat(&blob_key(blob_id)).await?)
    }

    /// Open the blob's object for streaming reads.
    pub async fn open_object(&self, blob_id: &str) -> Result<Reader> {
        Ok(self.store.get(&blob_key(blob_id)).await?)
    }

    /// Write one chunk object and record its offset, returning the bytes
    /// written by this call.
    pub async fn append_chunk<S>(&self, blob_id: &str, offset: i64, body: S) -> Result<u64>
    where
        S: Stream<Item = std::result::Result<Bytes, StoreError>> + Send + Unpin,
    {
        let written = self.store.put(&chunk_key(blob_id, offset), body).await?;
        self.chunks.append(blob_id, offset).await?;
        Ok(written)
    }

    /// Compose recorded chunks in ascending offset order into the final
    /// object, then drop the chunk objects and the offset index.
    pub async fn finalize_chunked(&self, blob_id: &str) -> Result<()> {
        let offsets = self.chunks.offsets(blob_id).await?;
        if offsets.is_empty() {
            return Err(Error::user(
                "BLOB_INVALID",
                "No chunks have been recorded for this blob",
            ));
        }

        let sources: Vec<String> = offsets
            .iter()
            .map(|offset| chunk_key(blob_id, *offset))
            .collect();
        self.store.compose(&sources, &blob_key(blob_id)).await?;

        for source in &sources {
            if let Err(err) = self.store.delete(source).await {
                warn!(key = %source, error = %err, "failed to remove composed chunk");
            }
        }
        self.chunks.clear(blob_id).await?;
        debug!(blob_id, chunk_count = offsets.len(), "chunked blob composed");
        Ok(())
    }

    /// Garbage-collect every blob of the file except `keep_blob_id`:
    /// object-store bytes first (missing objects are fine), then the rows.
    pub async fn collect_garbage(
        &self,
        bucket_id: &str,
        file_id: &str,
        keep_blob_id: &str,
    ) -> Result<()> {
        let stale = self
            .blobs
            .list_for_file_excluding(bucket_id, file_id, keep_blob_id)
            .await?;
        for blob in &stale {
            self.delete_object_best_effort(&blob.id).await;
        }
        self.blobs
            .delete_for_file_excluding(bucket_id, file_id, keep_blob_id)
            .await
    }

    /// Remove every blob of a file, bytes and rows, ahead of the file row
    /// itself being deleted.
    pub async fn purge_file(&self, bucket_id: &str, file_id: &str) -> Result<()> {
        let blobs = self.blobs.list_for_file(bucket_id, file_id).await?;
        for blob in &blobs {
            self.delete_object_best_effort(&blob.id).await;
        }
        self.blobs.delete_all_for_file(bucket_id, file_id).await
    }

    /// Best-effort removal of every stored object of a bucket's blobs,
    /// ahead of the bucket delete cascading through the rows.
    pub async fn purge_bucket_objects(&self, bucket_id: &str) -> Result<()> {
        let blobs = self.blobs.list_for_bucket(bucket_id).await?;
        for blob in &blobs {
            self.delete_object_best_effort(&blob.id).await;
        }
        Ok(())
    }

    async fn delete_object_best_effort(&self, blob_id: &str) {
        match self.store.delete(&blob_key(blob_id)).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {}
            Err(err) => {
                warn!(blob_id, error = %err, "failed to delete superseded blob object");
            }
        }
    }
}
