//! S3-compatible object store client
//!
//! Blobs are opaque octet streams; uploads of unknown length are written
//! through the multipart upload API with a fixed-size part re-buffer so the
//! adapter holds at most one part in memory. The backing store has no native
//! multi-object compose, so [`ObjectStore::compose`] concatenates source
//! objects by streaming them into a fresh upload of the target key.

use crate::error::{Result, StoreError};
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

/// Part size for multipart uploads. S3 requires every part except the last
/// to be at least 5 MiB.
const PART_SIZE: usize = 8 * 1024 * 1024;

/// Connection settings for the object store.
#[derive(Clone, Debug)]
pub struct ObjectStoreConfig {
    /// Endpoint URL, e.g. `http://localhost:9000`
    pub endpoint: String,
    /// Access key id
    pub access_key: String,
    /// Secret access key
    pub secret_key: String,
    /// Container (bucket) holding every blob object
    pub container: String,
    /// Region name; S3-compatible endpoints accept any value
    pub region: String,
}

/// Handle to the blob object container.
#[derive(Clone)]
pub struct ObjectStore {
    client: Client,
    container: String,
}

/// A readable object: its size and its byte stream.
pub struct Reader {
    size: u64,
    body: ByteStream,
}

impl Reader {
    /// Object size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Consume the reader, yielding an `AsyncRead` over the object bytes.
    pub fn into_async_read(self) -> impl tokio::io::AsyncRead + Send + Unpin {
        self.body.into_async_read()
    }
}

impl ObjectStore {
    /// Connect to the object store endpoint.
    pub async fn connect(cfg: &ObjectStoreConfig) -> Result<Self> {
        let credentials =
            Credentials::new(cfg.access_key.clone(), cfg.secret_key.clone(), None, None, "static");
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;
        // Path-style addressing: MinIO does not resolve virtual-host buckets.
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(true)
            .build();
        Ok(Self {
            client: Client::from_conf(s3_config),
            container: cfg.container.clone(),
        })
    }

    /// Create the configured container if it does not exist yet.
    pub async fn ensure_container(&self) -> Result<()> {
        let head = self
            .client
            .head_bucket()
            .bucket(&self.container)
            .send()
            .await;
        match head {
            Ok(_) => Ok(()),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => {
                info!(container = %self.container, "creating object store container");
                self.client
                    .create_bucket()
                    .bucket(&self.container)
                    .send()
                    .await
                    .map_err(|e| StoreError::api("create_bucket", e))?;
                Ok(())
            }
            Err(err) => Err(StoreError::api("head_bucket", err)),
        }
    }

    /// Stream `body` into the object at `key`, returning the bytes written.
    ///
    /// Small payloads go through a single `PutObject`; anything larger than
    /// one part becomes a multipart upload. The upload is aborted if the
    /// inbound stream or any part upload fails, and also when the calling
    /// task is cancelled mid-transfer, so no orphaned parts accumulate.
    pub async fn put<S>(&self, key: &str, body: S) -> Result<u64>
    where
        S: Stream<Item = Result<Bytes>> + Send + Unpin,
    {
        let mut guard = AbortGuard::new(self.client.clone(), self.container.clone(), key);
        match self.put_inner(key, body, &mut guard).await {
            Ok(written) => Ok(written),
            Err(err) => {
                guard.abort_now().await;
                Err(err)
            }
        }
    }

    async fn put_inner<S>(&self, key: &str, mut body: S, guard: &mut AbortGuard) -> Result<u64>
    where
        S: Stream<Item = Result<Bytes>> + Send + Unpin,
    {
        let mut buffer = PartBuffer::new(PART_SIZE);
        let mut parts: Vec<CompletedPart> = Vec::new();
        let mut written: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            buffer.push(chunk);

            while let Some(part) = buffer.take_full_part() {
                let id = match guard.upload_id() {
                    Some(id) => id,
                    None => {
                        let id = self.begin_multipart(key).await?;
                        guard.arm(id)
                    }
                };
                let part_number = parts.len() as i32 + 1;
                parts.push(self.upload_part(key, &id, part_number, part).await?);
            }
        }

        let tail = buffer.finish();
        match guard.upload_id() {
            None => {
                // Everything fit in one part.
                self.client
                    .put_object()
                    .bucket(&self.container)
                    .key(key)
                    .content_type("application/octet-stream")
                    .body(ByteStream::from(tail))
                    .send()
                    .await
                    .map_err(|e| StoreError::api("put_object", e))?;
            }
            Some(id) => {
                if !tail.is_empty() {
                    let part_number = parts.len() as i32 + 1;
                    parts.push(self.upload_part(key, &id, part_number, tail).await?);
                }
                self.client
                    .complete_multipart_upload()
                    .bucket(&self.container)
                    .key(key)
                    .upload_id(&id)
                    .multipart_upload(
                        CompletedMultipartUpload::builder()
                            .set_parts(Some(parts))
                            .build(),
                    )
                    .send()
                    .await
                    .map_err(|e| StoreError::api("complete_multipart_upload", e))?;
                // A completed upload must not be aborted.
                guard.disarm();
            }
        }

        debug!(key, written, "object stored");
        Ok(written)
    }

    async fn begin_multipart(&self, key: &str) -> Result<String> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(&self.container)
            .key(key)
            .content_type("application/octet-stream")
            .send()
            .await
            .map_err(|e| StoreError::api("create_multipart_upload", e))?;
        created
            .upload_id()
            .map(str::to_owned)
            .ok_or_else(|| StoreError::api("create_multipart_upload", "missing upload id"))
    }

    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        data: Bytes,
    ) -> Result<CompletedPart> {
        let uploaded = self
            .client
            .upload_part()
            .bucket(&self.container)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StoreError::api("upload_part", e))?;
        Ok(CompletedPart::builder()
            .part_number(part_number)
            .set_e_tag(uploaded.e_tag().map(str::to_owned))
            .build())
    }

    /// Open the object at `key` for streaming reads.
    pub async fn get(&self, key: &str) -> Result<Reader> {
        let object = self
            .client
            .get_object()
            .bucket(&self.container)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                    StoreError::NotFound(key.to_owned())
                } else {
                    StoreError::api("get_object", err)
                }
            })?;
        Ok(Reader {
            size: object.content_length().unwrap_or(0).max(0) as u64,
            body: object.body,
        })
    }

    /// Size of the object at `key` in bytes.
    pub async fn stat(&self, key: &str) -> Result<u64> {
        let head = self
            .client
            .head_object()
            .bucket(&self.container)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if err.as_service_error().is_some_and(|e| e.is_not_found()) {
                    StoreError::NotFound(key.to_owned())
                } else {
                    StoreError::api("head_object", err)
                }
            })?;
        Ok(head.content_length().unwrap_or(0).max(0) as u64)
    }

    /// Delete the object at `key`. Deleting a missing object is a no-op.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.container)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::api("delete_object", e))?;
        Ok(())
    }

    /// Concatenate `sources` (in the given order) into the object at `dest`,
    /// returning the composed size in bytes.
    pub async fn compose(&self, sources: &[String], dest: &str) -> Result<u64> {
        let concatenated = Box::pin(async_stream::try_stream! {
            for key in sources {
                let reader = self.get(key).await?;
                let mut chunks = ReaderStream::new(reader.into_async_read());
                while let Some(chunk) = chunks.next().await {
                    let chunk = chunk.map_err(StoreError::stream)?;
                    yield chunk;
                }
            }
        });
        self.put(dest, concatenated).await
    }

    /// Total bytes held in the container, by walking the object listing.
    pub async fn total_usage(&self) -> Result<u64> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.container)
            .into_paginator()
            .send();
        let mut total: u64 = 0;
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| StoreError::api("list_objects", e))?;
            for object in page.contents() {
                total += object.size().unwrap_or(0).max(0) as u64;
            }
        }
        Ok(total)
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

/// Tracks an in-flight multipart upload and aborts it unless disarmed.
///
/// Covers both the error path (explicit [`AbortGuard::abort_now`]) and
/// task cancellation: when the request future is dropped mid-upload, the
/// `Drop` impl schedules the abort on the runtime.
struct AbortGuard {
    client: Client,
    container: String,
    key: String,
    upload_id: Option<String>,
}

impl AbortGuard {
    fn new(client: Client, container: String, key: &str) -> Self {
        Self {
            client,
            container,
            key: key.to_owned(),
            upload_id: None,
        }
    }

    fn upload_id(&self) -> Option<String> {
        self.upload_id.clone()
    }

    fn arm(&mut self, upload_id: String) -> String {
        self.upload_id = Some(upload_id.clone());
        upload_id
    }

    fn disarm(&mut self) {
        self.upload_id = None;
    }

    async fn abort_now(&mut self) {
        if let Some(id) = self.upload_id.take() {
            let _ = self
                .client
                .abort_multipart_upload()
                .bucket(&self.container)
                .key(&self.key)
                .upload_id(id)
                .send()
                .await;
        }
    }
}

impl Drop for AbortGuard {
    fn drop(&mut self) {
        if let Some(id) = self.upload_id.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                let client = self.client.clone();
                let container = self.container.clone();
                let key = self.key.clone();
                handle.spawn(async move {
                    let _ = client
                        .abort_multipart_upload()
                        .bucket(container)
                        .key(key)
                        .upload_id(id)
                        .send()
                        .await;
                });
            }
        }
    }
}

/// Accumulates stream chunks and hands out full upload parts.
struct PartBuffer {
    target: usize,
    buf: BytesMut,
}

impl PartBuffer {
    fn new(target: usize) -> Self {
        Self {
            target,
            buf: BytesMut::new(),
        }
    }

    fn push(&mut self, chunk: Bytes) {
        self.buf.extend_from_slice(&chunk);
    }

    /// Take one full part off the front, if enough bytes accumulated.
    fn take_full_part(&mut self) -> Option<Bytes> {
        if self.buf.len() >= self.target {
            Some(self.buf.split_to(self.target).freeze())
        } else {
            None
        }
    }

    /// Remaining bytes after the stream ends.
    fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_buffer_holds_until_full() {
        let mut buffer = PartBuffer::new(8);
        buffer.push(Bytes::from_static(b"abc"));
        assert!(buffer.take_full_part().is_none());
        buffer.push(Bytes::from_static(b"defgh"));
        let part = buffer.take_full_part().unwrap();
        assert_eq!(&part[..], b"abcdefgh");
        assert!(buffer.finish().is_empty());
    }

    #[test]
    fn test_part_buffer_splits_multiple_parts() {
        let mut buffer = PartBuffer::new(4);
        buffer.push(Bytes::from(vec![7u8; 11]));
        assert_eq!(buffer.take_full_part().unwrap().len(), 4);
        assert_eq!(buffer.take_full_part().unwrap().len(), 4);
        assert!(buffer.take_full_part().is_none());
        assert_eq!(buffer.finish().len(), 3);
    }

    #[test]
    fn test_part_buffer_tail_preserves_order() {
        let mut buffer = PartBuffer::new(4);
        buffer.push(Bytes::from_static(b"0123"));
        buffer.push(Bytes::from_static(b"45"));
        assert_eq!(&buffer.take_full_part().unwrap()[..], b"0123");
        assert_eq!(&buffer.finish()[..], b"45");
    }
}
