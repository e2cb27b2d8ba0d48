//! Blob streaming endpoints
//!
//! These bypass the JSON envelope on the payload side: write accepts a raw
//! octet stream, read emits one. The per-blob `nk-crypto-meta` header is
//! stored verbatim on write and replayed bit-exact on read.

use crate::api::responses::{WriteBlobResponse, WriteQuantizedResponse};
use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Extension, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use futures::TryStreamExt;
use krypta_core::error::Error;
use krypta_core::ident;
use krypta_core::model::{AuthData, BucketPermissionFlag};
use krypta_core::service::access::require_bucket_permission;
use krypta_store::StoreError;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

const CRYPTO_META_HEADER: &str = "nk-crypto-meta";

fn require_path_ids(ids: &[&str]) -> Result<(), ApiError> {
    if ids.iter().all(|id| ident::is_valid_id(id)) {
        Ok(())
    } else {
        Err(Error::user("INVALID_PATH_PARAMS", "Invalid bucket or file ID").into())
    }
}

async fn require_file(state: &AppState, bucket_id: &str, file_id: &str) -> Result<(), ApiError> {
    if state.files.find_by_id(bucket_id, file_id).await?.is_none() {
        return Err(Error::user(
            "FILE_NOT_IN_BUCKET",
            "The requested file could not be found in this bucket.",
        )
        .into());
    }
    Ok(())
}

fn crypto_meta(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CRYPTO_META_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// POST /api/blob/read/{bucketId}/{fileId} — stream out the file's current
/// blob.
pub async fn read(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    Path((bucket_id, file_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    require_path_ids(&[&bucket_id, &file_id])?;
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &bucket_id,
        &[BucketPermissionFlag::ViewContent],
    )
    .await?;
    require_file(&state, &bucket_id, &file_id).await?;

    let blob = state.blobs.latest_finished(&bucket_id, &file_id).await?;
    let reader = state.blobs.open_object(&blob.id).await?;
    let size = reader.size();
    let body = Body::from_stream(ReaderStream::new(reader.into_async_read()));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(CRYPTO_META_HEADER, blob.crypto_meta_header_content.as_str())
        .header("Access-Control-Expose-Headers", CRYPTO_META_HEADER)
        .body(body)
        .map_err(|e| Error::developer("RESPONSE_BUILD_FAILED", e.to_string()).into())
}

/// POST /api/blob/write/{bucketId}/{fileId} — single-shot upload: stream
/// the body into a fresh blob, make it current, collect the garbage.
pub async fn write(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    Path((bucket_id, file_id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<WriteBlobResponse>, ApiError> {
    require_path_ids(&[&bucket_id, &file_id])?;
    let crypto_meta = crypto_meta(&headers)
        .ok_or_else(|| Error::user("MISSING_CRYPTO_META", "Missing nk-crypto-meta header"))?;
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &bucket_id,
        &[BucketPermissionFlag::ManageContent],
    )
    .await?;
    require_file(&state, &bucket_id, &file_id).await?;

    let blob = state
        .blobs
        .create_started(&bucket_id, &file_id, &crypto_meta, &auth.user_id)
        .await?;

    let stream = body.into_data_stream().map_err(StoreError::stream);
    if let Err(err) = state.blobs.store_stream(&blob.id, stream).await {
        let _ = state.blobs.mark_erroneous(&blob.id).await;
        return Err(err.into());
    }

    let size = match state.blobs.object_size(&blob.id).await {
        Ok(size) => size,
        Err(err) => {
            let _ = state.blobs.mark_erroneous(&blob.id).await;
            return Err(err.into());
        }
    };

    state.blobs.mark_finished(&blob.id).await?;
    state
        .files
        .update_size(&bucket_id, &file_id, size as i64)
        .await?;
    state
        .files
        .touch_content_updated_at(&bucket_id, &file_id)
        .await?;

    if let Err(err) = state.blobs.collect_garbage(&bucket_id, &file_id, &blob.id).await {
        tracing::warn!(blob_id = %blob.id, error = %err,
            "failed to garbage-collect superseded blobs");
    }

    Ok(Json(WriteBlobResponse::from_blob(&blob)))
}

/// POST /api/blob/write-quantized/{bucketId}/{fileId}/{blobId|null}/{offset}/{shouldEnd}
///
/// Chunked upload. The first call passes `null` (or empty) as blobId and
/// must carry the `nk-crypto-meta` header; later calls address the same
/// in-flight blob. `shouldEnd=true` composes the chunks in ascending
/// offset order, makes the blob current, and collects the garbage.
pub async fn write_quantized(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    Path((bucket_id, file_id, blob_id_param, offset_param, should_end_param)): Path<(
        String,
        String,
        String,
        String,
        String,
    )>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<WriteQuantizedResponse>, ApiError> {
    require_path_ids(&[&bucket_id, &file_id])?;

    let offset: i64 = offset_param
        .parse()
        .ok()
        .filter(|offset| *offset >= 0)
        .ok_or_else(|| Error::user("INVALID_PATH_PARAMS", "Invalid offset parameter"))?;
    let should_end = should_end_param == "true";

    let starts_new_blob = blob_id_param == "null" || blob_id_param.is_empty();
    if !starts_new_blob && !ident::is_valid_id(&blob_id_param) {
        return Err(Error::user("INVALID_PATH_PARAMS", "Invalid blob ID").into());
    }

    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &bucket_id,
        &[BucketPermissionFlag::ManageContent],
    )
    .await?;
    require_file(&state, &bucket_id, &file_id).await?;

    let blob_id = if starts_new_blob {
        let crypto_meta = crypto_meta(&headers)
            .ok_or_else(|| Error::user("MISSING_CRYPTO_META", "Missing nk-crypto-meta header"))?;
        state
            .blobs
            .create_started(&bucket_id, &file_id, &crypto_meta, &auth.user_id)
            .await?
            .id
    } else {
        state
            .blobs
            .in_progress(&bucket_id, &file_id, &blob_id_param)
            .await?
            .id
    };

    let stream = body.into_data_stream().map_err(StoreError::stream);
    let bytes_written = state.blobs.append_chunk(&blob_id, offset, stream).await?;

    if should_end {
        state.blobs.finalize_chunked(&blob_id).await?;
        state.blobs.mark_finished(&blob_id).await?;

        match state.blobs.object_size(&blob_id).await {
            Ok(size) => {
                state
                    .files
                    .update_size(&bucket_id, &file_id, size as i64)
                    .await?;
                state
                    .files
                    .touch_content_updated_at(&bucket_id, &file_id)
                    .await?;
            }
            Err(err) => {
                tracing::warn!(blob_id = %blob_id, error = %err,
                    "failed to stat composed blob for file size update");
            }
        }

        if let Err(err) = state.blobs.collect_garbage(&bucket_id, &file_id, &blob_id).await {
            tracing::warn!(blob_id = %blob_id, error = %err,
                "failed to garbage-collect superseded blobs");
        }
    }

    Ok(Json(WriteQuantizedResponse {
        has_error: false,
        blob_id,
        bytes_transferred: bytes_written,
    }))
}
