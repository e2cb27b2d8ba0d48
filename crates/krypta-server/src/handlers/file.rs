//! File endpoints

use crate::api::requests::{
    CreateFileRequest, DeleteFileRequest, GetFileRequest, MoveFileRequest, RenameFileRequest,
    SetFileEncryptedMetaDataRequest, SetFileMetaDataRequest,
};
use crate::api::responses::{
    CreateFileResponse, EmptyResponse, GetFileResponse, SerializedFile,
};
use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::Json;
use krypta_core::error::Error;
use krypta_core::model::{AuthData, BucketPermissionFlag};
use krypta_core::service::access::require_bucket_permission;
use krypta_core::service::{ensure_directory_in_bucket, ensure_file_in_bucket};
use std::sync::Arc;

/// POST /api/file/create
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<CreateFileRequest>,
) -> Result<Json<CreateFileResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ManageContent],
    )
    .await?;
    ensure_directory_in_bucket(&state.directories, &req.bucket_id, &req.parent_directory_id)
        .await?;

    let file_id = state
        .files
        .create(
            &req.name,
            &req.bucket_id,
            &req.parent_directory_id,
            req.meta_data,
            &req.encrypted_meta_data,
            &auth.user_id,
        )
        .await?;
    Ok(Json(CreateFileResponse {
        has_error: false,
        file_id,
    }))
}

/// POST /api/file/get
pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<GetFileRequest>,
) -> Result<Json<GetFileResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ViewContent],
    )
    .await?;
    let file = state
        .files
        .find_by_id(&req.bucket_id, &req.file_id)
        .await?
        .ok_or_else(|| {
            Error::user(
                "FILE_NOT_IN_BUCKET",
                "The requested file could not be found in this bucket.",
            )
        })?;
    Ok(Json(GetFileResponse {
        has_error: false,
        file: SerializedFile::from(file),
    }))
}

/// POST /api/file/rename
pub async fn rename(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<RenameFileRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ManageContent],
    )
    .await?;
    ensure_file_in_bucket(&state.files, &req.bucket_id, &req.file_id).await?;
    state
        .files
        .rename(&req.bucket_id, &req.file_id, &req.name)
        .await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/file/move
pub async fn move_(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<MoveFileRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ManageContent],
    )
    .await?;
    ensure_file_in_bucket(&state.files, &req.bucket_id, &req.file_id).await?;
    ensure_directory_in_bucket(&state.directories, &req.bucket_id, &req.new_parent_directory_id)
        .await?;
    state
        .files
        .rebind_parent(
            &req.bucket_id,
            &req.file_id,
            &req.new_parent_directory_id,
            &req.new_name,
        )
        .await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/file/delete — stored blob objects and rows are removed before
/// the file row itself.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<DeleteFileRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ManageContent],
    )
    .await?;
    ensure_file_in_bucket(&state.files, &req.bucket_id, &req.file_id).await?;
    state.blobs.purge_file(&req.bucket_id, &req.file_id).await?;
    state.files.delete(&req.bucket_id, &req.file_id).await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/file/set-metadata
pub async fn set_metadata(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<SetFileMetaDataRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ManageContent],
    )
    .await?;
    ensure_file_in_bucket(&state.files, &req.bucket_id, &req.file_id).await?;
    state
        .files
        .set_meta_data(&req.bucket_id, &req.file_id, req.meta_data)
        .await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/file/set-encrypted-metadata
pub async fn set_encrypted_metadata(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<SetFileEncryptedMetaDataRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ManageContent],
    )
    .await?;
    ensure_file_in_bucket(&state.files, &req.bucket_id, &req.file_id).await?;
    state
        .files
        .set_encrypted_meta_data(&req.bucket_id, &req.file_id, &req.encrypted_meta_data)
        .await?;
    Ok(Json(EmptyResponse::ok()))
}
