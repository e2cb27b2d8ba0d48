//! Directory endpoints

use crate::api::requests::{
    CreateDirectoryRequest, DeleteDirectoryRequest, GetDirectoryRequest, MoveDirectoryRequest,
    RenameDirectoryRequest, SetDirectoryEncryptedMetaDataRequest, SetDirectoryMetaDataRequest,
};
use crate::api::responses::{
    CreateDirectoryResponse, EmptyResponse, GetDirectoryResponse, SerializedDirectory,
    SerializedFile,
};
use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::Json;
use krypta_core::model::{AuthData, BucketPermissionFlag};
use krypta_core::service::access::require_bucket_permission;
use krypta_core::service::ensure_directory_in_bucket;
use std::sync::Arc;

/// POST /api/directory/create
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<CreateDirectoryRequest>,
) -> Result<Json<CreateDirectoryResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ManageContent],
    )
    .await?;
    ensure_directory_in_bucket(&state.directories, &req.bucket_id, &req.parent_directory_id)
        .await?;

    let directory_id = state
        .directories
        .create(
            &req.name,
            &req.bucket_id,
            &req.parent_directory_id,
            req.meta_data,
            &req.encrypted_meta_data,
            &auth.user_id,
        )
        .await?;
    Ok(Json(CreateDirectoryResponse {
        has_error: false,
        directory_id,
    }))
}

/// POST /api/directory/get — the directory plus its immediate children.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<GetDirectoryRequest>,
) -> Result<Json<GetDirectoryResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ViewContent],
    )
    .await?;

    let (directory, child_directories, child_files) = state
        .directories
        .contents(&req.bucket_id, &req.directory_id)
        .await?;
    Ok(Json(GetDirectoryResponse {
        has_error: false,
        directory: SerializedDirectory::from(directory),
        child_directory_list: child_directories
            .into_iter()
            .map(SerializedDirectory::from)
            .collect(),
        child_file_list: child_files.into_iter().map(SerializedFile::from).collect(),
    }))
}

/// POST /api/directory/rename
pub async fn rename(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<RenameDirectoryRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ManageContent],
    )
    .await?;
    ensure_directory_in_bucket(&state.directories, &req.bucket_id, &req.directory_id).await?;
    state
        .directories
        .rename(&req.bucket_id, &req.directory_id, &req.name)
        .await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/directory/move — refused when the target parent is the moved
/// directory itself or any of its descendants.
pub async fn move_(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<MoveDirectoryRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ManageContent],
    )
    .await?;
    ensure_directory_in_bucket(&state.directories, &req.bucket_id, &req.directory_id).await?;
    ensure_directory_in_bucket(&state.directories, &req.bucket_id, &req.new_parent_directory_id)
        .await?;
    state
        .directories
        .rebind_parent(
            &req.bucket_id,
            &req.directory_id,
            &req.new_parent_directory_id,
            &req.new_name,
        )
        .await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/directory/delete — cascades to everything underneath.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<DeleteDirectoryRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ManageContent],
    )
    .await?;
    ensure_directory_in_bucket(&state.directories, &req.bucket_id, &req.directory_id).await?;
    state
        .directories
        .delete(&req.bucket_id, &req.directory_id)
        .await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/directory/set-metadata
pub async fn set_metadata(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<SetDirectoryMetaDataRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ManageContent],
    )
    .await?;
    ensure_directory_in_bucket(&state.directories, &req.bucket_id, &req.directory_id).await?;
    state
        .directories
        .set_meta_data(&req.bucket_id, &req.directory_id, req.meta_data)
        .await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/directory/set-encrypted-metadata
pub async fn set_encrypted_metadata(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<SetDirectoryEncryptedMetaDataRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ManageContent],
    )
    .await?;
    ensure_directory_in_bucket(&state.directories, &req.bucket_id, &req.directory_id).await?;
    state
        .directories
        .set_encrypted_meta_data(&req.bucket_id, &req.directory_id, &req.encrypted_meta_data)
        .await?;
    Ok(Json(EmptyResponse::ok()))
}
