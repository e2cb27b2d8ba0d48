//! Bucket endpoints

use crate::api::requests::{
    CreateBucketRequest, DestroyBucketRequest, RenameBucketRequest,
    SetBucketAuthorizationRequest, SetBucketMetaDataRequest,
};
use crate::api::responses::{
    BucketListResponse, CreateBucketResponse, EmptyResponse, SerializedBucket,
};
use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::Json;
use krypta_core::error::Error;
use krypta_core::model::{AuthData, BucketPermissionFlag, GlobalPermission};
use krypta_core::service::access::require_bucket_permission;
use krypta_core::service::require_global_permission;
use std::sync::Arc;

/// POST /api/bucket/create
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<CreateBucketRequest>,
) -> Result<Json<CreateBucketResponse>, ApiError> {
    require_global_permission(&auth.user, &[GlobalPermission::CreateBucket])?;
    let (bucket, root_directory_id) = state
        .buckets
        .create(
            &req.name,
            &req.crypt_spec,
            &req.crypt_data,
            req.meta_data,
            &auth.user_id,
        )
        .await?;
    Ok(Json(CreateBucketResponse {
        has_error: false,
        bucket_id: bucket.id,
        root_directory_id,
    }))
}

/// POST /api/bucket/list — buckets the caller has a permission row for.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
) -> Result<Json<BucketListResponse>, ApiError> {
    let overviews = state.buckets.list_for_user(&auth.user_id).await?;
    Ok(Json(BucketListResponse {
        has_error: false,
        bucket_list: overviews.into_iter().map(SerializedBucket::from).collect(),
    }))
}

/// POST /api/bucket/rename
pub async fn rename(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<RenameBucketRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::Modify],
    )
    .await?;
    state.buckets.rename(&req.bucket_id, &req.name).await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/bucket/set-metadata
pub async fn set_metadata(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<SetBucketMetaDataRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::Modify],
    )
    .await?;
    state
        .buckets
        .set_meta_data(&req.bucket_id, req.meta_data)
        .await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/bucket/set-authorization
pub async fn set_authorization(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<SetBucketAuthorizationRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::ManageAuthorization],
    )
    .await?;
    state
        .buckets
        .set_authorization(
            &req.bucket_id,
            &req.target_user_id,
            &req.permissions_to_set,
            &auth.user.user_name,
        )
        .await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/bucket/destroy — the request must repeat the bucket name as
/// confirmation. Stored blob objects are purged before the rows cascade.
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<DestroyBucketRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_bucket_permission(
        &state.buckets,
        &auth.user_id,
        &req.bucket_id,
        &[BucketPermissionFlag::Destroy],
    )
    .await?;

    let bucket = state
        .buckets
        .find_by_id(&req.bucket_id)
        .await?
        .ok_or_else(|| Error::user("BUCKET_NOT_FOUND", "The requested bucket could not be found."))?;
    if bucket.name != req.name {
        return Err(Error::user("BUCKET_NAME_MISMATCH", "The bucket name does not match.").into());
    }

    if let Err(err) = state.blobs.purge_bucket_objects(&req.bucket_id).await {
        tracing::warn!(bucket_id = %req.bucket_id, error = %err,
            "failed to purge blob objects during bucket destroy");
    }
    state.buckets.destroy(&req.bucket_id).await?;
    Ok(Json(EmptyResponse::ok()))
}
