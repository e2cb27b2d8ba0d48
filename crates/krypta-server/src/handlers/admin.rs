//! Admin IAM endpoints

use crate::api::requests::{
    AddUserRequest, OverwriteUserPasswordRequest, SetBanningStatusRequest,
    SetGlobalPermissionsRequest,
};
use crate::api::responses::{AddUserResponse, EmptyResponse};
use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::Json;
use krypta_core::model::{AuthData, GlobalPermission};
use krypta_core::service::require_global_permission;
use std::sync::Arc;

/// POST /api/admin/iam/add-user
pub async fn add_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<AddUserRequest>,
) -> Result<Json<AddUserResponse>, ApiError> {
    require_global_permission(&auth.user, &[GlobalPermission::CreateUser])?;
    let user_id = state
        .admin
        .add_user(&req.display_name, &req.user_name, &req.password)
        .await?;
    Ok(Json(AddUserResponse {
        has_error: false,
        user_id,
    }))
}

/// POST /api/admin/iam/set-global-permissions
pub async fn set_global_permissions(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<SetGlobalPermissionsRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_global_permission(&auth.user, &[GlobalPermission::ManageAllUser])?;
    state
        .admin
        .set_global_permissions(&req.user_id, &req.global_permissions)
        .await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/admin/iam/set-banning-status
pub async fn set_banning_status(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<SetBanningStatusRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_global_permission(&auth.user, &[GlobalPermission::ManageAllUser])?;
    state
        .admin
        .set_banning_status(&req.user_id, req.is_banned)
        .await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/admin/iam/overwrite-user-password
pub async fn overwrite_user_password(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<OverwriteUserPasswordRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_global_permission(&auth.user, &[GlobalPermission::ManageAllUser])?;
    state
        .admin
        .overwrite_user_password(&req.user_id, &req.new_password)
        .await?;
    Ok(Json(EmptyResponse::ok()))
}
