//! User endpoints: login, session management, profile

use crate::api::requests::{
    FindUserRequest, LoginRequest, LogoutAllSessionsRequest, LogoutRequest, UpdatePasswordRequest,
    UpdateProfileRequest,
};
use crate::api::responses::{
    EmptyResponse, FindUserResponse, LoginResponse, SerializedUser, SessionListResponse,
    SessionRef, UserListResponse, UserSummary,
};
use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::Json;
use krypta_core::error::Error;
use krypta_core::model::AuthData;
use krypta_core::password;
use std::sync::Arc;

/// POST /api/user/login (public)
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .users
        .find_by_user_name(&req.user_name)
        .await?
        .ok_or_else(|| Error::user("USER_NOT_FOUND", "User not found"))?;
    if user.is_banned {
        return Err(Error::user("USER_BANNED", "User is banned").into());
    }

    let valid = password::verify_password_off_thread(
        req.password,
        user.password_hash.clone(),
        user.password_salt.clone(),
        state.argon2.clone(),
    )
    .await?;
    if !valid {
        return Err(Error::user("PASSWORD_INVALID", "Invalid password").into());
    }

    let (session, api_key) = state.sessions.issue(&user).await?;

    Ok(Json(LoginResponse {
        has_error: false,
        api_key,
        user: SerializedUser::from_user(&user, true),
        session: SessionRef { id: session.id },
    }))
}

/// POST /api/user/assert — echo the authenticated identity.
pub async fn assert(
    Extension(auth): Extension<AuthData>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(LoginResponse {
        has_error: false,
        api_key: auth.api_key.clone(),
        user: SerializedUser::from_user(&auth.user, true),
        session: SessionRef {
            id: auth.session_id,
        },
    }))
}

/// POST /api/user/logout — expire the current session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<LogoutRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    state
        .sessions
        .expire(&auth.session_id, &auth.api_key, &auth.user_id, &req.message)
        .await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/user/logout-all-sessions
pub async fn logout_all_sessions(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<LogoutAllSessionsRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    state.sessions.expire_all(&auth.user_id, &req.message).await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/user/list-all-sessions — latest 20 audit rows.
pub async fn list_all_sessions(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let sessions = state.sessions.list(&auth.user_id, &auth.session_id).await?;
    Ok(Json(SessionListResponse {
        has_error: false,
        session_list: sessions.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/user/list — every account, minimal fields.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(_auth): Extension<AuthData>,
) -> Result<Json<UserListResponse>, ApiError> {
    let users = state.users.list_all().await?;
    Ok(Json(UserListResponse {
        has_error: false,
        user_list: users.into_iter().map(UserSummary::from).collect(),
    }))
}

/// POST /api/user/find — filter by userId and/or userName.
pub async fn find(
    State(state): State<Arc<AppState>>,
    Extension(_auth): Extension<AuthData>,
    ValidJson(req): ValidJson<FindUserRequest>,
) -> Result<Json<FindUserResponse>, ApiError> {
    let mut ids = Vec::new();
    let mut names = Vec::new();
    for filter in &req.filters {
        match filter.by.as_str() {
            "userId" => {
                if let Some(id) = filter.user_id.as_ref().filter(|id| !id.is_empty()) {
                    ids.push(id.clone());
                }
            }
            "userName" => {
                if let Some(name) = filter.user_name.as_ref().filter(|name| !name.is_empty()) {
                    names.push(name.clone());
                }
            }
            _ => {}
        }
    }

    let users = state.users.query(&ids, &names).await?;
    Ok(Json(FindUserResponse {
        has_error: false,
        user_list: users
            .iter()
            .map(|user| SerializedUser::from_user(user, req.include_global_permissions))
            .collect(),
    }))
}

/// POST /api/user/update-profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    state
        .users
        .update_display_name(&auth.user_id, &req.display_name)
        .await?;
    Ok(Json(EmptyResponse::ok()))
}

/// POST /api/user/update-password — requires the current password and
/// force-expires every session of the user on success.
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthData>,
    ValidJson(req): ValidJson<UpdatePasswordRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    let user = state.users.find_by_id_or_fail(&auth.user_id).await?;

    let valid = password::verify_password_off_thread(
        req.current_password,
        user.password_hash.clone(),
        user.password_salt.clone(),
        state.argon2.clone(),
    )
    .await?;
    if !valid {
        return Err(Error::user("PASSWORD_INVALID", "Invalid password").into());
    }

    let (hash, salt) =
        password::hash_password_off_thread(req.new_password, state.argon2.clone()).await?;
    state.users.update_password(&auth.user_id, &hash, &salt).await?;
    state
        .sessions
        .expire_all(&auth.user_id, "Password updated by user")
        .await?;

    Ok(Json(EmptyResponse::ok()))
}
