//! Request bodies
//!
//! Every body is strict JSON: unknown fields are rejected and the declared
//! constraints are enforced before a handler runs. Ids are always 16
//! alphanumeric characters.

use crate::extract::{entity_id, find_by_choice, meta_data_value};
use serde::Deserialize;
use validator::Validate;

// -- user ---------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 4, max = 32))]
    pub user_name: String,
    #[validate(length(min = 8, max = 32))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct LogoutRequest {
    #[validate(length(min = 4, max = 124))]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct LogoutAllSessionsRequest {
    #[validate(length(min = 4, max = 124))]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 4, max = 128))]
    pub display_name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 8, max = 32))]
    pub current_password: String,
    #[validate(length(min = 8, max = 32))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct FindUserFilter {
    #[validate(custom(function = "find_by_choice"))]
    pub by: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct FindUserRequest {
    #[validate(nested)]
    pub filters: Vec<FindUserFilter>,
    #[serde(default)]
    pub include_global_permissions: bool,
}

// -- admin --------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct AddUserRequest {
    #[validate(length(min = 4, max = 128))]
    pub display_name: String,
    #[validate(length(min = 4, max = 32))]
    pub user_name: String,
    #[validate(length(min = 8, max = 32))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SetGlobalPermissionsRequest {
    #[validate(custom(function = "entity_id"))]
    pub user_id: String,
    pub global_permissions: std::collections::HashMap<String, bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SetBanningStatusRequest {
    #[validate(custom(function = "entity_id"))]
    pub user_id: String,
    pub is_banned: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct OverwriteUserPasswordRequest {
    #[validate(custom(function = "entity_id"))]
    pub user_id: String,
    #[validate(length(min = 8, max = 32))]
    pub new_password: String,
}

// -- bucket -------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateBucketRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub crypt_spec: String,
    #[validate(length(min = 1, max = 2048))]
    pub crypt_data: String,
    #[validate(custom(function = "meta_data_value"))]
    pub meta_data: serde_json::Value,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RenameBucketRequest {
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SetBucketMetaDataRequest {
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "meta_data_value"))]
    pub meta_data: serde_json::Value,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SetBucketAuthorizationRequest {
    #[validate(custom(function = "entity_id"))]
    pub target_user_id: String,
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    pub permissions_to_set: std::collections::HashMap<String, bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DestroyBucketRequest {
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    /// Confirmation: must match the bucket's current name
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

// -- directory ----------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateDirectoryRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "entity_id"))]
    pub parent_directory_id: String,
    #[validate(custom(function = "meta_data_value"))]
    pub meta_data: serde_json::Value,
    #[validate(length(min = 1, max = 1048576))]
    pub encrypted_meta_data: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct GetDirectoryRequest {
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "entity_id"))]
    pub directory_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RenameDirectoryRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "entity_id"))]
    pub directory_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct MoveDirectoryRequest {
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "entity_id"))]
    pub directory_id: String,
    #[validate(custom(function = "entity_id"))]
    pub new_parent_directory_id: String,
    #[validate(length(min = 1, max = 256))]
    pub new_name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DeleteDirectoryRequest {
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "entity_id"))]
    pub directory_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SetDirectoryMetaDataRequest {
    #[validate(custom(function = "meta_data_value"))]
    pub meta_data: serde_json::Value,
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "entity_id"))]
    pub directory_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SetDirectoryEncryptedMetaDataRequest {
    #[validate(length(min = 1, max = 1048576))]
    pub encrypted_meta_data: String,
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "entity_id"))]
    pub directory_id: String,
}

// -- file ---------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateFileRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "entity_id"))]
    pub parent_directory_id: String,
    #[validate(custom(function = "meta_data_value"))]
    pub meta_data: serde_json::Value,
    #[validate(length(min = 1, max = 1048576))]
    pub encrypted_meta_data: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct GetFileRequest {
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "entity_id"))]
    pub file_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RenameFileRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "entity_id"))]
    pub file_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct MoveFileRequest {
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "entity_id"))]
    pub file_id: String,
    #[validate(custom(function = "entity_id"))]
    pub new_parent_directory_id: String,
    #[validate(length(min = 1, max = 256))]
    pub new_name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DeleteFileRequest {
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "entity_id"))]
    pub file_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SetFileMetaDataRequest {
    #[validate(custom(function = "meta_data_value"))]
    pub meta_data: serde_json::Value,
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "entity_id"))]
    pub file_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SetFileEncryptedMetaDataRequest {
    #[validate(length(min = 1, max = 1048576))]
    pub encrypted_meta_data: String,
    #[validate(custom(function = "entity_id"))]
    pub bucket_id: String,
    #[validate(custom(function = "entity_id"))]
    pub file_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_bounds() {
        let ok: LoginRequest =
            serde_json::from_str(r#"{"userName":"admin","password":"longenough"}"#).unwrap();
        assert!(ok.validate().is_ok());

        let short: LoginRequest =
            serde_json::from_str(r#"{"userName":"adm","password":"longenough"}"#).unwrap();
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<LoginRequest, _> = serde_json::from_str(
            r#"{"userName":"admin","password":"longenough","extra":true}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_entity_id_validation_on_requests() {
        let bad: GetDirectoryRequest = serde_json::from_str(
            r#"{"bucketId":"not-an-id","directoryId":"a1B2c3D4e5F6g7H8"}"#,
        )
        .unwrap();
        assert!(bad.validate().is_err());

        let good: GetDirectoryRequest = serde_json::from_str(
            r#"{"bucketId":"a1B2c3D4e5F6g7H8","directoryId":"a1B2c3D4e5F6g7H8"}"#,
        )
        .unwrap();
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_meta_data_null_rejected() {
        let request: SetBucketMetaDataRequest = serde_json::from_str(
            r#"{"bucketId":"a1B2c3D4e5F6g7H8","metaData":null}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_find_user_filters_validate_nested() {
        let request: FindUserRequest = serde_json::from_str(
            r#"{"filters":[{"by":"email"}],"includeGlobalPermissions":false}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());

        let request: FindUserRequest = serde_json::from_str(
            r#"{"filters":[{"by":"userName","userName":"admin"}]}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_arbitrary_meta_data_accepted() {
        let request: CreateBucketRequest = serde_json::from_str(
            r#"{"name":"b1","cryptSpec":"aes-256-gcm","cryptData":"x",
                "metaData":{"nested":{"deep":[1,2,{"three":true}]}}}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
    }
}
