//! Response bodies
//!
//! Every JSON response carries `hasError`. Entity ids serialize as `_id`,
//! timestamps as Unix milliseconds, and creators as `<userId>@.`.

use krypta_core::model::{
    Blob, Bucket, BucketOverview, Directory, File, SessionListEntry, User, UserListItem,
};
use krypta_core::service::metrics::DiskUsage;
use serde::Serialize;

/// `<userId>@.` — the wire format for entity creators.
pub fn user_identifier(user_id: &str) -> String {
    format!("{user_id}@.")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyResponse {
    pub has_error: bool,
}

impl EmptyResponse {
    pub fn ok() -> Self {
        Self { has_error: false }
    }
}

// -- user ---------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_name: String,
    pub display_name: String,
    pub is_banned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_permissions: Option<serde_json::Value>,
}

impl SerializedUser {
    pub fn from_user(user: &User, include_global_permissions: bool) -> Self {
        Self {
            id: user.id.clone(),
            user_name: user.user_name.clone(),
            display_name: user.display_name.clone(),
            is_banned: user.is_banned,
            global_permissions: include_global_permissions.then(|| user.global_permissions()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRef {
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub has_error: bool,
    pub api_key: String,
    pub user: SerializedUser,
    pub session: SessionRef,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_name: String,
    pub display_name: String,
    pub is_banned: bool,
}

impl From<UserListItem> for UserSummary {
    fn from(item: UserListItem) -> Self {
        Self {
            id: item.id,
            user_name: item.user_name,
            display_name: item.display_name,
            is_banned: item.is_banned,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub has_error: bool,
    pub user_list: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindUserResponse {
    pub has_error: bool,
    pub user_list: Vec<SerializedUser>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedSession {
    pub is_current_session: bool,
    pub has_expired: bool,
    pub expire_reason: Option<String>,
    pub created_at: i64,
    pub expired_at: Option<i64>,
}

impl From<SessionListEntry> for SerializedSession {
    fn from(entry: SessionListEntry) -> Self {
        Self {
            is_current_session: entry.is_current_session,
            has_expired: entry.has_expired,
            expire_reason: entry.expire_reason,
            created_at: entry.created_at.timestamp_millis(),
            expired_at: entry.expired_at.map(|t| t.timestamp_millis()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListResponse {
    pub has_error: bool,
    pub session_list: Vec<SerializedSession>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserResponse {
    pub has_error: bool,
    pub user_id: String,
}

// -- bucket -------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketAuthorization {
    pub user_id: String,
    pub notes: String,
    pub permissions: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedBucket {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub root_directory_id: String,
    pub crypt_spec: String,
    pub crypt_data: String,
    pub meta_data: serde_json::Value,
    pub bucket_authorizations: Vec<BucketAuthorization>,
    pub created_by_user_identifier: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<BucketOverview> for SerializedBucket {
    fn from(overview: BucketOverview) -> Self {
        let Bucket {
            id,
            name,
            crypt_spec,
            crypt_data,
            meta_data,
            created_by_user_id,
            created_at,
            updated_at,
        } = overview.bucket;
        Self {
            id,
            name,
            root_directory_id: overview.root_directory_id,
            crypt_spec,
            crypt_data,
            meta_data,
            bucket_authorizations: overview
                .authorizations
                .into_iter()
                .map(|p| BucketAuthorization {
                    permissions: p.flags(),
                    user_id: p.user_id,
                    notes: p.notes,
                })
                .collect(),
            created_by_user_identifier: user_identifier(&created_by_user_id),
            created_at: created_at.timestamp_millis(),
            updated_at: updated_at.timestamp_millis(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketResponse {
    pub has_error: bool,
    pub bucket_id: String,
    pub root_directory_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketListResponse {
    pub has_error: bool,
    pub bucket_list: Vec<SerializedBucket>,
}

// -- directory / file ---------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedDirectory {
    #[serde(rename = "_id")]
    pub id: String,
    pub bucket_id: String,
    pub parent_directory_id: Option<String>,
    pub name: String,
    pub meta_data: serde_json::Value,
    pub encrypted_meta_data: String,
    pub created_by_user_identifier: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Directory> for SerializedDirectory {
    fn from(directory: Directory) -> Self {
        Self {
            id: directory.id,
            bucket_id: directory.bucket_id,
            parent_directory_id: directory.parent_directory_id,
            name: directory.name,
            meta_data: directory.meta_data,
            encrypted_meta_data: directory.encrypted_meta_data,
            created_by_user_identifier: user_identifier(&directory.created_by_user_id),
            created_at: directory.created_at.timestamp_millis(),
            updated_at: directory.updated_at.timestamp_millis(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedFile {
    #[serde(rename = "_id")]
    pub id: String,
    pub bucket_id: String,
    pub parent_directory_id: String,
    pub name: String,
    pub meta_data: serde_json::Value,
    pub encrypted_meta_data: String,
    pub size_after_encryption_bytes: i64,
    pub created_by_user_identifier: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub content_updated_at: i64,
}

impl From<File> for SerializedFile {
    fn from(file: File) -> Self {
        Self {
            id: file.id,
            bucket_id: file.bucket_id,
            parent_directory_id: file.parent_directory_id,
            name: file.name,
            meta_data: file.meta_data,
            encrypted_meta_data: file.encrypted_meta_data,
            size_after_encryption_bytes: file.size_after_encryption_bytes,
            created_by_user_identifier: user_identifier(&file.created_by_user_id),
            created_at: file.created_at.timestamp_millis(),
            updated_at: file.updated_at.timestamp_millis(),
            content_updated_at: file.content_updated_at.timestamp_millis(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDirectoryResponse {
    pub has_error: bool,
    pub directory_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDirectoryResponse {
    pub has_error: bool,
    pub directory: SerializedDirectory,
    pub child_directory_list: Vec<SerializedDirectory>,
    pub child_file_list: Vec<SerializedFile>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileResponse {
    pub has_error: bool,
    pub file_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFileResponse {
    pub has_error: bool,
    pub file: SerializedFile,
}

// -- blob ---------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteBlobResponse {
    pub has_error: bool,
    pub blob_id: String,
}

/// `bytesTransfered` is spelled exactly as clients expect it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteQuantizedResponse {
    pub has_error: bool,
    pub blob_id: String,
    #[serde(rename = "bytesTransfered")]
    pub bytes_transferred: u64,
}

impl WriteBlobResponse {
    pub fn from_blob(blob: &Blob) -> Self {
        Self {
            has_error: false,
            blob_id: blob.id.clone(),
        }
    }
}

// -- metrics ------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskSummary {
    pub used_bytes: u64,
    pub total_bytes: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummaryResponse {
    pub has_error: bool,
    pub disk: DiskSummary,
}

impl MetricsSummaryResponse {
    pub fn from_usage(usage: DiskUsage) -> Self {
        Self {
            has_error: false,
            disk: DiskSummary {
                used_bytes: usage.used_bytes,
                total_bytes: usage.total_bytes,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_user_identifier_format() {
        assert_eq!(user_identifier("a1B2c3D4e5F6g7H8"), "a1B2c3D4e5F6g7H8@.");
    }

    #[test]
    fn test_directory_serialization_shape() {
        let directory = Directory {
            id: "d".repeat(16),
            bucket_id: "b".repeat(16),
            parent_directory_id: None,
            name: "root".into(),
            meta_data: serde_json::json!({"k": 1}),
            encrypted_meta_data: "opaque".into(),
            created_by_user_id: "u".repeat(16),
            created_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            updated_at: Utc.timestamp_millis_opt(1_700_000_000_001).unwrap(),
        };
        let json = serde_json::to_value(SerializedDirectory::from(directory)).unwrap();
        assert_eq!(json["_id"], "d".repeat(16));
        assert_eq!(json["parentDirectoryId"], serde_json::Value::Null);
        assert_eq!(json["createdAt"], 1_700_000_000_000i64);
        assert_eq!(json["updatedAt"], 1_700_000_000_001i64);
        assert_eq!(json["createdByUserIdentifier"], format!("{}@.", "u".repeat(16)));
        assert_eq!(json["metaData"]["k"], 1);
    }

    #[test]
    fn test_bucket_overview_serialization() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let overview = BucketOverview {
            bucket: krypta_core::model::Bucket {
                id: "b".repeat(16),
                name: "b1".into(),
                crypt_spec: "aes-256-gcm".into(),
                crypt_data: "opaque".into(),
                meta_data: serde_json::json!({}),
                created_by_user_id: "u".repeat(16),
                created_at: now,
                updated_at: now,
            },
            root_directory_id: "r".repeat(16),
            authorizations: vec![krypta_core::model::BucketPermission {
                id: 1,
                bucket_id: "b".repeat(16),
                user_id: "u".repeat(16),
                notes: "Created this bucket".into(),
                perm_modify: true,
                perm_manage_authorization: true,
                perm_destroy: true,
                perm_view_content: true,
                perm_manage_content: true,
                created_at: now,
                updated_at: now,
            }],
        };
        let json = serde_json::to_value(SerializedBucket::from(overview)).unwrap();
        assert_eq!(json["_id"], "b".repeat(16));
        assert_eq!(json["rootDirectoryId"], "r".repeat(16));
        let auths = json["bucketAuthorizations"].as_array().unwrap();
        assert_eq!(auths.len(), 1);
        assert_eq!(auths[0]["notes"], "Created this bucket");
        for flag in [
            "MODIFY",
            "MANAGE_AUTHORIZATION",
            "DESTROY",
            "VIEW_CONTENT",
            "MANAGE_CONTENT",
        ] {
            assert_eq!(auths[0]["permissions"][flag], true);
        }
    }

    #[test]
    fn test_write_quantized_wire_spelling() {
        let json = serde_json::to_value(WriteQuantizedResponse {
            has_error: false,
            blob_id: "x".repeat(16),
            bytes_transferred: 42,
        })
        .unwrap();
        assert_eq!(json["bytesTransfered"], 42);
        assert!(json.get("bytesTransferred").is_none());
    }

    #[test]
    fn test_global_permissions_omitted_when_not_requested() {
        let user = User {
            id: "u".repeat(16),
            display_name: "U".into(),
            user_name: "user".into(),
            password_hash: String::new(),
            password_salt: String::new(),
            is_banned: false,
            perm_manage_all_user: false,
            perm_create_user: false,
            perm_create_bucket: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let without = serde_json::to_value(SerializedUser::from_user(&user, false)).unwrap();
        assert!(without.get("globalPermissions").is_none());
        let with = serde_json::to_value(SerializedUser::from_user(&user, true)).unwrap();
        assert_eq!(with["globalPermissions"]["CREATE_BUCKET"], true);
    }

    #[test]
    fn test_empty_response_envelope() {
        let json = serde_json::to_value(EmptyResponse::ok()).unwrap();
        assert_eq!(json, serde_json::json!({"hasError": false}));
    }
}
