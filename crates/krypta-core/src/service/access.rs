//! Authorization engine
//!
//! Global checks look at the user's own flags. Bucket checks go through
//! the (bucket, user) permission row; holding admin-level global flags
//! grants nothing here, access is strictly per-row. The containment
//! asserts keep cross-bucket reference forgery out: an entity id is only
//! valid together with the bucket it lives in.

use crate::error::{Error, Result};
use crate::model::{BucketPermissionFlag, GlobalPermission, User};
use crate::service::{BucketService, DirectoryService, FileService};

/// Require every listed global permission, failing on the first missing.
pub fn require_global_permission(user: &User, permissions: &[GlobalPermission]) -> Result<()> {
    for permission in permissions {
        if !user.has_global(*permission) {
            return Err(Error::user(
                "INSUFFICIENT_GLOBAL_PERMISSION",
                format!(
                    "You do not have the required permissions. This action requires the \
                     \"{}\" permission.",
                    permission.as_str()
                ),
            ));
        }
    }
    Ok(())
}

/// Require every listed bucket permission for (user, bucket).
pub async fn require_bucket_permission(
    buckets: &BucketService,
    user_id: &str,
    bucket_id: &str,
    permissions: &[BucketPermissionFlag],
) -> Result<()> {
    let bucket = buckets.find_by_id(bucket_id).await?;
    if bucket.is_none() {
        return Err(Error::user(
            "BUCKET_NOT_FOUND",
            "The requested bucket could not be found.",
        ));
    }
    let row = buckets.permission(bucket_id, user_id).await?.ok_or_else(|| {
        Error::user("NO_AUTHORIZATION", "You do not have access to this bucket.")
    })?;
    for permission in permissions {
        if !row.has(*permission) {
            return Err(Error::user(
                "INSUFFICIENT_BUCKET_PERMISSION",
                format!(
                    "You do not have the required bucket permission: \"{}\".",
                    permission.as_str()
                ),
            ));
        }
    }
    Ok(())
}

/// Fail unless the directory exists inside the bucket.
pub async fn ensure_directory_in_bucket(
    directories: &DirectoryService,
    bucket_id: &str,
    directory_id: &str,
) -> Result<()> {
    if directories.find_by_id(bucket_id, directory_id).await?.is_none() {
        return Err(Error::user(
            "DIRECTORY_NOT_IN_BUCKET",
            "The requested directory could not be found in this bucket.",
        ));
    }
    Ok(())
}

/// Fail unless the file exists inside the bucket.
pub async fn ensure_file_in_bucket(
    files: &FileService,
    bucket_id: &str,
    file_id: &str,
) -> Result<()> {
    if files.find_by_id(bucket_id, file_id).await?.is_none() {
        return Err(Error::user(
            "FILE_NOT_IN_BUCKET",
            "The requested file could not be found in this bucket.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(manage: bool, create_user: bool, create_bucket: bool) -> User {
        User {
            id: "u".repeat(16),
            display_name: "U".into(),
            user_name: "user".into(),
            password_hash: String::new(),
            password_salt: String::new(),
            is_banned: false,
            perm_manage_all_user: manage,
            perm_create_user: create_user,
            perm_create_bucket: create_bucket,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_global_check_passes_with_all_flags() {
        let u = user(true, true, true);
        assert!(require_global_permission(
            &u,
            &[GlobalPermission::CreateUser, GlobalPermission::CreateBucket]
        )
        .is_ok());
    }

    #[test]
    fn test_global_check_names_first_missing() {
        let u = user(false, false, true);
        let err = require_global_permission(
            &u,
            &[GlobalPermission::CreateBucket, GlobalPermission::ManageAllUser],
        )
        .unwrap_err();
        match err {
            Error::User { code, message } => {
                assert_eq!(code, "INSUFFICIENT_GLOBAL_PERMISSION");
                assert!(message.contains("MANAGE_ALL_USER"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
