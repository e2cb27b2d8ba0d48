//! Buckets and per-bucket permissions

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A top-level encryption container. `crypt_spec` and `crypt_data` are
/// opaque client-chosen strings; `meta_data` is arbitrary client JSON.
#[derive(Clone, Debug, FromRow)]
pub struct Bucket {
    pub id: String,
    pub name: String,
    pub crypt_spec: String,
    pub crypt_data: String,
    pub meta_data: serde_json::Value,
    pub created_by_user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A (bucket, user) permission row. At most one exists per pair.
#[derive(Clone, Debug, FromRow)]
pub struct BucketPermission {
    pub id: i64,
    pub bucket_id: String,
    pub user_id: String,
    pub notes: String,
    pub perm_modify: bool,
    pub perm_manage_authorization: bool,
    pub perm_destroy: bool,
    pub perm_view_content: bool,
    pub perm_manage_content: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The five per-bucket permission flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BucketPermissionFlag {
    Modify,
    ManageAuthorization,
    Destroy,
    ViewContent,
    ManageContent,
}

impl BucketPermissionFlag {
    pub const ALL: [Self; 5] = [
        Self::Modify,
        Self::ManageAuthorization,
        Self::Destroy,
        Self::ViewContent,
        Self::ManageContent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Modify => "MODIFY",
            Self::ManageAuthorization => "MANAGE_AUTHORIZATION",
            Self::Destroy => "DESTROY",
            Self::ViewContent => "VIEW_CONTENT",
            Self::ManageContent => "MANAGE_CONTENT",
        }
    }
}

impl BucketPermission {
    /// Whether this row grants the given flag.
    pub fn has(&self, flag: BucketPermissionFlag) -> bool {
        match flag {
            BucketPermissionFlag::Modify => self.perm_modify,
            BucketPermissionFlag::ManageAuthorization => self.perm_manage_authorization,
            BucketPermissionFlag::Destroy => self.perm_destroy,
            BucketPermissionFlag::ViewContent => self.perm_view_content,
            BucketPermissionFlag::ManageContent => self.perm_manage_content,
        }
    }

    /// Apply `{NAME: bool}` overrides onto this row; unknown names are
    /// ignored, absent names leave the flag untouched.
    pub fn apply(&mut self, overrides: &std::collections::HashMap<String, bool>) {
        for flag in BucketPermissionFlag::ALL {
            if let Some(&value) = overrides.get(flag.as_str()) {
                match flag {
                    BucketPermissionFlag::Modify => self.perm_modify = value,
                    BucketPermissionFlag::ManageAuthorization => {
                        self.perm_manage_authorization = value
                    }
                    BucketPermissionFlag::Destroy => self.perm_destroy = value,
                    BucketPermissionFlag::ViewContent => self.perm_view_content = value,
                    BucketPermissionFlag::ManageContent => self.perm_manage_content = value,
                }
            }
        }
    }

    /// The flags as a `{NAME: bool}` JSON object.
    pub fn flags(&self) -> serde_json::Value {
        serde_json::json!({
            "MODIFY": self.perm_modify,
            "MANAGE_AUTHORIZATION": self.perm_manage_authorization,
            "DESTROY": self.perm_destroy,
            "VIEW_CONTENT": self.perm_view_content,
            "MANAGE_CONTENT": self.perm_manage_content,
        })
    }
}

/// A bucket joined with its root directory and permission rows, as needed
/// by the bucket listing.
#[derive(Clone, Debug)]
pub struct BucketOverview {
    pub bucket: Bucket,
    pub root_directory_id: String,
    pub authorizations: Vec<BucketPermission>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn permission() -> BucketPermission {
        BucketPermission {
            id: 1,
            bucket_id: "b".repeat(16),
            user_id: "u".repeat(16),
            notes: "Created this bucket".into(),
            perm_modify: false,
            perm_manage_authorization: false,
            perm_destroy: false,
            perm_view_content: false,
            perm_manage_content: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_sets_named_flags_only() {
        let mut perm = permission();
        let mut overrides = HashMap::new();
        overrides.insert("VIEW_CONTENT".to_owned(), true);
        overrides.insert("MANAGE_CONTENT".to_owned(), true);
        perm.apply(&overrides);
        assert!(perm.perm_view_content);
        assert!(perm.perm_manage_content);
        assert!(!perm.perm_modify);
        assert!(!perm.perm_destroy);
    }

    #[test]
    fn test_apply_can_revoke() {
        let mut perm = permission();
        perm.perm_destroy = true;
        let mut overrides = HashMap::new();
        overrides.insert("DESTROY".to_owned(), false);
        perm.apply(&overrides);
        assert!(!perm.perm_destroy);
    }

    #[test]
    fn test_apply_ignores_unknown_names() {
        let mut perm = permission();
        let mut overrides = HashMap::new();
        overrides.insert("NOT_A_FLAG".to_owned(), true);
        perm.apply(&overrides);
        assert_eq!(perm.flags(), permission().flags());
    }

    #[test]
    fn test_has_matches_flags() {
        let mut perm = permission();
        perm.perm_manage_authorization = true;
        assert!(perm.has(BucketPermissionFlag::ManageAuthorization));
        assert!(!perm.has(BucketPermissionFlag::Modify));
    }
}
