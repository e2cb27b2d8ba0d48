//! User accounts and global permissions

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A user account. Users are never deleted, only banned.
#[derive(Clone, Debug, FromRow)]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub user_name: String,
    pub password_hash: String,
    pub password_salt: String,
    pub is_banned: bool,
    pub perm_manage_all_user: bool,
    pub perm_create_user: bool,
    pub perm_create_bucket: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The three user-scoped permission flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlobalPermission {
    ManageAllUser,
    CreateUser,
    CreateBucket,
}

impl GlobalPermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManageAllUser => "MANAGE_ALL_USER",
            Self::CreateUser => "CREATE_USER",
            Self::CreateBucket => "CREATE_BUCKET",
        }
    }
}

impl User {
    /// Whether this user holds the given global permission.
    pub fn has_global(&self, permission: GlobalPermission) -> bool {
        match permission {
            GlobalPermission::ManageAllUser => self.perm_manage_all_user,
            GlobalPermission::CreateUser => self.perm_create_user,
            GlobalPermission::CreateBucket => self.perm_create_bucket,
        }
    }

    /// The permission flags as a `{NAME: bool}` JSON object.
    pub fn global_permissions(&self) -> serde_json::Value {
        serde_json::json!({
            "MANAGE_ALL_USER": self.perm_manage_all_user,
            "CREATE_USER": self.perm_create_user,
            "CREATE_BUCKET": self.perm_create_bucket,
        })
    }
}

/// Lightweight view for user listings.
#[derive(Clone, Debug, FromRow)]
pub struct UserListItem {
    pub id: String,
    pub user_name: String,
    pub display_name: String,
    pub is_banned: bool,
}

/// Authenticated identity attached to a request.
#[derive(Clone, Debug)]
pub struct AuthData {
    pub api_key: String,
    pub user_id: String,
    pub session_id: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_flags(manage: bool, create_user: bool, create_bucket: bool) -> User {
        User {
            id: "u".repeat(16),
            display_name: "Test User".into(),
            user_name: "testuser".into(),
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
    fn test_has_global() {
        let user = user_with_flags(false, true, true);
        assert!(!user.has_global(GlobalPermission::ManageAllUser));
        assert!(user.has_global(GlobalPermission::CreateUser));
        assert!(user.has_global(GlobalPermission::CreateBucket));
    }

    #[test]
    fn test_global_permissions_json() {
        let user = user_with_flags(true, false, true);
        let perms = user.global_permissions();
        assert_eq!(perms["MANAGE_ALL_USER"], true);
        assert_eq!(perms["CREATE_USER"], false);
        assert_eq!(perms["CREATE_BUCKET"], true);
    }
}
