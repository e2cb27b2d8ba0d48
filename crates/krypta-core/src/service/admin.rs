//! Account administration

use crate::error::{Error, Result};
use crate::ident;
use crate::model::User;
use crate::password::{self, Argon2Config};
use crate::repo::UserRepo;
use crate::service::SessionService;
use chrono::Utc;
use std::collections::HashMap;
use tracing::info;

/// Identity of the admin account seeded at startup.
#[derive(Clone, Debug)]
pub struct DefaultAdmin {
    pub user_name: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct AdminService {
    users: UserRepo,
    sessions: SessionService,
    argon2: Argon2Config,
}

impl AdminService {
    pub fn new(users: UserRepo, sessions: SessionService, argon2: Argon2Config) -> Self {
        Self {
            users,
            sessions,
            argon2,
        }
    }

    /// Create the default admin account if no user holds its user name.
    /// The admin gets all three global permission flags.
    pub async fn seed_default_admin(&self, admin: &DefaultAdmin) -> Result<()> {
        if self.users.find_by_user_name(&admin.user_name).await?.is_some() {
            return Ok(());
        }

        let (hash, salt) =
            password::hash_password_off_thread(admin.password.clone(), self.argon2.clone()).await?;
        let now = Utc::now();
        let user = User {
            id: ident::new_id(),
            display_name: admin.display_name.clone(),
            user_name: admin.user_name.clone(),
            password_hash: hash,
            password_salt: salt,
            is_banned: false,
            perm_manage_all_user: true,
            perm_create_user: true,
            perm_create_bucket: true,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        info!(user_name = %admin.user_name, "default admin user created");
        Ok(())
    }

    /// Create a user. New accounts may create buckets but get no other
    /// global permissions.
    pub async fn add_user(
        &self,
        display_name: &str,
        user_name: &str,
        plain_password: &str,
    ) -> Result<String> {
        if self.users.find_by_user_name(user_name).await?.is_some() {
            return Err(Error::user("DUPLICATE_USERNAME", "User name is already taken"));
        }

        let (hash, salt) =
            password::hash_password_off_thread(plain_password.to_owned(), self.argon2.clone())
                .await?;
        let now = Utc::now();
        let user = User {
            id: ident::new_id(),
            display_name: display_name.to_owned(),
            user_name: user_name.to_owned(),
            password_hash: hash,
            password_salt: salt,
            is_banned: false,
            perm_manage_all_user: false,
            perm_create_user: false,
            perm_create_bucket: true,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        Ok(user.id)
    }

    /// Overwrite the three global flags from the supplied map; absent keys
    /// mean false.
    pub async fn set_global_permissions(
        &self,
        user_id: &str,
        permissions: &HashMap<String, bool>,
    ) -> Result<()> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(Error::user(
                "USER_NOT_FOUND",
                "The requested user could not be found.",
            ));
        }
        self.users
            .update_global_permissions(
                user_id,
                permissions.get("MANAGE_ALL_USER").copied().unwrap_or(false),
                permissions.get("CREATE_USER").copied().unwrap_or(false),
                permissions.get("CREATE_BUCKET").copied().unwrap_or(false),
            )
            .await
    }

    /// Flip the ban flag. Existing sessions stay live until they expire;
    /// banning only blocks new logins.
    pub async fn set_banning_status(&self, user_id: &str, is_banned: bool) -> Result<()> {
        self.users.update_ban_status(user_id, is_banned).await
    }

    /// Replace a user's password and force-expire every session they hold.
    pub async fn overwrite_user_password(&self, user_id: &str, new_password: &str) -> Result<()> {
        let (hash, salt) =
            password::hash_password_off_thread(new_password.to_owned(), self.argon2.clone())
                .await?;
        self.users.update_password(user_id, &hash, &salt).await?;
        self.sessions
            .expire_all(user_id, "Password overwritten by admin")
            .await
    }
}
