//! `users` table

use crate::error::Result;
use crate::model::{User, UserListItem};
use sqlx::PgPool;

const USER_COLUMNS: &str = "id, display_name, user_name, password_hash, password_salt, \
     is_banned, perm_manage_all_user, perm_create_user, perm_create_bucket, \
     created_at, updated_at";

#[derive(Clone, Debug)]
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_user_name(&self, user_name: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_name = $1"
        ))
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn list_all(&self) -> Result<Vec<UserListItem>> {
        let users = sqlx::query_as::<_, UserListItem>(
            "SELECT id, user_name, display_name, is_banned FROM users ORDER BY user_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn query_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn query_by_user_names(&self, user_names: &[String]) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_name = ANY($1)"
        ))
        .bind(user_names)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn create(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users ( \
                 id, display_name, user_name, password_hash, password_salt, \
                 is_banned, perm_manage_all_user, perm_create_user, perm_create_bucket \
             ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)",
        )
        .bind(&user.id)
        .bind(&user.display_name)
        .bind(&user.user_name)
        .bind(&user.password_hash)
        .bind(&user.password_salt)
        .bind(user.is_banned)
        .bind(user.perm_manage_all_user)
        .bind(user.perm_create_user)
        .bind(user.perm_create_bucket)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_display_name(&self, id: &str, display_name: &str) -> Result<()> {
        sqlx::query("UPDATE users SET display_name = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(display_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_password(&self, id: &str, hash: &str, salt: &str) -> Result<()> {
        sqlx::query(
            "UPDATE users SET password_hash = $2, password_salt = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(hash)
        .bind(salt)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_ban_status(&self, id: &str, is_banned: bool) -> Result<()> {
        sqlx::query("UPDATE users SET is_banned = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(is_banned)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_global_permissions(
        &self,
        id: &str,
        manage_all_user: bool,
        create_user: bool,
        create_bucket: bool,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE users SET perm_manage_all_user = $2, perm_create_user = $3, \
                 perm_create_bucket = $4, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(manage_all_user)
        .bind(create_user)
        .bind(create_bucket)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
