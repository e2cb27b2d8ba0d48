//! `sessions` table (the durable audit log)

use crate::error::Result;
use crate::model::Session;
use sqlx::PgPool;

const SESSION_COLUMNS: &str = "id, user_id, api_key_hash, has_expired, expired_at, \
     expire_reason, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct SessionRepo {
    pool: PgPool,
}

impl SessionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (id, user_id, api_key_hash, has_expired) \
             VALUES ($1,$2,$3,$4)",
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(&session.api_key_hash)
        .bind(session.has_expired)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    pub async fn list_by_user(&self, user_id: &str, limit: i64) -> Result<Vec<Session>> {
        let sessions = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions \
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    pub async fn expire_by_id(&self, id: &str, reason: &str) -> Result<()> {
        sqlx::query(
            "UPDATE sessions SET has_expired = TRUE, expired_at = NOW(), \
                 expire_reason = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn expire_all_by_user(&self, user_id: &str, reason: &str) -> Result<()> {
        sqlx::query(
            "UPDATE sessions SET has_expired = TRUE, expired_at = NOW(), \
                 expire_reason = $2, updated_at = NOW() \
             WHERE user_id = $1 AND has_expired = FALSE",
        )
        .bind(user_id)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
