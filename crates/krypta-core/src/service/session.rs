//! Session authority
//!
//! Sessions are dual-stored: the cache holds the hot record that decides
//! "is this key live right now", the metadata store keeps the audit row.
//! On expiry the hot record goes first; the reverse order would leave a
//! window where an audit-expired key still authenticates.

use crate::error::{Error, Result};
use crate::ident;
use crate::model::{CachedSession, Session, SessionListEntry, User};
use crate::repo::SessionRepo;
use chrono::{Duration, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use tracing::debug;

/// How many audit rows the session listing returns.
const SESSION_LIST_LIMIT: i64 = 20;

/// Attempts at generating an unused API key before giving up.
const KEY_GENERATION_ATTEMPTS: usize = 99;

#[derive(Clone)]
pub struct SessionService {
    redis: ConnectionManager,
    repo: SessionRepo,
    api_key_length: usize,
    validity: Duration,
}

fn session_key(api_key: &str) -> String {
    format!("krypta:session:{api_key}")
}

fn user_sessions_key(user_id: &str) -> String {
    format!("krypta:user_sessions:{user_id}")
}

/// SHA-256 hex digest of an API key, the only form that is persisted.
pub fn api_key_digest(api_key: &str) -> String {
    hex::encode(Sha256::digest(api_key.as_bytes()))
}

impl SessionService {
    pub fn new(
        redis: ConnectionManager,
        repo: SessionRepo,
        api_key_length: usize,
        validity: Duration,
    ) -> Self {
        Self {
            redis,
            repo,
            api_key_length,
            validity,
        }
    }

    /// Configured session validity window.
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issue a new session for `user`: a fresh unused API key, the hot
    /// cache record (with TTL) plus user-session set membership in one
    /// pipelined write, and the durable audit row.
    pub async fn issue(&self, user: &User) -> Result<(Session, String)> {
        let mut con = self.redis.clone();

        let mut api_key = None;
        for _ in 0..KEY_GENERATION_ATTEMPTS {
            let candidate = ident::new_api_key(self.api_key_length);
            let exists: bool = con.exists(session_key(&candidate)).await?;
            if !exists {
                api_key = Some(candidate);
                break;
            }
        }
        let api_key = api_key.ok_or_else(|| {
            Error::developer(
                "API_KEY_CREATION_FAILED",
                "Timed out generating a unique API key",
            )
        })?;

        let session_id = ident::new_id();
        let now = Utc::now();
        let cached = CachedSession {
            session_id: session_id.clone(),
            user_id: user.id.clone(),
            created_at: now.timestamp_millis(),
        };
        let encoded = serde_json::to_string(&cached)
            .map_err(|e| Error::developer("SESSION_ENCODING_FAILED", e.to_string()))?;

        let ttl_secs = self.validity.num_seconds().max(1) as u64;
        let _: () = redis::pipe()
            .atomic()
            .set_ex(session_key(&api_key), encoded, ttl_secs)
            .ignore()
            .sadd(user_sessions_key(&user.id), &api_key)
            .ignore()
            .query_async(&mut con)
            .await?;

        let session = Session {
            id: session_id,
            user_id: user.id.clone(),
            api_key_hash: api_key_digest(&api_key),
            has_expired: false,
            expired_at: None,
            expire_reason: None,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&session).await?;

        debug!(user_id = %user.id, session_id = %session.id, "session issued");
        Ok((session, api_key))
    }

    /// The hot record for `api_key`, if the key is live.
    pub async fn resolve(&self, api_key: &str) -> Result<Option<CachedSession>> {
        let mut con = self.redis.clone();
        let raw: Option<String> = con.get(session_key(api_key)).await?;
        match raw {
            Some(raw) => {
                let cached = serde_json::from_str(&raw)
                    .map_err(|e| Error::developer("SESSION_DECODING_FAILED", e.to_string()))?;
                Ok(Some(cached))
            }
            None => Ok(None),
        }
    }

    /// Expire one session. Cache entries are removed first, then the audit
    /// row is marked with reason `Logout: <message>`.
    pub async fn expire(
        &self,
        session_id: &str,
        api_key: &str,
        user_id: &str,
        message: &str,
    ) -> Result<()> {
        let mut con = self.redis.clone();
        let _: () = redis::pipe()
            .atomic()
            .del(session_key(api_key))
            .ignore()
            .srem(user_sessions_key(user_id), api_key)
            .ignore()
            .query_async(&mut con)
            .await?;
        self.repo
            .expire_by_id(session_id, &format!("Logout: {message}"))
            .await
    }

    /// Expire every session of a user. All member keys and the set itself
    /// go in one pipelined delete; audit rows get `ForceLogout: <message>`.
    pub async fn expire_all(&self, user_id: &str, message: &str) -> Result<()> {
        let mut con = self.redis.clone();
        let api_keys: Vec<String> = con.smembers(user_sessions_key(user_id)).await?;
        if !api_keys.is_empty() {
            let mut pipe = redis::pipe();
            pipe.atomic();
            for key in &api_keys {
                pipe.del(session_key(key)).ignore();
            }
            pipe.del(user_sessions_key(user_id)).ignore();
            let _: () = pipe.query_async(&mut con).await?;
        }
        self.repo
            .expire_all_by_user(user_id, &format!("ForceLogout: {message}"))
            .await
    }

    /// Latest audit rows for the user, tagged with whether each is the
    /// session making the request.
    pub async fn list(
        &self,
        user_id: &str,
        current_session_id: &str,
    ) -> Result<Vec<SessionListEntry>> {
        let sessions = self.repo.list_by_user(user_id, SESSION_LIST_LIMIT).await?;
        Ok(sessions
            .into_iter()
            .map(|s| SessionListEntry {
                is_current_session: s.id == current_session_id,
                has_expired: s.has_expired,
                expire_reason: s.expire_reason,
                created_at: s.created_at,
                expired_at: s.expired_at,
            })
            .collect())
    }
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("api_key_length", &self.api_key_length)
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_digest_is_sha256_hex() {
        // SHA-256("abc")
        assert_eq!(
            api_key_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_cache_key_namespacing() {
        assert_eq!(session_key("k"), "krypta:session:k");
        assert_eq!(user_sessions_key("u"), "krypta:user_sessions:u");
    }
}
