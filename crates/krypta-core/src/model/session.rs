//! Sessions: durable audit rows and the hot cache record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Audit row in the `sessions` table. Never deleted; expiry only flips
/// `has_expired` and records the reason. The API key itself is never
/// persisted, only its SHA-256 hex digest.
#[derive(Clone, Debug, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub api_key_hash: String,
    pub has_expired: bool,
    pub expired_at: Option<DateTime<Utc>>,
    pub expire_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hot record stored in the cache under `krypta:session:<apiKey>`, JSON
/// encoded. `created_at` is Unix milliseconds so the defense-in-depth age
/// check needs no timezone handling.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedSession {
    pub session_id: String,
    pub user_id: String,
    pub created_at: i64,
}

/// One entry of the list-all-sessions response.
#[derive(Clone, Debug)]
pub struct SessionListEntry {
    pub is_current_session: bool,
    pub has_expired: bool,
    pub expire_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expired_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_session_wire_format() {
        let cached = CachedSession {
            session_id: "s".repeat(16),
            user_id: "u".repeat(16),
            created_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&cached).unwrap();
        assert_eq!(json["sessionId"], "s".repeat(16));
        assert_eq!(json["userId"], "u".repeat(16));
        assert_eq!(json["createdAt"], 1_700_000_000_000i64);
    }

    #[test]
    fn test_cached_session_round_trip() {
        let raw = r#"{"sessionId":"abcdabcdabcdabcd","userId":"efghefghefghefgh","createdAt":42}"#;
        let cached: CachedSession = serde_json::from_str(raw).unwrap();
        assert_eq!(cached.session_id, "abcdabcdabcdabcd");
        assert_eq!(cached.created_at, 42);
    }
}
