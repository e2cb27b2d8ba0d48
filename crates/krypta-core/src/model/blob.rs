//! Blob records

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Lifecycle state of a blob. `started` blobs are in-flight uploads;
/// `finished` and `error` are terminal. Among a file's finished blobs only
/// the latest by `finished_at` is current; the rest are garbage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "blob_status", rename_all = "lowercase")]
pub enum BlobStatus {
    Started,
    Finished,
    Error,
}

impl BlobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Error => "error",
        }
    }
}

/// A blob record. The object-store bytes live under `blobs/<id>`; the
/// `crypto_meta_header_content` string is carried bit-exact between the
/// client's `nk-crypto-meta` headers on write and read.
#[derive(Clone, Debug, FromRow)]
pub struct Blob {
    pub id: String,
    pub bucket_id: String,
    pub file_id: String,
    pub crypto_meta_header_content: String,
    pub status: BlobStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_by_user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(BlobStatus::Started.as_str(), "started");
        assert_eq!(BlobStatus::Finished.as_str(), "finished");
        assert_eq!(BlobStatus::Error.as_str(), "error");
    }
}
