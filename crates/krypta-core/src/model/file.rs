//! Files

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A file inside a directory. Content lives in the object store as blobs;
/// `size_after_encryption_bytes` reflects the current blob's stored size.
#[derive(Clone, Debug, FromRow)]
pub struct File {
    pub id: String,
    pub bucket_id: String,
    pub parent_directory_id: String,
    pub name: String,
    pub meta_data: serde_json::Value,
    pub encrypted_meta_data: String,
    pub size_after_encryption_bytes: i64,
    pub created_by_user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub content_updated_at: DateTime<Utc>,
}
