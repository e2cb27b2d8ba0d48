//! Directories

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A directory in a bucket's tree. The root directory of a bucket has
/// `parent_directory_id = None` and carries the bucket's name; every other
/// directory points at a parent in the same bucket.
#[derive(Clone, Debug, FromRow)]
pub struct Directory {
    pub id: String,
    pub bucket_id: String,
    pub parent_directory_id: Option<String>,
    pub name: String,
    pub meta_data: serde_json::Value,
    pub encrypted_meta_data: String,
    pub created_by_user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Directory {
    /// Whether this is the root of its bucket.
    pub fn is_root(&self) -> bool {
        self.parent_directory_id.is_none()
    }
}
