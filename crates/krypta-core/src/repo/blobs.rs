//! `blobs` table

use crate::error::Result;
use crate::model::{Blob, BlobStatus};
use sqlx::PgPool;

const BLOB_COLUMNS: &str = "id, bucket_id, file_id, crypto_meta_header_content, status, \
     started_at, finished_at, created_by_user_id, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct BlobRepo {
    pool: PgPool,
}

impl BlobRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, blob: &Blob) -> Result<()> {
        sqlx::query(
            "INSERT INTO blobs \
                 (id, bucket_id, file_id, crypto_meta_header_content, status, \
                  created_by_user_id) \
             VALUES ($1,$2,$3,$4,$5,$6)",
        )
        .bind(&blob.id)
        .bind(&blob.bucket_id)
        .bind(&blob.file_id)
        .bind(&blob.crypto_meta_header_content)
        .bind(blob.status)
        .bind(&blob.created_by_user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The given blob, provided it belongs to (bucket, file) and is still
    /// in-flight.
    pub async fn find_in_progress(
        &self,
        bucket_id: &str,
        file_id: &str,
        blob_id: &str,
    ) -> Result<Option<Blob>> {
        let blob = sqlx::query_as::<_, Blob>(&format!(
            "SELECT {BLOB_COLUMNS} FROM blobs \
             WHERE bucket_id = $1 AND file_id = $2 AND id = $3 AND status = 'started'"
        ))
        .bind(bucket_id)
        .bind(file_id)
        .bind(blob_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(blob)
    }

    /// The file's current blob: latest finished by `finished_at`.
    pub async fn find_latest_finished(
        &self,
        bucket_id: &str,
        file_id: &str,
    ) -> Result<Option<Blob>> {
        let blob = sqlx::query_as::<_, Blob>(&format!(
            "SELECT {BLOB_COLUMNS} FROM blobs \
             WHERE bucket_id = $1 AND file_id = $2 AND status = 'finished' \
             ORDER BY finished_at DESC LIMIT 1"
        ))
        .bind(bucket_id)
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(blob)
    }

    pub async fn mark_finished(&self, blob_id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE blobs SET status = $2, finished_at = NOW(), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(blob_id)
        .bind(BlobStatus::Finished)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn mark_erroneous(&self, blob_id: &str) -> Result<()> {
        sqlx::query("UPDATE blobs SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(blob_id)
            .bind(BlobStatus::Error)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_for_file(&self, bucket_id: &str, file_id: &str) -> Result<Vec<Blob>> {
        let blobs = sqlx::query_as::<_, Blob>(&format!(
            "SELECT {BLOB_COLUMNS} FROM blobs WHERE bucket_id = $1 AND file_id = $2"
        ))
        .bind(bucket_id)
        .bind(file_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(blobs)
    }

    pub async fn list_for_file_excluding(
        &self,
        bucket_id: &str,
        file_id: &str,
        exclude_blob_id: &str,
    ) -> Result<Vec<Blob>> {
        let blobs = sqlx::query_as::<_, Blob>(&format!(
            "SELECT {BLOB_COLUMNS} FROM blobs \
             WHERE bucket_id = $1 AND file_id = $2 AND id != $3"
        ))
        .bind(bucket_id)
        .bind(file_id)
        .bind(exclude_blob_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(blobs)
    }

    /// All blob rows of a bucket, for purging the object store before a
    /// bucket is destroyed.
    pub async fn list_for_bucket(&self, bucket_id: &str) -> Result<Vec<Blob>> {
        let blobs = sqlx::query_as::<_, Blob>(&format!(
            "SELECT {BLOB_COLUMNS} FROM blobs WHERE bucket_id = $1"
        ))
        .bind(bucket_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(blobs)
    }

    pub async fn delete_for_file_excluding(
        &self,
        bucket_id: &str,
        file_id: &str,
        keep_blob_id: &str,
    ) -> Result<()> {
        sqlx::query("DELETE FROM blobs WHERE bucket_id = $1 AND file_id = $2 AND id != $3")
            .bind(bucket_id)
            .bind(file_id)
            .bind(keep_blob_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_all_for_file(&self, bucket_id: &str, file_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM blobs WHERE bucket_id = $1 AND file_id = $2")
            .bind(bucket_id)
            .bind(file_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
