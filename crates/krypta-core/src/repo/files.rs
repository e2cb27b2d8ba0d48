//! `files` table

use crate::error::Result;
use crate::model::File;
use sqlx::PgPool;

const FILE_COLUMNS: &str = "id, bucket_id, parent_directory_id, name, meta_data, \
     encrypted_meta_data, size_after_encryption_bytes, created_by_user_id, \
     created_at, updated_at, content_updated_at";

#[derive(Clone, Debug)]
pub struct FileRepo {
    pool: PgPool,
}

impl FileRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, bucket_id: &str, id: &str) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE bucket_id = $1 AND id = $2"
        ))
        .bind(bucket_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(file)
    }

    pub async fn find_by_name_and_parent(
        &self,
        bucket_id: &str,
        parent_directory_id: &str,
        name: &str,
    ) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(&format!(
            "SELECT {FILE_COLUMNS} FROM files \
             WHERE bucket_id = $1 AND parent_directory_id = $2 AND name = $3"
        ))
        .bind(bucket_id)
        .bind(parent_directory_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(file)
    }

    pub async fn list_by_directory(
        &self,
        bucket_id: &str,
        parent_directory_id: &str,
    ) -> Result<Vec<File>> {
        let files = sqlx::query_as::<_, File>(&format!(
            "SELECT {FILE_COLUMNS} FROM files \
             WHERE bucket_id = $1 AND parent_directory_id = $2 ORDER BY name"
        ))
        .bind(bucket_id)
        .bind(parent_directory_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(files)
    }

    pub async fn create(&self, file: &File) -> Result<()> {
        sqlx::query(
            "INSERT INTO files \
                 (id, bucket_id, parent_directory_id, name, meta_data, encrypted_meta_data, \
                  size_after_encryption_bytes, created_by_user_id) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
        )
        .bind(&file.id)
        .bind(&file.bucket_id)
        .bind(&file.parent_directory_id)
        .bind(&file.name)
        .bind(&file.meta_data)
        .bind(&file.encrypted_meta_data)
        .bind(file.size_after_encryption_bytes)
        .bind(&file.created_by_user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_name(&self, bucket_id: &str, id: &str, name: &str) -> Result<()> {
        sqlx::query(
            "UPDATE files SET name = $3, updated_at = NOW() WHERE bucket_id = $1 AND id = $2",
        )
        .bind(bucket_id)
        .bind(id)
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_meta_data(
        &self,
        bucket_id: &str,
        id: &str,
        meta_data: &serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE files SET meta_data = $3, updated_at = NOW() WHERE bucket_id = $1 AND id = $2",
        )
        .bind(bucket_id)
        .bind(id)
        .bind(meta_data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_encrypted_meta_data(
        &self,
        bucket_id: &str,
        id: &str,
        encrypted_meta_data: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE files SET encrypted_meta_data = $3, updated_at = NOW() \
             WHERE bucket_id = $1 AND id = $2",
        )
        .bind(bucket_id)
        .bind(id)
        .bind(encrypted_meta_data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn rebind_parent(
        &self,
        bucket_id: &str,
        id: &str,
        new_parent_id: &str,
        new_name: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE files SET parent_directory_id = $3, name = $4, updated_at = NOW() \
             WHERE bucket_id = $1 AND id = $2",
        )
        .bind(bucket_id)
        .bind(id)
        .bind(new_parent_id)
        .bind(new_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_size(&self, bucket_id: &str, id: &str, size: i64) -> Result<()> {
        sqlx::query(
            "UPDATE files SET size_after_encryption_bytes = $3, updated_at = NOW() \
             WHERE bucket_id = $1 AND id = $2",
        )
        .bind(bucket_id)
        .bind(id)
        .bind(size)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn touch_content_updated_at(&self, bucket_id: &str, id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE files SET content_updated_at = NOW(), updated_at = NOW() \
             WHERE bucket_id = $1 AND id = $2",
        )
        .bind(bucket_id)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, bucket_id: &str, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM files WHERE bucket_id = $1 AND id = $2")
            .bind(bucket_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
