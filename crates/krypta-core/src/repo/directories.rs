//! `directories` table

use crate::error::Result;
use crate::model::Directory;
use sqlx::PgPool;

const DIRECTORY_COLUMNS: &str = "id, bucket_id, parent_directory_id, name, meta_data, \
     encrypted_meta_data, created_by_user_id, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct DirectoryRepo {
    pool: PgPool,
}

impl DirectoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, bucket_id: &str, id: &str) -> Result<Option<Directory>> {
        let directory = sqlx::query_as::<_, Directory>(&format!(
            "SELECT {DIRECTORY_COLUMNS} FROM directories WHERE bucket_id = $1 AND id = $2"
        ))
        .bind(bucket_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(directory)
    }

    pub async fn find_by_name_and_parent(
        &self,
        bucket_id: &str,
        parent_directory_id: Option<&str>,
        name: &str,
    ) -> Result<Option<Directory>> {
        let directory = sqlx::query_as::<_, Directory>(&format!(
            "SELECT {DIRECTORY_COLUMNS} FROM directories \
             WHERE bucket_id = $1 AND name = $2 \
               AND (($3::text IS NULL AND parent_directory_id IS NULL) \
                    OR parent_directory_id = $3)"
        ))
        .bind(bucket_id)
        .bind(name)
        .bind(parent_directory_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(directory)
    }

    pub async fn find_root(&self, bucket_id: &str) -> Result<Option<Directory>> {
        let directory = sqlx::query_as::<_, Directory>(&format!(
            "SELECT {DIRECTORY_COLUMNS} FROM directories \
             WHERE bucket_id = $1 AND parent_directory_id IS NULL"
        ))
        .bind(bucket_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(directory)
    }

    pub async fn list_roots(&self, bucket_ids: &[String]) -> Result<Vec<Directory>> {
        if bucket_ids.is_empty() {
            return Ok(Vec::new());
        }
        let directories = sqlx::query_as::<_, Directory>(&format!(
            "SELECT {DIRECTORY_COLUMNS} FROM directories \
             WHERE bucket_id = ANY($1) AND parent_directory_id IS NULL"
        ))
        .bind(bucket_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(directories)
    }

    pub async fn list_children(
        &self,
        bucket_id: &str,
        parent_directory_id: &str,
    ) -> Result<Vec<Directory>> {
        let directories = sqlx::query_as::<_, Directory>(&format!(
            "SELECT {DIRECTORY_COLUMNS} FROM directories \
             WHERE bucket_id = $1 AND parent_directory_id = $2 ORDER BY name"
        ))
        .bind(bucket_id)
        .bind(parent_directory_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(directories)
    }

    pub async fn create(&self, directory: &Directory) -> Result<()> {
        sqlx::query(
            "INSERT INTO directories \
                 (id, bucket_id, parent_directory_id, name, meta_data, encrypted_meta_data, \
                  created_by_user_id) \
             VALUES ($1,$2,$3,$4,$5,$6,$7)",
        )
        .bind(&directory.id)
        .bind(&directory.bucket_id)
        .bind(&directory.parent_directory_id)
        .bind(&directory.name)
        .bind(&directory.meta_data)
        .bind(&directory.encrypted_meta_data)
        .bind(&directory.created_by_user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_name(&self, bucket_id: &str, id: &str, name: &str) -> Result<()> {
        sqlx::query(
            "UPDATE directories SET name = $3, updated_at = NOW() \
             WHERE bucket_id = $1 AND id = $2",
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
            "UPDATE directories SET meta_data = $3, updated_at = NOW() \
             WHERE bucket_id = $1 AND id = $2",
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
            "UPDATE directories SET encrypted_meta_data = $3, updated_at = NOW() \
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
        new_parent_id: Option<&str>,
        new_name: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE directories SET parent_directory_id = $3, name = $4, updated_at = NOW() \
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

    /// Delete the directory row. Descendant directories, files, and blob
    /// records cascade through the self-referencing foreign key.
    pub async fn delete(&self, bucket_id: &str, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM directories WHERE bucket_id = $1 AND id = $2")
            .bind(bucket_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
