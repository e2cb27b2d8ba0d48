//! `buckets` and `bucket_user_permissions` tables

use crate::error::Result;
use crate::model::{Bucket, BucketPermission, Directory};
use sqlx::PgPool;

const BUCKET_COLUMNS: &str = "id, name, crypt_spec, crypt_data, meta_data, \
     created_by_user_id, created_at, updated_at";

const PERMISSION_COLUMNS: &str = "id, bucket_id, user_id, notes, \
     perm_modify, perm_manage_authorization, perm_destroy, \
     perm_view_content, perm_manage_content, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct BucketRepo {
    pool: PgPool,
}

impl BucketRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Bucket>> {
        let bucket = sqlx::query_as::<_, Bucket>(&format!(
            "SELECT {BUCKET_COLUMNS} FROM buckets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bucket)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Bucket>> {
        let bucket = sqlx::query_as::<_, Bucket>(&format!(
            "SELECT {BUCKET_COLUMNS} FROM buckets WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bucket)
    }

    /// Insert the bucket, its root directory, and the creator's
    /// full-permission row in one transaction: either the whole graph
    /// exists or none of it does.
    pub async fn create_bucket_graph(
        &self,
        bucket: &Bucket,
        root: &Directory,
        creator_permission: &BucketPermission,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO buckets (id, name, crypt_spec, crypt_data, meta_data, created_by_user_id) \
             VALUES ($1,$2,$3,$4,$5,$6)",
        )
        .bind(&bucket.id)
        .bind(&bucket.name)
        .bind(&bucket.crypt_spec)
        .bind(&bucket.crypt_data)
        .bind(&bucket.meta_data)
        .bind(&bucket.created_by_user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO directories \
                 (id, bucket_id, parent_directory_id, name, meta_data, encrypted_meta_data, \
                  created_by_user_id) \
             VALUES ($1,$2,$3,$4,$5,$6,$7)",
        )
        .bind(&root.id)
        .bind(&root.bucket_id)
        .bind(&root.parent_directory_id)
        .bind(&root.name)
        .bind(&root.meta_data)
        .bind(&root.encrypted_meta_data)
        .bind(&root.created_by_user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO bucket_user_permissions \
                 (bucket_id, user_id, notes, perm_modify, perm_manage_authorization, \
                  perm_destroy, perm_view_content, perm_manage_content) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
        )
        .bind(&creator_permission.bucket_id)
        .bind(&creator_permission.user_id)
        .bind(&creator_permission.notes)
        .bind(creator_permission.perm_modify)
        .bind(creator_permission.perm_manage_authorization)
        .bind(creator_permission.perm_destroy)
        .bind(creator_permission.perm_view_content)
        .bind(creator_permission.perm_manage_content)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn update_name(&self, id: &str, name: &str) -> Result<()> {
        sqlx::query("UPDATE buckets SET name = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_meta_data(&self, id: &str, meta_data: &serde_json::Value) -> Result<()> {
        sqlx::query("UPDATE buckets SET meta_data = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(meta_data)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete the bucket row; directories, files, blob records, and
    /// permission rows go with it through `ON DELETE CASCADE`.
    pub async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM buckets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_permission(
        &self,
        bucket_id: &str,
        user_id: &str,
    ) -> Result<Option<BucketPermission>> {
        let permission = sqlx::query_as::<_, BucketPermission>(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM bucket_user_permissions \
             WHERE bucket_id = $1 AND user_id = $2"
        ))
        .bind(bucket_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(permission)
    }

    pub async fn list_permissions(&self, bucket_id: &str) -> Result<Vec<BucketPermission>> {
        let permissions = sqlx::query_as::<_, BucketPermission>(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM bucket_user_permissions WHERE bucket_id = $1"
        ))
        .bind(bucket_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(permissions)
    }

    /// Bucket ids for which the user holds any permission row.
    pub async fn list_bucket_ids_for_user(&self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT bucket_id FROM bucket_user_permissions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn create_permission(&self, permission: &BucketPermission) -> Result<()> {
        sqlx::query(
            "INSERT INTO bucket_user_permissions \
                 (bucket_id, user_id, notes, perm_modify, perm_manage_authorization, \
                  perm_destroy, perm_view_content, perm_manage_content) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
        )
        .bind(&permission.bucket_id)
        .bind(&permission.user_id)
        .bind(&permission.notes)
        .bind(permission.perm_modify)
        .bind(permission.perm_manage_authorization)
        .bind(permission.perm_destroy)
        .bind(permission.perm_view_content)
        .bind(permission.perm_manage_content)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_permission(&self, permission: &BucketPermission) -> Result<()> {
        sqlx::query(
            "UPDATE bucket_user_permissions SET \
                 perm_modify = $3, perm_manage_authorization = $4, perm_destroy = $5, \
                 perm_view_content = $6, perm_manage_content = $7, updated_at = NOW() \
             WHERE bucket_id = $1 AND user_id = $2",
        )
        .bind(&permission.bucket_id)
        .bind(&permission.user_id)
        .bind(permission.perm_modify)
        .bind(permission.perm_manage_authorization)
        .bind(permission.perm_destroy)
        .bind(permission.perm_view_content)
        .bind(permission.perm_manage_content)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
