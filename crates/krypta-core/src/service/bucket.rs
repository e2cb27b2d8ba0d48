//! Bucket lifecycle and per-bucket authorization rows

use crate::error::{Error, Result};
use crate::ident;
use crate::model::{Bucket, BucketOverview, BucketPermission, Directory};
use crate::repo::{BucketRepo, DirectoryRepo};
use chrono::Utc;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct BucketService {
    buckets: BucketRepo,
    directories: DirectoryRepo,
}

impl BucketService {
    pub fn new(buckets: BucketRepo, directories: DirectoryRepo) -> Self {
        Self {
            buckets,
            directories,
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Bucket>> {
        self.buckets.find_by_id(id).await
    }

    pub async fn permission(
        &self,
        bucket_id: &str,
        user_id: &str,
    ) -> Result<Option<BucketPermission>> {
        self.buckets.find_permission(bucket_id, user_id).await
    }

    /// Create a bucket together with its root directory (named after the
    /// bucket, empty metadata) and a full-permission row for the creator.
    /// The triple commits atomically.
    pub async fn create(
        &self,
        name: &str,
        crypt_spec: &str,
        crypt_data: &str,
        meta_data: serde_json::Value,
        created_by_user_id: &str,
    ) -> Result<(Bucket, String)> {
        if self.buckets.find_by_name(name).await?.is_some() {
            return Err(Error::user(
                "DUPLICATE_BUCKET_NAME",
                "A bucket with this name already exists.",
            ));
        }

        let now = Utc::now();
        let bucket = Bucket {
            id: ident::new_id(),
            name: name.to_owned(),
            crypt_spec: crypt_spec.to_owned(),
            crypt_data: crypt_data.to_owned(),
            meta_data,
            created_by_user_id: created_by_user_id.to_owned(),
            created_at: now,
            updated_at: now,
        };
        let root = Directory {
            id: ident::new_id(),
            bucket_id: bucket.id.clone(),
            parent_directory_id: None,
            name: name.to_owned(),
            meta_data: serde_json::json!({}),
            encrypted_meta_data: String::new(),
            created_by_user_id: created_by_user_id.to_owned(),
            created_at: now,
            updated_at: now,
        };
        let creator_permission = BucketPermission {
            id: 0,
            bucket_id: bucket.id.clone(),
            user_id: created_by_user_id.to_owned(),
            notes: "Created this bucket".to_owned(),
            perm_modify: true,
            perm_manage_authorization: true,
            perm_destroy: true,
            perm_view_content: true,
            perm_manage_content: true,
            created_at: now,
            updated_at: now,
        };

        self.buckets
            .create_bucket_graph(&bucket, &root, &creator_permission)
            .await?;
        Ok((bucket, root.id))
    }

    /// Every bucket the user holds a permission row for, joined with its
    /// root directory id and full authorization list.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<BucketOverview>> {
        let bucket_ids = self.buckets.list_bucket_ids_for_user(user_id).await?;
        if bucket_ids.is_empty() {
            return Ok(Vec::new());
        }

        let roots = self.directories.list_roots(&bucket_ids).await?;
        let root_by_bucket: HashMap<&str, &str> = roots
            .iter()
            .map(|d| (d.bucket_id.as_str(), d.id.as_str()))
            .collect();

        let mut overviews = Vec::with_capacity(bucket_ids.len());
        for bucket_id in &bucket_ids {
            let Some(bucket) = self.buckets.find_by_id(bucket_id).await? else {
                continue;
            };
            let authorizations = self.buckets.list_permissions(bucket_id).await?;
            overviews.push(BucketOverview {
                root_directory_id: root_by_bucket
                    .get(bucket_id.as_str())
                    .map(|id| (*id).to_owned())
                    .unwrap_or_default(),
                bucket,
                authorizations,
            });
        }
        Ok(overviews)
    }

    pub async fn rename(&self, bucket_id: &str, name: &str) -> Result<()> {
        if let Some(existing) = self.buckets.find_by_name(name).await? {
            if existing.id != bucket_id {
                return Err(Error::user(
                    "DUPLICATE_BUCKET_NAME",
                    "A bucket with this name already exists.",
                ));
            }
        }
        self.buckets.update_name(bucket_id, name).await
    }

    pub async fn set_meta_data(&self, bucket_id: &str, meta_data: serde_json::Value) -> Result<()> {
        self.buckets.update_meta_data(bucket_id, &meta_data).await
    }

    /// Delete the bucket row; everything the bucket owns cascades.
    pub async fn destroy(&self, bucket_id: &str) -> Result<()> {
        self.buckets.delete(bucket_id).await
    }

    /// Grant or revoke bucket permissions for a user. A first-time grant
    /// creates the row with a note recording who authorized it; named
    /// flags overwrite, absent flags keep their value.
    pub async fn set_authorization(
        &self,
        bucket_id: &str,
        target_user_id: &str,
        permissions_to_set: &HashMap<String, bool>,
        authorizing_user_name: &str,
    ) -> Result<()> {
        let mut row = match self.buckets.find_permission(bucket_id, target_user_id).await? {
            Some(row) => row,
            None => {
                let now = Utc::now();
                let row = BucketPermission {
                    id: 0,
                    bucket_id: bucket_id.to_owned(),
                    user_id: target_user_id.to_owned(),
                    notes: format!("Authorized by @{authorizing_user_name}"),
                    perm_modify: false,
                    perm_manage_authorization: false,
                    perm_destroy: false,
                    perm_view_content: false,
                    perm_manage_content: false,
                    created_at: now,
                    updated_at: now,
                };
                self.buckets.create_permission(&row).await?;
                row
            }
        };
        row.apply(permissions_to_set);
        self.buckets.update_permission(&row).await
    }
}
