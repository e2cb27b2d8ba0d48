//! File operations

use crate::error::{Error, Result};
use crate::ident;
use crate::model::File;
use crate::repo::FileRepo;
use chrono::Utc;

#[derive(Clone, Debug)]
pub struct FileService {
    files: FileRepo,
}

impl FileService {
    pub fn new(files: FileRepo) -> Self {
        Self { files }
    }

    pub async fn find_by_id(&self, bucket_id: &str, file_id: &str) -> Result<Option<File>> {
        self.files.find_by_id(bucket_id, file_id).await
    }

    /// Create a file with no content yet (size 0).
    pub async fn create(
        &self,
        name: &str,
        bucket_id: &str,
        parent_directory_id: &str,
        meta_data: serde_json::Value,
        encrypted_meta_data: &str,
        created_by_user_id: &str,
    ) -> Result<String> {
        let existing = self
            .files
            .find_by_name_and_parent(bucket_id, parent_directory_id, name)
            .await?;
        if existing.is_some() {
            return Err(Error::user(
                "DUPLICATE_FILE_NAME",
                "A file with this name already exists in the directory.",
            ));
        }

        let now = Utc::now();
        let file = File {
            id: ident::new_id(),
            bucket_id: bucket_id.to_owned(),
            parent_directory_id: parent_directory_id.to_owned(),
            name: name.to_owned(),
            meta_data,
            encrypted_meta_data: encrypted_meta_data.to_owned(),
            size_after_encryption_bytes: 0,
            created_by_user_id: created_by_user_id.to_owned(),
            created_at: now,
            updated_at: now,
            content_updated_at: now,
        };
        self.files.create(&file).await?;
        Ok(file.id)
    }

    pub async fn rename(&self, bucket_id: &str, file_id: &str, name: &str) -> Result<()> {
        self.files.update_name(bucket_id, file_id, name).await
    }

    pub async fn rebind_parent(
        &self,
        bucket_id: &str,
        file_id: &str,
        new_parent_directory_id: &str,
        new_name: &str,
    ) -> Result<()> {
        let existing = self
            .files
            .find_by_name_and_parent(bucket_id, new_parent_directory_id, new_name)
            .await?;
        if let Some(existing) = existing {
            if existing.id != file_id {
                return Err(Error::user(
                    "DUPLICATE_FILE_NAME",
                    "A file with this name already exists in the target directory.",
                ));
            }
        }
        self.files
            .rebind_parent(bucket_id, file_id, new_parent_directory_id, new_name)
            .await
    }

    pub async fn set_meta_data(
        &self,
        bucket_id: &str,
        file_id: &str,
        meta_data: serde_json::Value,
    ) -> Result<()> {
        self.files.update_meta_data(bucket_id, file_id, &meta_data).await
    }

    pub async fn set_encrypted_meta_data(
        &self,
        bucket_id: &str,
        file_id: &str,
        encrypted_meta_data: &str,
    ) -> Result<()> {
        self.files
            .update_encrypted_meta_data(bucket_id, file_id, encrypted_meta_data)
            .await
    }

    pub async fn update_size(&self, bucket_id: &str, file_id: &str, size: i64) -> Result<()> {
        self.files.update_size(bucket_id, file_id, size).await
    }

    pub async fn touch_content_updated_at(&self, bucket_id: &str, file_id: &str) -> Result<()> {
        self.files.touch_content_updated_at(bucket_id, file_id).await
    }

    pub async fn delete(&self, bucket_id: &str, file_id: &str) -> Result<()> {
        self.files.delete(bucket_id, file_id).await
    }
}
