//! Directory tree operations

use crate::error::{Error, Result};
use crate::ident;
use crate::model::{Directory, File};
use crate::repo::{DirectoryRepo, FileRepo};
use chrono::Utc;

#[derive(Clone, Debug)]
pub struct DirectoryService {
    directories: DirectoryRepo,
    files: FileRepo,
}

impl DirectoryService {
    pub fn new(directories: DirectoryRepo, files: FileRepo) -> Self {
        Self { directories, files }
    }

    pub async fn find_by_id(&self, bucket_id: &str, directory_id: &str) -> Result<Option<Directory>> {
        self.directories.find_by_id(bucket_id, directory_id).await
    }

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
            .directories
            .find_by_name_and_parent(bucket_id, Some(parent_directory_id), name)
            .await?;
        if existing.is_some() {
            return Err(Error::user(
                "DUPLICATE_DIRECTORY_NAME",
                "A directory with this name already exists in the parent.",
            ));
        }

        let now = Utc::now();
        let directory = Directory {
            id: ident::new_id(),
            bucket_id: bucket_id.to_owned(),
            parent_directory_id: Some(parent_directory_id.to_owned()),
            name: name.to_owned(),
            meta_data,
            encrypted_meta_data: encrypted_meta_data.to_owned(),
            created_by_user_id: created_by_user_id.to_owned(),
            created_at: now,
            updated_at: now,
        };
        self.directories.create(&directory).await?;
        Ok(directory.id)
    }

    /// The directory plus its immediate children, directories and files in
    /// separate lists, each sorted by name.
    pub async fn contents(
        &self,
        bucket_id: &str,
        directory_id: &str,
    ) -> Result<(Directory, Vec<Directory>, Vec<File>)> {
        let directory = self
            .directories
            .find_by_id(bucket_id, directory_id)
            .await?
            .ok_or_else(|| {
                Error::user(
                    "DIRECTORY_NOT_IN_BUCKET",
                    "The requested directory could not be found in this bucket.",
                )
            })?;
        let child_directories = self.directories.list_children(bucket_id, directory_id).await?;
        let child_files = self.files.list_by_directory(bucket_id, directory_id).await?;
        Ok((directory, child_directories, child_files))
    }

    pub async fn rename(&self, bucket_id: &str, directory_id: &str, name: &str) -> Result<()> {
        self.directories.update_name(bucket_id, directory_id, name).await
    }

    pub async fn set_meta_data(
        &self,
        bucket_id: &str,
        directory_id: &str,
        meta_data: serde_json::Value,
    ) -> Result<()> {
        self.directories
            .update_meta_data(bucket_id, directory_id, &meta_data)
            .await
    }

    pub async fn set_encrypted_meta_data(
        &self,
        bucket_id: &str,
        directory_id: &str,
        encrypted_meta_data: &str,
    ) -> Result<()> {
        self.directories
            .update_encrypted_meta_data(bucket_id, directory_id, encrypted_meta_data)
            .await
    }

    /// Walk upward from `start_id`; true if `ancestor_id` is reached.
    /// Bounded by tree depth since creation and moves preserve acyclicity.
    async fn is_descendant_of(
        &self,
        bucket_id: &str,
        start_id: &str,
        ancestor_id: &str,
    ) -> Result<bool> {
        let mut current = start_id.to_owned();
        loop {
            if current == ancestor_id {
                return Ok(true);
            }
            let Some(directory) = self.directories.find_by_id(bucket_id, &current).await? else {
                return Ok(false);
            };
            match directory.parent_directory_id {
                Some(parent) => current = parent,
                None => return Ok(false),
            }
        }
    }

    /// Re-parent a directory. Moving onto itself or into any of its own
    /// descendants is rejected before any state changes.
    pub async fn rebind_parent(
        &self,
        bucket_id: &str,
        directory_id: &str,
        new_parent_directory_id: &str,
        new_name: &str,
    ) -> Result<()> {
        if self
            .is_descendant_of(bucket_id, new_parent_directory_id, directory_id)
            .await?
        {
            return Err(Error::user(
                "INVALID_MOVE",
                "Cannot move a directory into its own descendant.",
            ));
        }
        self.directories
            .rebind_parent(bucket_id, directory_id, Some(new_parent_directory_id), new_name)
            .await
    }

    /// Delete the directory; descendants, files, and blob records go with
    /// it through the metadata store's referential rules.
    pub async fn delete(&self, bucket_id: &str, directory_id: &str) -> Result<()> {
        self.directories.delete(bucket_id, directory_id).await
    }

    pub async fn find_root(&self, bucket_id: &str) -> Result<Option<Directory>> {
        self.directories.find_root(bucket_id).await
    }
}
