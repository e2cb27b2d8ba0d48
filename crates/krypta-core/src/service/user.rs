//! User lookups and profile updates

use crate::error::{Error, Result};
use crate::model::{User, UserListItem};
use crate::repo::UserRepo;
use std::collections::HashSet;

#[derive(Clone, Debug)]
pub struct UserService {
    repo: UserRepo,
}

impl UserService {
    pub fn new(repo: UserRepo) -> Self {
        Self { repo }
    }

    pub async fn find_by_id_or_fail(&self, id: &str) -> Result<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::user("USER_NOT_FOUND", "The requested user could not be found."))
    }

    pub async fn find_by_user_name(&self, user_name: &str) -> Result<Option<User>> {
        self.repo.find_by_user_name(user_name).await
    }

    pub async fn list_all(&self) -> Result<Vec<UserListItem>> {
        self.repo.list_all().await
    }

    pub async fn update_display_name(&self, id: &str, display_name: &str) -> Result<()> {
        self.repo.update_display_name(id, display_name).await
    }

    pub async fn update_password(&self, id: &str, hash: &str, salt: &str) -> Result<()> {
        self.repo.update_password(id, hash, salt).await
    }

    pub async fn set_banning_status(&self, id: &str, is_banned: bool) -> Result<()> {
        self.repo.update_ban_status(id, is_banned).await
    }

    /// Look up users by id and/or user name, deduplicated by id.
    pub async fn query(&self, user_ids: &[String], user_names: &[String]) -> Result<Vec<User>> {
        let mut found = Vec::new();
        if !user_ids.is_empty() {
            found.extend(self.repo.query_by_ids(user_ids).await?);
        }
        if !user_names.is_empty() {
            found.extend(self.repo.query_by_user_names(user_names).await?);
        }

        let mut seen = HashSet::new();
        Ok(found
            .into_iter()
            .filter(|u| seen.insert(u.id.clone()))
            .collect())
    }
}
