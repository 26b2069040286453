use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::constants::USER_SEARCH_LIMIT;
use crate::modules::user::model::{UpsertUser, UserResponse};
use crate::modules::user::repository::UserRepository;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn with_dependencies(repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        self.repo
            .find_by_id(&id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| error::SystemError::not_found("User not found"))
    }

    pub async fn upsert_profile(
        &self,
        id: Uuid,
        profile: UpsertUser,
    ) -> Result<UserResponse, error::SystemError> {
        if profile.username.is_empty() || profile.display_name.is_empty() {
            return Err(error::SystemError::bad_request("Profile fields cannot be blank"));
        }

        let entity = self.repo.upsert(&id, &profile).await?;
        info!("Profile {} synced", id);
        Ok(UserResponse::from(entity))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<UserResponse>, error::SystemError> {
        let users = self.repo.search_users(query.trim(), USER_SEARCH_LIMIT).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }
}
