use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{model::UpsertUser, schema::UserEntity},
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;

    /// Missing ids are skipped; result order is unspecified.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError>;

    /// Profiles keyed by id, for rendering user references.
    async fn find_profiles(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, UserEntity>, error::SystemError> {
        let users = self.find_by_ids(ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    async fn upsert(&self, id: &Uuid, user: &UpsertUser) -> Result<UserEntity, error::SystemError>;

    /// Search users by username or display name (case-insensitive, partial match)
    async fn search_users(
        &self,
        query: &str,
        limit: i32,
    ) -> Result<Vec<UserEntity>, error::SystemError>;
}
