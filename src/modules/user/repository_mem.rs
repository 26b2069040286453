use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{model::UpsertUser, repository::UserRepository, schema::UserEntity},
};

/// In-process profile store used by the `memory` storage backend and by tests.
#[derive(Default)]
pub struct UserRepositoryMem {
    users: Mutex<HashMap<Uuid, UserEntity>>,
}

impl UserRepositoryMem {
    pub fn new() -> Self {
        Self::default()
    }

    fn users(&self) -> Result<MutexGuard<'_, HashMap<Uuid, UserEntity>>, error::SystemError> {
        self.users.lock().map_err(|_| error::SystemError::internal("user store lock poisoned"))
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryMem {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.users()?.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError> {
        let users = self.users()?;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn upsert(&self, id: &Uuid, user: &UpsertUser) -> Result<UserEntity, error::SystemError> {
        let mut users = self.users()?;

        let taken = users
            .values()
            .any(|u| u.id != *id && u.username == user.username);
        if taken {
            return Err(error::SystemError::conflict());
        }

        let now = chrono::Utc::now();
        let entity = users
            .entry(*id)
            .and_modify(|existing| {
                existing.username = user.username.clone();
                existing.display_name = user.display_name.clone();
                existing.avatar_url = user.avatar_url.clone();
                existing.updated_at = now;
            })
            .or_insert_with(|| UserEntity {
                id: *id,
                username: user.username.clone(),
                display_name: user.display_name.clone(),
                avatar_url: user.avatar_url.clone(),
                created_at: now,
                updated_at: now,
            });

        Ok(entity.clone())
    }

    async fn search_users(
        &self,
        query: &str,
        limit: i32,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        let needle = query.to_lowercase();
        let mut found: Vec<UserEntity> = self
            .users()?
            .values()
            .filter(|u| {
                u.username.to_lowercase().contains(&needle)
                    || u.display_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        found.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        found.truncate(limit.max(0) as usize);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(username: &str) -> UpsertUser {
        UpsertUser {
            username: username.to_string(),
            display_name: username.to_uppercase(),
            avatar_url: None,
        }
    }

    #[actix_web::test]
    async fn test_upsert_updates_existing_profile() {
        let repo = UserRepositoryMem::new();
        let id = Uuid::now_v7();

        let created = repo.upsert(&id, &profile("alice")).await.unwrap();
        let updated = repo.upsert(&id, &profile("alice_2")).await.unwrap();

        assert_eq!(created.created_at, updated.created_at);
        assert_eq!(repo.find_by_id(&id).await.unwrap().unwrap().username, "alice_2");
    }

    #[actix_web::test]
    async fn test_upsert_rejects_taken_username() {
        let repo = UserRepositoryMem::new();
        repo.upsert(&Uuid::now_v7(), &profile("alice")).await.unwrap();

        let err = repo.upsert(&Uuid::now_v7(), &profile("alice")).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[actix_web::test]
    async fn test_username_uniqueness_is_case_sensitive() {
        let repo = UserRepositoryMem::new();
        repo.upsert(&Uuid::now_v7(), &profile("alice")).await.unwrap();

        // matches the plain UNIQUE constraint on users.username
        let other = repo.upsert(&Uuid::now_v7(), &profile("Alice")).await.unwrap();
        assert_eq!(other.username, "Alice");
    }

    #[actix_web::test]
    async fn test_search_matches_partial_name() {
        let repo = UserRepositoryMem::new();
        repo.upsert(&Uuid::now_v7(), &profile("trophyhunter")).await.unwrap();
        repo.upsert(&Uuid::now_v7(), &profile("casual")).await.unwrap();

        let found = repo.search_users("HUNT", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "trophyhunter");
    }
}
