use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{
        repository::FriendRepository,
        schema::{canonical_pair, FriendEntity},
    },
};

/// In-process relationship store. Edges are kept in insertion order and checked
/// and written under a single lock.
#[derive(Default)]
pub struct FriendRepositoryMem {
    edges: Mutex<Vec<FriendEntity>>,
}

impl FriendRepositoryMem {
    pub fn new() -> Self {
        Self::default()
    }

    fn edges(&self) -> Result<MutexGuard<'_, Vec<FriendEntity>>, error::SystemError> {
        self.edges.lock().map_err(|_| error::SystemError::internal("friend store lock poisoned"))
    }
}

#[async_trait::async_trait]
impl FriendRepository for FriendRepositoryMem {
    async fn exists(&self, user_id_a: &Uuid, user_id_b: &Uuid) -> Result<bool, error::SystemError> {
        let (user_a, user_b) = canonical_pair(user_id_a, user_id_b);
        Ok(self.edges()?.iter().any(|e| e.user_a == user_a && e.user_b == user_b))
    }

    async fn create_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<FriendEntity, error::SystemError> {
        if user_id_a == user_id_b {
            return Err(error::SystemError::bad_request("Cannot befriend yourself"));
        }

        let (user_a, user_b) = canonical_pair(user_id_a, user_id_b);
        let mut edges = self.edges()?;

        if edges.iter().any(|e| e.user_a == user_a && e.user_b == user_b) {
            return Err(error::SystemError::conflict());
        }

        let edge = FriendEntity { user_a, user_b, created_at: chrono::Utc::now() };
        edges.push(edge.clone());
        Ok(edge)
    }

    async fn delete_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let (user_a, user_b) = canonical_pair(user_id_a, user_id_b);
        let mut edges = self.edges()?;
        let before = edges.len();
        edges.retain(|e| !(e.user_a == user_a && e.user_b == user_b));
        Ok(edges.len() < before)
    }

    async fn find_friend_ids(&self, user_id: &Uuid) -> Result<Vec<Uuid>, error::SystemError> {
        Ok(self.edges()?.iter().filter(|e| e.involves(user_id)).map(|e| e.other(user_id)).collect())
    }

    async fn count_friends(&self, user_id: &Uuid) -> Result<i64, error::SystemError> {
        Ok(self.edges()?.iter().filter(|e| e.involves(user_id)).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_edge_is_symmetric() {
        let repo = FriendRepositoryMem::new();
        let (alice, bob) = (Uuid::now_v7(), Uuid::now_v7());

        repo.create_friendship(&bob, &alice).await.unwrap();

        assert!(repo.exists(&alice, &bob).await.unwrap());
        assert!(repo.exists(&bob, &alice).await.unwrap());
        assert_eq!(repo.find_friend_ids(&alice).await.unwrap(), vec![bob]);
        assert_eq!(repo.find_friend_ids(&bob).await.unwrap(), vec![alice]);
    }

    #[actix_web::test]
    async fn test_create_rejects_either_direction_duplicate() {
        let repo = FriendRepositoryMem::new();
        let (alice, bob) = (Uuid::now_v7(), Uuid::now_v7());

        repo.create_friendship(&alice, &bob).await.unwrap();

        assert!(repo.create_friendship(&alice, &bob).await.unwrap_err().is_conflict());
        assert!(repo.create_friendship(&bob, &alice).await.unwrap_err().is_conflict());
        assert_eq!(repo.count_friends(&alice).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn test_delete_reports_missing_edge() {
        let repo = FriendRepositoryMem::new();
        let (alice, bob) = (Uuid::now_v7(), Uuid::now_v7());
        repo.create_friendship(&alice, &bob).await.unwrap();

        assert!(repo.delete_friendship(&bob, &alice).await.unwrap());
        assert!(!repo.delete_friendship(&alice, &bob).await.unwrap());
        assert!(!repo.exists(&alice, &bob).await.unwrap());
    }

    #[actix_web::test]
    async fn test_friend_ids_keep_insertion_order() {
        let repo = FriendRepositoryMem::new();
        let me = Uuid::now_v7();
        let friends: Vec<Uuid> = (0..3).map(|_| Uuid::now_v7()).collect();

        for friend in &friends {
            repo.create_friendship(friend, &me).await.unwrap();
        }

        assert_eq!(repo.find_friend_ids(&me).await.unwrap(), friends);
    }

    #[actix_web::test]
    async fn test_cannot_befriend_self() {
        let repo = FriendRepositoryMem::new();
        let me = Uuid::now_v7();
        assert!(repo.create_friendship(&me, &me).await.is_err());
    }
}
