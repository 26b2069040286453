use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::schema::FriendEntity;

/// Source of truth for accepted friendships. Implementations key each edge by its
/// canonical pair so lookups ignore argument order and an edge cannot be half-written.
#[async_trait::async_trait]
pub trait FriendRepository {
    async fn exists(&self, user_id_a: &Uuid, user_id_b: &Uuid) -> Result<bool, error::SystemError>;

    /// Fails with `SystemError::Conflict` if the pair is already friends.
    async fn create_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<FriendEntity, error::SystemError>;

    /// Returns `false` when there was no edge to delete.
    async fn delete_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError>;

    /// Opposite-side ids, oldest friendship first.
    async fn find_friend_ids(&self, user_id: &Uuid) -> Result<Vec<Uuid>, error::SystemError>;

    async fn count_friends(&self, user_id: &Uuid) -> Result<i64, error::SystemError>;
}
