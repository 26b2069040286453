use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Undirected friendship edge, stored once with `user_a < user_b`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendEntity {
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FriendEntity {
    /// The side of the edge that is not `user_id`.
    pub fn other(&self, user_id: &Uuid) -> Uuid {
        if self.user_a == *user_id { self.user_b } else { self.user_a }
    }

    pub fn involves(&self, user_id: &Uuid) -> bool {
        self.user_a == *user_id || self.user_b == *user_id
    }
}

/// Canonical `(min, max)` ordering of a pair, independent of argument order.
pub fn canonical_pair(user_id_a: &Uuid, user_id_b: &Uuid) -> (Uuid, Uuid) {
    if user_id_a <= user_id_b { (*user_id_a, *user_id_b) } else { (*user_id_b, *user_id_a) }
}
