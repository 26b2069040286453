use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{
        repository::FriendRepository,
        schema::{canonical_pair, FriendEntity},
    },
};

#[derive(Clone)]
pub struct FriendRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FriendRepository for FriendRepositoryPg {
    async fn exists(&self, user_id_a: &Uuid, user_id_b: &Uuid) -> Result<bool, error::SystemError> {
        let (user_a, user_b) = canonical_pair(user_id_a, user_id_b);

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM friends WHERE user_a = $1 AND user_b = $2)",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
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

        // primary key violation surfaces as SystemError::Conflict
        let friendship = sqlx::query_as::<_, FriendEntity>(
            "INSERT INTO friends (user_a, user_b) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_one(&self.pool)
        .await?;

        Ok(friendship)
    }

    async fn delete_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let (user_a, user_b) = canonical_pair(user_id_a, user_id_b);

        let rows = sqlx::query("DELETE FROM friends WHERE user_a = $1 AND user_b = $2")
            .bind(user_a)
            .bind(user_b)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }

    async fn find_friend_ids(&self, user_id: &Uuid) -> Result<Vec<Uuid>, error::SystemError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT CASE WHEN f.user_a = $1 THEN f.user_b ELSE f.user_a END
            FROM friends f
            WHERE f.user_a = $1
               OR f.user_b = $1
            ORDER BY f.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn count_friends(&self, user_id: &Uuid) -> Result<i64, error::SystemError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM friends WHERE user_a = $1 OR user_b = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
