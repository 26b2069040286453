use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{model::UpsertUser, repository::UserRepository, schema::UserEntity},
};

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn upsert(&self, id: &Uuid, user: &UpsertUser) -> Result<UserEntity, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
        INSERT INTO users (id, username, display_name, avatar_url)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO UPDATE
        SET
            username     = EXCLUDED.username,
            display_name = EXCLUDED.display_name,
            avatar_url   = EXCLUDED.avatar_url,
            updated_at   = NOW()
        RETURNING *
        "#,
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(&user.avatar_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn search_users(
        &self,
        query: &str,
        limit: i32,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        let search_pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));
        let users = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT * FROM users
            WHERE lower(username) LIKE lower($1)
               OR lower(display_name) LIKE lower($1)
            ORDER BY display_name
            LIMIT $2
            "#,
        )
        .bind(&search_pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
