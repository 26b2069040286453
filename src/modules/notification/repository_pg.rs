use uuid::Uuid;

use crate::{
    api::error,
    modules::notification::{
        model::NewNotification,
        repository::NotificationRepository,
        schema::{NotificationEntity, NotificationKind, RequestStatus},
    },
};

#[derive(Clone)]
pub struct NotificationRepositoryPg {
    pool: sqlx::PgPool,
}

impl NotificationRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl NotificationRepository for NotificationRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<NotificationEntity>, error::SystemError> {
        let notification =
            sqlx::query_as::<_, NotificationEntity>("SELECT * FROM notifications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(notification)
    }

    async fn find_pending_request_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<NotificationEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, NotificationEntity>(
            r#"
            SELECT *
            FROM notifications
            WHERE type = $3
              AND status = $4
              AND (
                    (sender_id = $1 AND recipient_id = $2)
                 OR (sender_id = $2 AND recipient_id = $1)
              )
            "#,
        )
        .bind(user_id_a)
        .bind(user_id_b)
        .bind(NotificationKind::FriendRequest)
        .bind(RequestStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_by_recipient(
        &self,
        recipient_id: &Uuid,
    ) -> Result<Vec<NotificationEntity>, error::SystemError> {
        let notifications = sqlx::query_as::<_, NotificationEntity>(
            "SELECT * FROM notifications WHERE recipient_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    async fn find_pending_requests_from(
        &self,
        sender_id: &Uuid,
    ) -> Result<Vec<NotificationEntity>, error::SystemError> {
        let requests = sqlx::query_as::<_, NotificationEntity>(
            r#"
            SELECT *
            FROM notifications
            WHERE sender_id = $1 AND type = $2 AND status = $3
            ORDER BY created_at DESC
            "#,
        )
        .bind(sender_id)
        .bind(NotificationKind::FriendRequest)
        .bind(RequestStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationEntity, error::SystemError> {
        let created = sqlx::query_as::<_, NotificationEntity>(
            r#"
            INSERT INTO notifications (id, recipient_id, sender_id, type, status, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(notification.recipient_id)
        .bind(notification.sender_id)
        .bind(notification.kind)
        .bind(notification.initial_status())
        .bind(&notification.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn transition_request(
        &self,
        id: &Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<Option<NotificationEntity>, error::SystemError> {
        let updated = sqlx::query_as::<_, NotificationEntity>(
            r#"
            UPDATE notifications
            SET status = $3
            WHERE id = $1 AND type = $4 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(NotificationKind::FriendRequest)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }

    async fn mark_read(&self, id: &Uuid, recipient_id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND recipient_id = $2",
        )
        .bind(id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows > 0)
    }

    async fn mark_all_read(&self, recipient_id: &Uuid) -> Result<u64, error::SystemError> {
        let rows = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows)
    }
}
