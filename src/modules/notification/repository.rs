use uuid::Uuid;

use crate::api::error;
use crate::modules::notification::{
    model::NewNotification,
    schema::{NotificationEntity, RequestStatus},
};

#[async_trait::async_trait]
pub trait NotificationRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<NotificationEntity>, error::SystemError>;

    /// Pending friend request between the pair, in either direction.
    async fn find_pending_request_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<NotificationEntity>, error::SystemError>;

    /// Newest first.
    async fn find_by_recipient(
        &self,
        recipient_id: &Uuid,
    ) -> Result<Vec<NotificationEntity>, error::SystemError>;

    async fn find_pending_requests_from(
        &self,
        sender_id: &Uuid,
    ) -> Result<Vec<NotificationEntity>, error::SystemError>;

    /// Fails with `SystemError::Conflict` when a pending friend request already
    /// exists for the same unordered pair.
    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationEntity, error::SystemError>;

    /// Conditional update: moves a friend request from `from` to `to` only if it is
    /// still in `from`. Returns `None` when another caller got there first.
    async fn transition_request(
        &self,
        id: &Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<Option<NotificationEntity>, error::SystemError>;

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;

    async fn mark_read(&self, id: &Uuid, recipient_id: &Uuid) -> Result<bool, error::SystemError>;

    async fn mark_all_read(&self, recipient_id: &Uuid) -> Result<u64, error::SystemError>;
}
