use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    FriendRequest,
    FriendAccepted,
    FriendRejected,
}

/// Lifecycle of a `friend_request` notification. Other kinds carry no status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationEntity {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Uuid,
    #[sqlx(rename = "type")]
    pub kind: NotificationKind,
    pub status: Option<RequestStatus>,
    pub message: Option<String>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl NotificationEntity {
    pub fn is_pending_request(&self) -> bool {
        self.kind == NotificationKind::FriendRequest && self.status == Some(RequestStatus::Pending)
    }

    /// Whether this notification links `a` and `b`, in either direction.
    pub fn involves_pair(&self, a: &Uuid, b: &Uuid) -> bool {
        (self.sender_id == *a && self.recipient_id == *b)
            || (self.sender_id == *b && self.recipient_id == *a)
    }
}
