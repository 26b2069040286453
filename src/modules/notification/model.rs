use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::{
    friend::model::IdOrInfo,
    notification::schema::{NotificationEntity, NotificationKind, RequestStatus},
};

pub struct NewNotification {
    pub recipient_id: Uuid,
    pub sender_id: Uuid,
    pub kind: NotificationKind,
    pub message: Option<String>,
}

impl NewNotification {
    pub fn friend_request(sender_id: Uuid, recipient_id: Uuid, message: Option<String>) -> Self {
        Self { recipient_id, sender_id, kind: NotificationKind::FriendRequest, message }
    }

    /// Outcome notice for the original sender of a request.
    pub fn request_outcome(request: &NotificationEntity, kind: NotificationKind) -> Self {
        Self {
            recipient_id: request.sender_id,
            sender_id: request.recipient_id,
            kind,
            message: None,
        }
    }

    /// Friend requests start out pending; every other kind has no status.
    pub fn initial_status(&self) -> Option<RequestStatus> {
        match self.kind {
            NotificationKind::FriendRequest => Some(RequestStatus::Pending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub status: Option<RequestStatus>,
    pub sender: IdOrInfo,
    pub message: Option<String>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl NotificationResponse {
    pub fn new(entity: NotificationEntity, sender: IdOrInfo) -> Self {
        NotificationResponse {
            id: entity.id,
            kind: entity.kind,
            status: entity.status,
            sender,
            message: entity.message,
            is_read: entity.is_read,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkedReadResponse {
    pub updated: u64,
}
