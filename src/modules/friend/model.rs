use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::{notification::schema::NotificationEntity, user::schema::UserEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendResponse {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<UserEntity> for FriendResponse {
    fn from(user: UserEntity) -> Self {
        FriendResponse {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
        }
    }
}

/// A user reference that carries the profile when one is mirrored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IdOrInfo {
    Id(Uuid),
    Info(FriendResponse),
}

impl IdOrInfo {
    pub fn from_profiles(profiles: &HashMap<Uuid, UserEntity>, id: Uuid) -> Self {
        match profiles.get(&id) {
            Some(user) => IdOrInfo::Info(FriendResponse::from(user.clone())),
            None => IdOrInfo::Id(id),
        }
    }

    #[cfg(test)]
    pub fn id(&self) -> Uuid {
        match self {
            IdOrInfo::Id(id) => *id,
            IdOrInfo::Info(info) => info.id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestResponse {
    pub id: Uuid,
    pub from: IdOrInfo,
    pub to: IdOrInfo,
    pub message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FriendRequestResponse {
    pub fn new(request: NotificationEntity, from: IdOrInfo, to: IdOrInfo) -> Self {
        FriendRequestResponse {
            id: request.id,
            from,
            to,
            message: request.message,
            created_at: request.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestBody {
    pub recipient_id: Uuid,
    #[validate(length(max = 255, message = "Message must be at most 255 characters long"))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FriendshipStatus {
    #[serde(rename = "self")]
    Myself,
    None,
    Friends,
    #[serde(rename_all = "camelCase")]
    OutgoingPending { request_id: Uuid },
    #[serde(rename_all = "camelCase")]
    IncomingPending { request_id: Uuid },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendCountResponse {
    pub user_id: Uuid,
    pub count: i64,
}
