use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::{friend::model::FriendshipStatus, user::schema::UserEntity};

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProfileModel {
    #[validate(length(min = 3, max = 32, message = "Username must be 3 to 32 characters long"))]
    pub username: String,
    #[validate(length(min = 1, max = 64, message = "Display name must be 1 to 64 characters long"))]
    pub display_name: String,
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct SearchUsersQuery {
    #[validate(length(min = 1, max = 64, message = "Search query must be 1 to 64 characters long"))]
    pub q: String,
}

pub struct UpsertUser {
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<UpsertProfileModel> for UpsertUser {
    fn from(model: UpsertProfileModel) -> Self {
        UpsertUser {
            username: model.username.trim().to_string(),
            display_name: model.display_name.trim().to_string(),
            avatar_url: model.avatar_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: uuid::Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<UserEntity> for UserResponse {
    fn from(entity: UserEntity) -> Self {
        UserResponse {
            id: entity.id,
            username: entity.username,
            display_name: entity.display_name,
            avatar_url: entity.avatar_url,
        }
    }
}

/// Search hit annotated with how the caller relates to that user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchResult {
    #[serde(flatten)]
    pub user: UserResponse,
    pub relationship: FriendshipStatus,
}
