use actix_web::{HttpRequest, get, put, web};
use uuid::Uuid;

use crate::middlewares::get_claims;
use crate::modules::{
    friend::service::FriendService,
    user::{model, service::UserService},
};
use crate::{
    api::{error, success},
    utils::{ValidatedJson, ValidatedQuery},
};

#[get("/me")]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let id = get_claims(&req)?.sub;
    let user = user_service.get_by_id(id).await?;
    Ok(success::Success::ok(Some(user)).message("Profile retrieved successfully"))
}

#[put("/me")]
pub async fn upsert_profile(
    user_service: web::Data<UserService>,
    body: ValidatedJson<model::UpsertProfileModel>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let id = get_claims(&req)?.sub;
    let user = user_service.upsert_profile(id, body.0.into()).await?;
    Ok(success::Success::ok(Some(user)).message("Profile updated successfully"))
}

#[get("/search")]
pub async fn search_users(
    user_service: web::Data<UserService>,
    friend_service: web::Data<FriendService>,
    query: ValidatedQuery<model::SearchUsersQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<model::UserSearchResult>>, error::Error> {
    let me = get_claims(&req)?.sub;
    let users = user_service.search(&query.0.q).await?;

    let statuses = futures_util::future::try_join_all(
        users.iter().map(|user| friend_service.friendship_status(me, user.id)),
    )
    .await?;

    let results = users
        .into_iter()
        .zip(statuses)
        .map(|(user, relationship)| model::UserSearchResult { user, relationship })
        .collect();
    Ok(success::Success::ok(Some(results)).message("Users retrieved successfully"))
}

#[get("/{id:[0-9a-fA-F-]{36}}")]
pub async fn get_user(
    user_service: web::Data<UserService>,
    user_id: web::Path<Uuid>,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let user = user_service.get_by_id(user_id.into_inner()).await?;
    Ok(success::Success::ok(Some(user)).message("User retrieved successfully"))
}
