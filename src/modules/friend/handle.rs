use actix_web::{HttpRequest, delete, get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::friend::{
        model::{
            FriendCountResponse, FriendRequestBody, FriendRequestResponse, FriendResponse,
            FriendshipStatus, IdOrInfo,
        },
        service::FriendService,
    },
    utils::ValidatedJson,
};

#[post("/requests")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendService>,
    body: ValidatedJson<FriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestResponse>, error::Error> {
    let sender_id = get_claims(&req)?.sub;
    let FriendRequestBody { recipient_id, message } = body.0;
    let request = friend_service.send_friend_request(sender_id, recipient_id, message).await?;

    Ok(success::Success::created(Some(request)).message("Friend request sent successfully"))
}

#[post("/requests/{request_id}/accept")]
pub async fn accept_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<IdOrInfo>, error::Error> {
    let recipient_id = get_claims(&req)?.sub;
    let sender = friend_service.accept_friend_request(recipient_id, *request_id).await?;

    Ok(success::Success::ok(Some(sender)).message("Friend request accepted successfully"))
}

#[post("/requests/{request_id}/decline")]
pub async fn decline_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let recipient_id = get_claims(&req)?.sub;
    friend_service.decline_friend_request(recipient_id, *request_id).await?;
    Ok(success::Success::no_content())
}

#[delete("/requests/{request_id}")]
pub async fn cancel_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let sender_id = get_claims(&req)?.sub;
    friend_service.cancel_friend_request(sender_id, *request_id).await?;
    Ok(success::Success::no_content())
}

#[get("/requests")]
pub async fn list_friend_requests(
    friend_service: web::Data<FriendService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendRequestResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let requests = friend_service.get_friend_requests(user_id).await?;

    Ok(success::Success::ok(Some(requests)).message("Friend requests retrieved successfully"))
}

#[get("/")]
pub async fn list_friends(
    friend_service: web::Data<FriendService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let friends = friend_service.get_friends(user_id).await?;

    Ok(success::Success::ok(Some(friends)).message("Friends retrieved successfully"))
}

#[get("/users/{user_id}")]
pub async fn list_friends_of(
    friend_service: web::Data<FriendService>,
    user_id: web::Path<Uuid>,
) -> Result<success::Success<Vec<FriendResponse>>, error::Error> {
    let friends = friend_service.get_friends(*user_id).await?;
    Ok(success::Success::ok(Some(friends)))
}

#[get("/users/{user_id}/count")]
pub async fn count_friends(
    friend_service: web::Data<FriendService>,
    user_id: web::Path<Uuid>,
) -> Result<success::Success<FriendCountResponse>, error::Error> {
    let user_id = user_id.into_inner();
    let count = friend_service.count_friends(user_id).await?;
    Ok(success::Success::ok(Some(FriendCountResponse { user_id, count })))
}

#[get("/status/{user_id}")]
pub async fn friendship_status(
    friend_service: web::Data<FriendService>,
    other_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<FriendshipStatus>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let status = friend_service.friendship_status(user_id, *other_id).await?;
    Ok(success::Success::ok(Some(status)))
}

#[delete("/{friend_id}")]
pub async fn remove_friend(
    friend_service: web::Data<FriendService>,
    friend_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    friend_service.remove_friend(user_id, *friend_id).await?;
    Ok(success::Success::no_content())
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, middleware::from_fn, test};

    use super::*;
    use crate::{
        middlewares::authentication,
        test::Fixture,
        utils::{Claims, JwtSecret},
    };

    const SECRET: &str = "handler-test-secret";

    fn bearer(user_id: Uuid) -> (&'static str, String) {
        let token = Claims::new(&user_id, 60).encode(SECRET.as_bytes()).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    macro_rules! friends_app {
        ($fx:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($fx.friend_service.clone()))
                    .app_data(web::Data::new(JwtSecret(SECRET.to_string())))
                    .wrap(from_fn(authentication))
                    .configure(crate::modules::friend::route::configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_request_flow_over_http() {
        let fx = Fixture::new().await;
        let (alice, bob) = (fx.user("alice").await, fx.user("bob").await);
        let app = friends_app!(fx);

        let req = test::TestRequest::post()
            .uri("/friends/requests")
            .insert_header(bearer(alice))
            .set_json(serde_json::json!({ "recipientId": bob, "message": "hey" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(res).await;
        let request_id = body["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/friends/requests")
            .insert_header(bearer(bob))
            .set_json(serde_json::json!({ "recipientId": alice }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri(&format!("/friends/requests/{request_id}/accept"))
            .insert_header(bearer(alice))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri(&format!("/friends/requests/{request_id}/accept"))
            .insert_header(bearer(bob))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&format!("/friends/status/{alice}"))
            .insert_header(bearer(bob))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["state"], "friends");

        let req = test::TestRequest::get()
            .uri(&format!("/friends/users/{alice}/count"))
            .insert_header(bearer(bob))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["count"], 1);

        for expected in [StatusCode::NO_CONTENT, StatusCode::NOT_FOUND] {
            let req = test::TestRequest::delete()
                .uri(&format!("/friends/{bob}"))
                .insert_header(bearer(alice))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), expected);
        }
    }

    #[actix_web::test]
    async fn test_request_validation_and_auth() {
        let fx = Fixture::new().await;
        let alice = fx.user("alice").await;
        let app = friends_app!(fx);

        let req = test::TestRequest::post()
            .uri("/friends/requests")
            .insert_header(bearer(alice))
            .set_json(serde_json::json!({ "recipientId": alice }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/friends/requests")
            .insert_header(bearer(alice))
            .set_json(serde_json::json!({ "recipientId": Uuid::now_v7(), "message": "x".repeat(300) }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/friends/requests").to_request();
        let res = test::try_call_service(&app, req).await;
        let status = match res {
            Ok(res) => res.status(),
            Err(e) => e.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
