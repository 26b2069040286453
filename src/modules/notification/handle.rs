use actix_web::{HttpRequest, delete, get, patch, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::notification::{
        model::{MarkedReadResponse, NotificationResponse, UnreadCountResponse},
        service::NotificationService,
    },
};

#[get("/")]
pub async fn list_notifications(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<NotificationResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let notifications = notification_service.list_notifications(user_id).await?;
    Ok(success::Success::ok(Some(notifications)).message("Notifications retrieved successfully"))
}

#[get("/pending")]
pub async fn list_pending_notifications(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<NotificationResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let notifications = notification_service.list_pending_notifications(user_id).await?;
    Ok(success::Success::ok(Some(notifications)))
}

#[get("/unread-count")]
pub async fn unread_count(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
) -> Result<success::Success<UnreadCountResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let unread = notification_service.unread_count(user_id).await?;
    Ok(success::Success::ok(Some(UnreadCountResponse { unread })))
}

#[patch("/{notification_id}/read")]
pub async fn mark_read(
    notification_service: web::Data<NotificationService>,
    notification_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    notification_service.mark_read(user_id, *notification_id).await?;
    Ok(success::Success::no_content())
}

#[post("/read-all")]
pub async fn mark_all_read(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
) -> Result<success::Success<MarkedReadResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let updated = notification_service.mark_all_read(user_id).await?;
    Ok(success::Success::ok(Some(MarkedReadResponse { updated }))
        .message("Notifications marked as read"))
}

#[delete("/{notification_id}")]
pub async fn delete_notification(
    notification_service: web::Data<NotificationService>,
    notification_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    notification_service.delete_notification(*notification_id, user_id).await?;
    Ok(success::Success::no_content())
}
