use crate::modules::notification::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/notifications")
            .service(list_notifications)
            .service(list_pending_notifications)
            .service(unread_count)
            .service(mark_read)
            .service(mark_all_read)
            .service(delete_notification),
    );
}
