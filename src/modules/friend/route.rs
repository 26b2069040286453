use crate::modules::friend::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/friends")
            .service(send_friend_request)
            .service(accept_friend_request)
            .service(decline_friend_request)
            .service(cancel_friend_request)
            .service(list_friend_requests)
            .service(list_friends)
            .service(list_friends_of)
            .service(count_friends)
            .service(friendship_status)
            .service(remove_friend),
    );
}
