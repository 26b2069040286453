use crate::modules::user::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/users")
            .service(get_profile)
            .service(upsert_profile)
            .service(search_users)
            .service(get_user),
    );
}
