use actix::Actor;
use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::{Arc, LazyLock};
use tracing_subscriber::EnvFilter;

use crate::{
    configs::{RedisCache, connect_database},
    constants::StorageBackend,
    middlewares::authentication,
    modules::{
        friend::{
            repository::FriendRepository, repository_mem::FriendRepositoryMem,
            repository_pg::FriendRepositoryPg, service::FriendService,
        },
        notification::{
            repository::NotificationRepository, repository_mem::NotificationRepositoryMem,
            repository_pg::NotificationRepositoryPg, service::NotificationService,
        },
        user::{
            repository::UserRepository, repository_mem::UserRepositoryMem,
            repository_pg::UserRepositoryPg, service::UserService,
        },
        websocket::{handler::websocket_handler, notifier::WsChangeNotifier, server::WebSocketServer},
    },
    utils::JwtSecret,
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

struct Stores {
    users: Arc<dyn UserRepository + Send + Sync>,
    friends: Arc<dyn FriendRepository + Send + Sync>,
    notifications: Arc<dyn NotificationRepository + Send + Sync>,
}

async fn build_stores() -> std::io::Result<Stores> {
    match ENV.storage_backend {
        StorageBackend::Postgres => {
            let url = ENV.database_url.as_deref().unwrap_or_default();
            let pool = connect_database(url, ENV.database_max_connections).await.map_err(|e| {
                log::error!("Database connection error: {}", e);
                std::io::Error::other("Database connection error")
            })?;
            Ok(Stores {
                users: Arc::new(UserRepositoryPg::new(pool.clone())),
                friends: Arc::new(FriendRepositoryPg::new(pool.clone())),
                notifications: Arc::new(NotificationRepositoryPg::new(pool)),
            })
        }
        StorageBackend::Memory => {
            log::warn!("Using in-memory storage; data is lost on restart");
            Ok(Stores {
                users: Arc::new(UserRepositoryMem::new()),
                friends: Arc::new(FriendRepositoryMem::new()),
                notifications: Arc::new(NotificationRepositoryMem::new()),
            })
        }
    }
}

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let stores = build_stores().await?;

    let ws_server = WebSocketServer::new().start();
    let notifier = Arc::new(WsChangeNotifier::new(ws_server.clone()));

    let user_service = UserService::with_dependencies(stores.users.clone());
    let notification_service = NotificationService::with_dependencies(
        stores.notifications.clone(),
        stores.users.clone(),
        notifier.clone(),
    );
    let mut friend_service = FriendService::with_dependencies(
        stores.friends,
        stores.notifications,
        stores.users,
        notifier,
    );

    if let Some(redis_url) = ENV.redis_url.as_deref() {
        let cache = RedisCache::new(redis_url).await.map_err(|e| {
            log::error!("Redis connection error: {}", e);
            std::io::Error::other("Redis connection error")
        })?;
        friend_service = friend_service.with_cache(Arc::new(cache), ENV.friend_cache_ttl);
        log::info!("Friend id cache enabled");
    }

    let jwt_secret = JwtSecret(ENV.jwt_secret.clone());

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(friend_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .app_data(web::Data::new(jwt_secret.clone()))
            .app_data(web::Data::new(ws_server.clone()))
            .service(health_check)
            .route("/ws", web::get().to(websocket_handler))
            .service(
                web::scope("/api")
                    .wrap(from_fn(authentication))
                    .configure(modules::user::route::configure)
                    .configure(modules::friend::route::configure)
                    .configure(modules::notification::route::configure),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
