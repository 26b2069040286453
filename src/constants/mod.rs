use std::str::FromStr;

pub const FRIEND_IDS_CACHE_PREFIX: &str = "friends";
pub const USER_SEARCH_LIMIT: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StorageBackend::Postgres),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

pub struct Env {
    pub jwt_secret: String,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub redis_url: Option<String>,
    pub friend_cache_ttl: usize,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let storage_backend = std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse::<StorageBackend>()
            .expect("STORAGE_BACKEND must be either 'postgres' or 'memory'");

        let database_url = std::env::var("DATABASE_URL").ok();
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            panic!("DATABASE_URL must be set when STORAGE_BACKEND is postgres");
        }
        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .expect("DATABASE_MAX_CONNECTIONS must be a valid u32 integer");

        let redis_url = std::env::var("REDIS_URL").ok().filter(|url| !url.is_empty());
        let friend_cache_ttl = std::env::var("FRIEND_CACHE_TTL")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<usize>()
            .expect("FRIEND_CACHE_TTL must be a valid number of seconds");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        Env {
            jwt_secret,
            storage_backend,
            database_url,
            database_max_connections,
            redis_url,
            friend_cache_ttl,
            frontend_url,
            ip,
            port,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
