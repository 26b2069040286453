pub mod user {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod repository_mem;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod friend {
    pub mod error;
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod repository_mem;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod notification {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod repository_mem;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod websocket;
