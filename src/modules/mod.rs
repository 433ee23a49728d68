pub mod user {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod identity;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod storage {
    pub mod schema;
    pub mod repository;
    pub mod repository_s3;
}

pub mod file {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod workflow {
    pub mod pipeline;
    pub mod identity;
}

pub mod share {
    pub mod model;
    pub mod steps;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod download {
    pub mod model;
    pub mod steps;
    pub mod handle;
    pub mod service;
    pub mod route;
}
