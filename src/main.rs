use actix_cors::Cors;
use actix_web::{
    self,
    http::header,
    middleware::{from_fn, Logger},
    web, App, HttpServer,
};
use std::{
    sync::{Arc, LazyLock},
    time::Duration,
};

use crate::{
    configs::{connect_database, connect_object_store, RedisCache},
    middlewares::authentication,
    modules::{
        download::service::DownloadWorkflow,
        file::{
            repository::DownloadRepository,
            repository_pg::{DownloadPgRepository, FilePgRepository},
            service::FileService,
        },
        share::service::ShareWorkflow,
        storage::repository_s3::S3ObjectStore,
        user::{repository_pg::UserRepositoryPg, service::UserService},
    },
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
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

/// Public auth routes plus everything behind bearer-token authentication.
fn api_configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(modules::user::route::public_api_configure).service(
        web::scope("")
            .wrap(from_fn(authentication))
            .configure(modules::user::route::configure)
            .configure(modules::file::route::configure)
            .configure(modules::share::route::configure)
            .configure(modules::download::route::configure),
    );
}

/// Deletes download records whose retention window has passed.
fn spawn_download_purge(downloads: Arc<dyn DownloadRepository + Send + Sync>, every: Duration) {
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match downloads.purge_expired(chrono::Utc::now()).await {
                Ok(0) => {}
                Ok(n) => log::info!("Purged {} expired download record(s)", n),
                Err(e) => log::error!("Download purge failed: {}", e),
            }
        }
    });
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let redis_pool =
        RedisCache::new().await.map_err(|_| std::io::Error::other("Redis connection error"))?;

    let s3_client = connect_object_store().await;

    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone(), ENV.user_table.clone()));
    let file_repo = Arc::new(FilePgRepository::new(db_pool.clone(), ENV.file_table.clone()));
    let download_repo =
        Arc::new(DownloadPgRepository::new(db_pool.clone(), ENV.download_table.clone()));
    let object_store = Arc::new(S3ObjectStore::new(
        s3_client,
        ENV.bucket_name.clone(),
        Duration::from_secs(ENV.presigned_url_expiration),
    ));

    let user_service = UserService::with_dependencies(user_repo, Arc::new(redis_pool));
    let identity = Arc::new(user_service.clone());

    let file_service = FileService::with_dependencies(
        file_repo.clone(),
        object_store.clone(),
        identity.clone(),
    );
    let share_workflow = web::Data::new(ShareWorkflow::with_dependencies(
        file_repo.clone(),
        object_store.clone(),
        identity.clone(),
        ENV.api_url.clone(),
    ));
    let download_workflow = web::Data::new(DownloadWorkflow::with_dependencies(
        file_repo,
        download_repo.clone(),
        object_store,
        identity,
        chrono::Duration::seconds(ENV.download_record_ttl),
    ));

    spawn_download_purge(download_repo, Duration::from_secs(ENV.download_purge_interval));

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&ENV.frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(utils::json_error_config())
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(file_service.clone()))
            .app_data(share_workflow.clone())
            .app_data(download_workflow.clone())
            .service(health_check)
            .service(web::scope("/api").configure(api_configure))
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
