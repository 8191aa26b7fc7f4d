use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

mod api;
mod attendance;
mod config;
mod db;
mod docs;
mod model;
mod routes;
mod utils;

use attendance::mysql::MySqlStore;
use config::Config;
use db::init_db;
use routes::RateLimiters;
use utils::lecture_cache::LectureCache;

use crate::docs::ApiDoc;
use tracing::{error, info};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const WARMUP_BATCH_SIZE: usize = 250;

#[get("/")]
async fn index() -> impl Responder {
    "UniTrack attendance service"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(
        window_minutes = config.check_in_window.minutes(),
        "Server starting..."
    );

    let pool = init_db(&config.database_url).await?;
    let lectures = LectureCache::new(config.lecture_cache_ttl);
    let store = Data::new(MySqlStore::new(pool.clone(), lectures.clone()));
    let window = Data::new(config.check_in_window);
    let limiters = RateLimiters::new(&config)?;

    let warmup_days = config.lecture_warmup_days;
    actix_web::rt::spawn(async move {
        if let Err(e) = lectures.warmup(&pool, warmup_days, WARMUP_BATCH_SIZE).await {
            error!(error = ?e, "Failed to warm up lecture cache");
        }
    });

    let api_prefix = config.api_prefix.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard matches JS/CSS assets
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(window.clone())
            .service(index)
            .configure(|cfg| {
                routes::configure::<MySqlStore>(cfg, &api_prefix, limiters.clone())
            })
    })
    .bind(&config.server_addr)?
    .run()
    .await?;

    Ok(())
}
