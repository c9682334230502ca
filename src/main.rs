use std::time::Duration;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpResponse, HttpServer, Responder, get};
use anyhow::Context;
use serde_json::json;

mod api;
mod attendance;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod routes;
mod utils;

use attendance::AttendanceRules;
use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::utils::report_cache::ReportCache;
use crate::utils::snapshot_store::{self, SnapshotStore};
use tracing::{error, info};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/health")]
async fn health(store: Data<SnapshotStore>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "snapshot_ready": store.current().is_some()
    }))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let rules = Data::new(AttendanceRules::from_config(&config));
    let store = Data::new(SnapshotStore::new());
    let report_cache = Data::new(ReportCache::new(
        config.report_cache_capacity,
        Duration::from_secs(config.report_cache_ttl_secs),
    ));
    info!(
        markers = ?rules.exclusions.markers(),
        flag_missing_in = rules.audit.flag_missing_in,
        "Attendance rules loaded"
    );

    // Clone what the background tasks need before the server takes ownership
    let pool_for_warmup = pool.clone();
    let store_for_warmup = store.clone();

    actix_web::rt::spawn(async move {
        if let Err(e) = snapshot_store::warmup_snapshot(&pool_for_warmup, &store_for_warmup).await {
            error!(error = ?e, "Failed to warmup dashboard snapshot");
        }
    });

    if config.snapshot_refresh_secs > 0 {
        let pool = pool.clone();
        let store = store.clone();
        let cache = report_cache.clone();
        let rules = rules.clone();
        let config = config.clone();

        actix_web::rt::spawn(async move {
            let mut ticker =
                actix_web::rt::time::interval(Duration::from_secs(config.snapshot_refresh_secs));
            loop {
                ticker.tick().await;
                if let Err(e) =
                    snapshot_store::refresh_snapshot(&pool, &store, &cache, &rules, &config).await
                {
                    error!(error = ?e, "Scheduled dashboard refresh failed");
                }
            }
        });
    }

    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(config_data.clone())
            .app_data(rules.clone())
            .app_data(store.clone())
            .app_data(report_cache.clone())
            .service(health)
            // Protected attendance + dashboard routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &config_data))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
