use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenvy::dotenv;

mod api;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod qr;
mod routes;
mod scanner;
mod state;
mod store;
mod utils;

#[cfg(test)]
mod test_utils;

use config::Config;
use state::AppState;

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

fn init_tracing(config: &Config) -> WorkerGuard {
    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let level = config.log_level.parse().unwrap_or(tracing::Level::DEBUG);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    guard
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;
    let _guard = init_tracing(&config);

    info!("Server starting...");

    let store = store::init_store(&config).await?;
    let state = Data::new(AppState::new(store, &config));

    let state_for_filter_warmup = state.clone();
    let state_for_cache_warmup = state.clone();
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    actix_web::rt::spawn(async move {
        let s = state_for_filter_warmup;
        if let Err(e) = s.roll_numbers.warmup(s.store.as_ref(), 100).await {
            warn!(error = %e, "Failed to warmup roll number filter");
        }
    });

    actix_web::rt::spawn(async move {
        let s = state_for_cache_warmup;
        // Warm up students registered in the last 30 days, in batches of 250
        if let Err(e) = s.students.warmup(s.store.as_ref(), 30, 250).await {
            warn!(error = %e, "Failed to warmup student cache");
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(state.clone())
            .app_data(Data::new(config_data.clone()))
            .configure(|cfg| routes::configure(cfg, &config_data))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
