//! # Yatube Web Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;
mod views;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Yatube web server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await;

    if let Some(admin) = &config.admin {
        state.bootstrap_admin(admin).await?;
    }

    let data = web::Data::new(state);
    HttpServer::new(move || {
        let login_limiter = data.login_limiter.clone();
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(data.clone())
            .configure(|cfg| handlers::configure_routes(cfg, login_limiter))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
