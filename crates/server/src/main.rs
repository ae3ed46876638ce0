// pulse-server main.rs
// HTTP service for device heartbeat ingestion and windowed fleet analytics

use std::net::SocketAddr;
use std::sync::Arc;

use pulse_server::{build_router, AppState, Database, ServerConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse_server=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = ServerConfig::load(&args);

    tracing::info!("database: {:?}", config.db_path);
    tracing::info!("port: {}", config.port);
    if config.client_secret.is_none() {
        tracing::warn!("PULSE_CLIENT_SECRET not set; heartbeat requests will fail closed");
    }
    if config.admin_secret.is_none() {
        tracing::warn!("PULSE_ADMIN_SECRET not set; query requests will fail closed");
    }
    if !config.blocklist.is_empty() {
        tracing::info!("blocklist entries: {}", config.blocklist.len());
    }

    let db = Database::open(&config.db_path).expect("Failed to open database");

    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState { db, config });
    let app = build_router(state);

    tracing::info!("pulse server listening at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .unwrap();
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl+c");
    tracing::info!("Shutting down...");
}
