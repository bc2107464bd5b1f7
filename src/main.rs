// src/main.rs
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum_server::Handle;
use polly_backend::{config::Config, routes, state::AppState, supabase::SupabaseAuth};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok(); // Load environment variables from .env file

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let auth = Arc::new(SupabaseAuth::from_config(&config));
    let app = routes::create_routes(AppState::new(config, auth));

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    info!("Server running on {address}");
    if let Err(e) = axum_server::bind(address)
        .handle(handle)
        .serve(app.into_make_service())
        .await
    {
        error!("Server error: {e}");
    }
}

async fn shutdown_signal(handle: Handle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {e}");
        return;
    }
    info!("Received Ctrl+C, shutting down");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
