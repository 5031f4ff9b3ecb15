use anyhow::Result;
use cloudant_server::config::ServerConfig;
use std::net::TcpListener;

mod telemetry;

#[actix_web::main]
async fn main() -> Result<()> {
    let loaded = ServerConfig::load("cloudant-server.json");
    let config = loaded.as_ref().cloned().unwrap_or_default();

    let _guard = telemetry::init_telemetry(&config.log_dir)?;

    if let Err(e) = &loaded {
        tracing::warn!("Failed to load cloudant-server.json, using defaults: {}", e);
    }

    tracing::info!("cloudant-server starting");
    tracing::info!("  Address: {}", config.bind_address());
    tracing::info!("  Authentication: {}", config.credentials().is_some());
    tracing::info!("  Log directory: {}", config.log_dir);

    let listener = TcpListener::bind(config.bind_address())?;
    let server = cloudant_server::run(listener, config)?;

    tracing::info!("Server running, press Ctrl+C to stop");
    server.await?;

    tracing::info!("Shutting down");
    Ok(())
}
