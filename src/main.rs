use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use pdfdocx_service::{config::Config, routes::create_router, utils::init_logger, AppState};
use tokio::net::TcpListener;
use tracing::info;

/// HTTP service converting uploaded PDFs to DOCX
#[derive(Debug, Parser)]
#[command(name = "pdfdocx-service", version, about)]
struct Cli {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let _log_guard = init_logger(&config.logging);
    info!("Configuration loaded: {:?}", config.server);
    info!(
        mode = %config.converters.secondary_mode,
        policy = ?config.converters.secondary_policy,
        timeout_secs = ?config.converters.timeout_secs,
        "Converter settings"
    );

    // Create shared state and the staging directories
    let state = AppState::from_config(config.clone());
    state
        .staging
        .ensure_dirs()
        .await
        .context("Failed to create staging directories")?;

    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.server.host, config.server.port))?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
