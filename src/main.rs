use edge_relay::config::{GatewayConfig, API_KEY_ENV};
use edge_relay::gateway::{serve_until, GatewayState};

use color_eyre::Result;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_LOG_FILTER: &str = "edge_relay=info,tower_http=warn";

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle --version flag before any initialization
    if std::env::args().any(|arg| arg == "--version") {
        println!("edge-relay {}", VERSION);
        return Ok(());
    }

    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = GatewayConfig::from_env()?;
    tracing::info!(?config, "edge-relay {} starting", VERSION);

    if config.rotate_api_key {
        tracing::info!("{} is re-read on every request", API_KEY_ENV);
    } else if config.api_key.is_none() {
        tracing::warn!(
            "{} is not set; relayed requests will answer 500 until it is configured",
            API_KEY_ENV
        );
    }

    let state = GatewayState::from_config(&config)?;
    serve_until(config.bind_addr, state, shutdown_signal()).await
}
