//! Relayer server entry point.

use std::path::PathBuf;
use tokio::net::TcpListener;

use ghost_relayer::config::{load_config, Secrets};
use ghost_relayer::lifecycle::{build_context, preload_wallet, wait_for_signal};
use ghost_relayer::observability::{logging, metrics};
use ghost_relayer::{HttpServer, Shutdown};

const CONFIG_PATH_ENV: &str = "RELAYER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "relayer.toml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = load_config(&config_path)?;
    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        chain_id = config.blockchain.chain_id,
        "ghost-relayer starting"
    );

    let secrets = Secrets::from_env()?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let ctx = build_context(config, &secrets).await?;

    let shutdown = Shutdown::new();
    if let Some(mnemonic) = secrets.mnemonic.clone() {
        preload_wallet(ctx.engine.clone(), mnemonic, &shutdown);
    }

    let signal = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal.trigger();
    });

    HttpServer::new(ctx).run(listener, shutdown.wait()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
