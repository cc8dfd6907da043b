//! Startup orchestration.

use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::blockchain::{
    BlockchainClient, BlockchainError, ChainBackend, ChainConnector, ConfirmationPolicy, Wallet,
};
use crate::config::{ConfigError, RelayerConfig, Secrets};
use crate::context::RelayerContext;
use crate::engine::{EngineError, HttpEngine, ShieldedEngine, WalletInfo};
use crate::lifecycle::Shutdown;
use crate::observability::logging::short_id;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Chain setup failed: {0}")]
    Chain(#[from] BlockchainError),

    #[error("Engine setup failed: {0}")]
    Engine(#[from] EngineError),
}

/// Build the one chain session, the engine adapter and everything on top.
///
/// Starts the submission worker, so it must run inside the Tokio runtime.
pub async fn build_context(
    config: RelayerConfig,
    secrets: &Secrets,
) -> Result<Arc<RelayerContext>, StartupError> {
    let wallet = Wallet::from_private_key(&secrets.relayer_private_key, config.blockchain.chain_id)?;
    info!(relayer = %wallet.address(), "Relayer identity loaded");

    let client = BlockchainClient::new(config.blockchain.clone()).await?;
    let backend: Arc<dyn ChainBackend> = Arc::new(client);
    let connector = ChainConnector::new(
        backend,
        wallet,
        ConfirmationPolicy::from_config(&config.blockchain),
        config.blockchain.submission_queue_depth,
    );

    let engine: Arc<dyn ShieldedEngine> = Arc::new(HttpEngine::new(
        &config.engine,
        secrets.engine_encryption_key.clone(),
    )?);

    let ctx = RelayerContext::new(config, connector, engine)?;
    if ctx.paymaster.is_none() {
        info!("GhostPaymaster not configured, gas reimbursement disabled");
    }
    Ok(Arc::new(ctx))
}

/// Derive the operator's shielded wallet and scan it in the background.
///
/// Best-effort: failures are logged and the relayer keeps serving.
pub fn preload_wallet(
    engine: Arc<dyn ShieldedEngine>,
    mnemonic: String,
    shutdown: &Shutdown,
) -> JoinHandle<Option<WalletInfo>> {
    let stop = shutdown.wait();
    tokio::spawn(async move {
        let work = async {
            let wallet = match engine.derive_wallet_from_mnemonic(&mnemonic).await {
                Ok(wallet) => wallet,
                Err(e) => {
                    warn!(error = %e, "Wallet preload failed");
                    return None;
                }
            };

            match engine.scan_incrementally(&[wallet.id.clone()]).await {
                Ok(()) => info!(wallet = %short_id(&wallet.id), "Initial scan complete"),
                Err(e) => warn!(wallet = %short_id(&wallet.id), error = %e, "Initial scan failed"),
            }
            Some(wallet)
        };

        tokio::select! {
            wallet = work => wallet,
            _ = stop => None,
        }
    })
}
