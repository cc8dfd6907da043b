//! Blockchain RPC client with timeout and failover handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoints (primary + failovers)
//! - Query chain state (blocks, balances, nonces, receipts, contract calls)
//! - Broadcast signed transactions
//! - Handle timeouts and network errors gracefully

use alloy::eips::BlockNumberOrTag;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportResult;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{
    BlockchainConfig, BlockchainError, BlockchainResult, ChainId, SignedTransaction,
    TxReceiptSummary,
};

/// Read and broadcast primitives the relayer needs from a chain.
///
/// Implemented by [`BlockchainClient`] for real networks and by in-memory
/// doubles in tests.
#[async_trait]
pub trait ChainBackend: Send + Sync {
    /// Chain ID reported by the node.
    async fn chain_id(&self) -> BlockchainResult<ChainId>;

    /// Latest block number.
    async fn block_number(&self) -> BlockchainResult<u64>;

    /// Base fee of the latest block, if the chain reports one.
    async fn latest_base_fee(&self) -> BlockchainResult<Option<u128>>;

    /// Network-reported gas price in wei.
    async fn gas_price(&self) -> BlockchainResult<u128>;

    /// Native balance of an address.
    async fn balance(&self, address: Address) -> BlockchainResult<U256>;

    /// Next nonce for an address, counting pending transactions.
    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64>;

    /// Broadcast a signed transaction.
    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash>;

    /// Receipt for a transaction, `None` while pending.
    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TxReceiptSummary>>;

    /// Read-only contract call against the latest block.
    async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes>;
}

type DynProvider = Arc<dyn Provider + Send + Sync>;

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Configuration.
    config: BlockchainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// Fails only on an unparseable primary URL. A chain ID mismatch is
    /// logged, not fatal, so the service can start while the RPC is down.
    pub async fn new(config: BlockchainConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as DynProvider);

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as DynProvider);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let client = Self {
            providers,
            config: config.clone(),
            timeout_duration,
        };

        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %config.rpc_url,
                    failovers = config.failover_urls.len(),
                    chain_id = config.chain_id,
                    "Blockchain client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Blockchain client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Run an RPC operation against each provider in order until one answers.
    async fn with_failover<T, F, Fut>(&self, op: &'static str, f: F) -> BlockchainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut last_error = String::from("no providers");
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, f(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, op, error = %e, "RPC error, trying next provider");
                    last_error = e.to_string();
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, op, "RPC timeout, trying next provider");
                    last_error = format!("timeout after {}s", self.timeout_duration.as_secs());
                }
            }
        }
        Err(BlockchainError::Rpc(format!(
            "All RPC providers failed ({op}): {last_error}"
        )))
    }
}

#[async_trait]
impl ChainBackend for BlockchainClient {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.with_failover("eth_chainId", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        self.with_failover("eth_blockNumber", |p| async move { p.get_block_number().await })
            .await
    }

    async fn latest_base_fee(&self) -> BlockchainResult<Option<u128>> {
        let block = self
            .with_failover("eth_getBlockByNumber", |p| async move {
                p.get_block_by_number(BlockNumberOrTag::Latest).await
            })
            .await?;
        Ok(block.and_then(|b| b.header.base_fee_per_gas).map(u128::from))
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.with_failover("eth_gasPrice", |p| async move { p.get_gas_price().await })
            .await
    }

    async fn balance(&self, address: Address) -> BlockchainResult<U256> {
        self.with_failover("eth_getBalance", move |p| async move {
            p.get_balance(address).await
        })
        .await
    }

    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.with_failover("eth_getTransactionCount", move |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash> {
        let raw = tx.raw.clone();
        let pending = self
            .with_failover("eth_sendRawTransaction", move |p| {
                let raw = raw.clone();
                async move { p.send_raw_transaction(&raw).await }
            })
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TxReceiptSummary>> {
        let receipt = self
            .with_failover("eth_getTransactionReceipt", move |p| async move {
                p.get_transaction_receipt(tx_hash).await
            })
            .await?;

        Ok(receipt.map(|r| TxReceiptSummary {
            tx_hash: r.transaction_hash,
            block_number: r.block_number.unwrap_or_default(),
            gas_used: r.gas_used,
            effective_gas_price: r.effective_gas_price,
            success: r.status(),
        }))
    }

    async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        self.with_failover("eth_call", move |p| {
            let request = TransactionRequest::default()
                .with_to(to)
                .with_input(data.clone());
            async move { p.call(request).await }
        })
        .await
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("providers", &self.providers.len())
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BlockchainConfig {
        BlockchainConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            rpc_timeout_secs: 1,
            chain_id: 31337,
            ..BlockchainConfig::default()
        }
    }

    #[tokio::test]
    async fn test_client_creation_survives_unreachable_rpc() {
        let result = BlockchainClient::new(test_config()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_primary_url() {
        let mut config = test_config();
        config.rpc_url = "not a url".to_string();
        let err = BlockchainClient::new(config).await.unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }

    #[tokio::test]
    async fn test_rpc_failover_exhausted() {
        let mut config = test_config();
        config.failover_urls.push("http://127.0.0.1:2".to_string());
        config.failover_urls.push("::garbage::".to_string());

        let client = BlockchainClient::new(config).await.unwrap();
        assert_eq!(client.providers.len(), 2);

        let result = client.chain_id().await;
        assert!(result.unwrap_err().to_string().contains("All RPC providers failed"));
        assert!(client.block_number().await.is_err());
    }
}
