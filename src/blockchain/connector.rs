//! Chain connector: the process-wide chain session.
//!
//! Owns the backend (RPC connection), the relayer identity (behind the
//! submission queue) and the cached chain ID. Built once by the
//! composition root and shared by reference.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use std::sync::Arc;

use crate::blockchain::client::ChainBackend;
use crate::blockchain::submitter::SubmissionQueue;
use crate::blockchain::transaction::{wait_for_confirmation, ConfirmationPolicy};
use crate::blockchain::types::{
    BlockchainResult, ConfirmationStatus, PendingTransaction, SubmissionRequest, TxReceiptSummary,
};
use crate::blockchain::wallet::Wallet;
use crate::observability::metrics;

/// Chain access for every other component.
#[derive(Clone)]
pub struct ChainConnector {
    backend: Arc<dyn ChainBackend>,
    queue: SubmissionQueue,
    relayer: Address,
    chain_id: u64,
    confirmation: ConfirmationPolicy,
}

impl ChainConnector {
    /// Start the submission worker for `wallet` and wrap everything up.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        backend: Arc<dyn ChainBackend>,
        wallet: Wallet,
        confirmation: ConfirmationPolicy,
        queue_depth: usize,
    ) -> Self {
        let relayer = wallet.address();
        let chain_id = wallet.chain_id();
        let queue = SubmissionQueue::spawn(backend.clone(), wallet, queue_depth);

        Self {
            backend,
            queue,
            relayer,
            chain_id,
            confirmation,
        }
    }

    /// Relayer identity address.
    pub fn relayer_address(&self) -> Address {
        self.relayer
    }

    /// Chain ID the relayer signs for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Network-reported gas price. Callers apply the protocol floor.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.backend.gas_price().await
    }

    /// Base fee of the latest block, if any.
    pub async fn latest_base_fee(&self) -> BlockchainResult<Option<u128>> {
        self.backend.latest_base_fee().await
    }

    /// Native balance of any address.
    pub async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.backend.balance(address).await
    }

    /// Native balance of the relayer identity (gas funds).
    pub async fn relayer_balance(&self) -> BlockchainResult<U256> {
        self.backend.balance(self.relayer).await
    }

    /// Sign with the relayer identity and broadcast, through the queue.
    pub async fn submit(&self, request: SubmissionRequest) -> BlockchainResult<PendingTransaction> {
        self.queue.submit(request).await
    }

    /// Wait for a submitted transaction within the configured bound.
    pub async fn await_confirmation(
        &self,
        pending: &PendingTransaction,
    ) -> BlockchainResult<TxReceiptSummary> {
        wait_for_confirmation(self.backend.as_ref(), pending.tx_hash, self.confirmation).await
    }

    /// One-shot status lookup for a transaction hash.
    pub async fn transaction_status(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        let receipt = self.backend.transaction_receipt(tx_hash).await?;
        Ok(ConfirmationStatus::from_receipt(receipt))
    }

    /// Read-only contract call.
    pub async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        self.backend.call(to, data).await
    }

    /// Whether the RPC currently answers. Updates the health gauge.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.backend.block_number().await.is_ok();
        metrics::record_rpc_health(healthy);
        healthy
    }

    /// The submission queue in front of the relayer identity.
    pub fn submission_queue(&self) -> &SubmissionQueue {
        &self.queue
    }
}

impl std::fmt::Debug for ChainConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConnector")
            .field("relayer", &self.relayer)
            .field("chain_id", &self.chain_id)
            .field("queue", &self.queue)
            .finish()
    }
}
