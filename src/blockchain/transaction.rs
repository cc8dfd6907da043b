//! Confirmation monitoring for submitted transactions.
//!
//! # Responsibilities
//! - Poll receipts with jittered, growing intervals
//! - Enforce the confirmation depth and the overall wait bound
//! - Report reverts through the receipt, timeouts through an error
//!
//! A timed-out transaction is never resubmitted here; it may still be mined
//! and callers are expected to poll its status independently.

use alloy::primitives::TxHash;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::blockchain::client::ChainBackend;
use crate::blockchain::types::{
    BlockchainConfig, BlockchainError, BlockchainResult, TxReceiptSummary,
};
use crate::resilience::backoff::calculate_backoff;

/// How long and how deep to wait for a transaction.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationPolicy {
    /// Upper bound for the whole wait.
    pub timeout: Duration,
    /// Blocks required, counting the inclusion block.
    pub confirmations: u32,
    /// First poll delay.
    pub poll_base: Duration,
    /// Longest poll delay.
    pub poll_max: Duration,
}

impl ConfirmationPolicy {
    pub fn from_config(config: &BlockchainConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.confirmation_timeout_secs),
            confirmations: config.confirmation_blocks.max(1),
            poll_base: Duration::from_millis(config.poll_interval_ms),
            poll_max: Duration::from_millis(config.poll_interval_ms.saturating_mul(5)),
        }
    }
}

/// Wait for a transaction to be mined with the required depth.
///
/// Returns the receipt even if the transaction reverted; check `success`.
pub async fn wait_for_confirmation(
    backend: &dyn ChainBackend,
    tx_hash: TxHash,
    policy: ConfirmationPolicy,
) -> BlockchainResult<TxReceiptSummary> {
    let base_ms = policy.poll_base.as_millis() as u64;
    let max_ms = policy.poll_max.as_millis() as u64;

    let result = timeout(policy.timeout, async {
        let mut attempt = 0u32;

        loop {
            match backend.transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    if policy.confirmations <= 1 || !receipt.success {
                        return Ok(receipt);
                    }

                    let current_block = backend.block_number().await?;
                    let depth = current_block.saturating_sub(receipt.block_number) + 1;
                    if depth >= u64::from(policy.confirmations) {
                        return Ok(receipt);
                    }

                    tracing::debug!(
                        tx_hash = %tx_hash,
                        confirmations = depth,
                        required = policy.confirmations,
                        "Waiting for confirmations"
                    );
                }
                Ok(None) => tracing::debug!(tx_hash = %tx_hash, "Transaction pending"),
                // Transient read failures are retried until the bound expires
                Err(e) => tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt query failed"),
            }

            attempt = attempt.saturating_add(1);
            sleep(calculate_backoff(attempt, base_ms, max_ms)).await;
        }
    })
    .await;

    match result {
        Ok(receipt) => receipt,
        Err(_) => Err(BlockchainError::ConfirmationTimeout {
            tx_hash,
            secs: policy.timeout.as_secs(),
        }),
    }
}
