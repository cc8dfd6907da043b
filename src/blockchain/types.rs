//! Chain-specific types and error definitions.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use serde::Serialize;
use thiserror::Error;

pub use crate::config::schema::{BlockchainConfig, GasType};

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was broadcast but not observed mined within the bound.
    #[error("Transaction {tx_hash} not confirmed within {secs} seconds")]
    ConfirmationTimeout { tx_hash: TxHash, secs: u64 },

    /// Invalid private key format or signing error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The network rejected a signed transaction.
    #[error("Submission rejected: {0}")]
    Submission(String),

    /// The submission queue worker is gone.
    #[error("Submission queue closed")]
    QueueClosed,

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Contract call returned data that could not be decoded.
    #[error("ABI decoding failed: {0}")]
    Abi(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// An unsigned transaction handed to the submission queue.
///
/// The nonce is deliberately absent: only the queue assigns nonces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub gas_type: GasType,
}

/// A transaction signed by the relayer identity, ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub tx_hash: TxHash,
    pub nonce: u64,
    /// EIP-2718 encoded envelope.
    pub raw: Bytes,
}

/// Handle for a transaction the network accepted into its mempool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransaction {
    pub tx_hash: TxHash,
    pub nonce: u64,
}

/// The parts of a mined receipt the relayer cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceiptSummary {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    pub effective_gas_price: u128,
    /// False when the transaction reverted.
    pub success: bool,
}

/// Transaction status as observed by a status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// No receipt yet.
    Pending,
    /// Mined and succeeded.
    Confirmed(TxReceiptSummary),
    /// Mined and reverted.
    Failed(TxReceiptSummary),
}

impl ConfirmationStatus {
    /// Classify an optional receipt.
    pub fn from_receipt(receipt: Option<TxReceiptSummary>) -> Self {
        match receipt {
            None => Self::Pending,
            Some(r) if r.success => Self::Confirmed(r),
            Some(r) => Self::Failed(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(success: bool) -> TxReceiptSummary {
        TxReceiptSummary {
            tx_hash: TxHash::ZERO,
            block_number: 10,
            gas_used: 21_000,
            effective_gas_price: 3_000_000_000,
            success,
        }
    }

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(97u64);
        assert_eq!(chain_id.0, 97);
        assert_eq!(u64::from(chain_id), 97);
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(ConfirmationStatus::from_receipt(None), ConfirmationStatus::Pending);
        assert!(matches!(
            ConfirmationStatus::from_receipt(Some(receipt(true))),
            ConfirmationStatus::Confirmed(_)
        ));
        assert!(matches!(
            ConfirmationStatus::from_receipt(Some(receipt(false))),
            ConfirmationStatus::Failed(_)
        ));
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::ConfirmationTimeout {
            tx_hash: TxHash::ZERO,
            secs: 60,
        };
        assert!(err.to_string().contains("60 seconds"));
    }
}
