//! Paymaster pool snapshots, errors and reimbursement outcomes.

use alloy::primitives::{Address, TxHash, U256};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::blockchain::BlockchainError;

#[derive(Debug, Error)]
pub enum PaymasterError {
    #[error("GhostPaymaster not configured")]
    NotConfigured,

    #[error("Paymaster read failed: {0}")]
    Read(#[source] BlockchainError),

    #[error("Reimbursement claim failed: {0}")]
    Claim(String),

    #[error("Pool funding failed: {0}")]
    Funding(String),
}

pub type PaymasterResult<T> = Result<T, PaymasterError>;

/// On-chain pool state. Read fresh on every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymasterPoolState {
    pub address: Address,
    pub relayer: Address,
    pub owner: Address,
    pub fee_basis_points: U256,
    pub pool_balance: U256,
}

/// A mined reimbursement claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub tx_hash: TxHash,
    pub amount: U256,
}

/// Why a reimbursement was not attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotConfigured,
    PoolTooLow { pool: U256, required: U256 },
}

/// Result of the post-confirmation reimbursement step.
///
/// Never an error for the withdrawal that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReimbursementOutcome {
    Claimed(ClaimReceipt),
    Skipped(SkipReason),
    Failed(String),
}

impl ReimbursementOutcome {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Claimed(_) => "claimed",
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
        }
    }
}

/// Handle to a reimbursement running in the background.
#[derive(Debug)]
pub struct ReimbursementHandle {
    task: JoinHandle<ReimbursementOutcome>,
}

impl ReimbursementHandle {
    pub(crate) fn new(task: JoinHandle<ReimbursementOutcome>) -> Self {
        Self { task }
    }

    /// Wait for the reimbursement to settle.
    pub async fn outcome(self) -> ReimbursementOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => ReimbursementOutcome::Failed(format!("reimbursement task aborted: {e}")),
        }
    }
}
