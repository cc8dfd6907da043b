//! In-memory record of where each withdrawal is.
//!
//! Callers that lost the blocking response can look a request up by id.

use alloy::primitives::{Address, TxHash, U256};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::paymaster::ReimbursementOutcome;
use crate::withdrawal::types::{
    serialize_decimal, WithdrawalError, WithdrawalReceipt, WithdrawalRequest,
};

/// Finished records are dropped after this long.
const RETENTION: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalState {
    Requested,
    GasEstimated,
    ProofGenerating,
    ProofReady,
    Submitted,
    Confirmed,
    ReimbursementAttempted,
    Failed,
}

impl WithdrawalState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ReimbursementAttempted | Self::Failed)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRecord {
    pub id: Uuid,
    pub state: WithdrawalState,
    pub destination: Address,
    #[serde(serialize_with = "serialize_decimal")]
    pub amount: U256,
    pub proof_progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<WithdrawalReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reimbursement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Seconds since the Unix epoch.
    pub created_at: u64,
    #[serde(skip)]
    updated: Instant,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default)]
pub struct WithdrawalTracker {
    records: Arc<DashMap<Uuid, WithdrawalRecord>>,
}

impl WithdrawalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request and return its id.
    pub fn begin(&self, request: &WithdrawalRequest) -> Uuid {
        self.prune();
        let id = Uuid::new_v4();
        self.records.insert(
            id,
            WithdrawalRecord {
                id,
                state: WithdrawalState::Requested,
                destination: request.destination(),
                amount: request.amount(),
                proof_progress: 0.0,
                tx_hash: None,
                receipt: None,
                reimbursement: None,
                error: None,
                created_at: unix_now(),
                updated: Instant::now(),
            },
        );
        id
    }

    fn update(&self, id: Uuid, f: impl FnOnce(&mut WithdrawalRecord)) {
        if let Some(mut record) = self.records.get_mut(&id) {
            f(&mut record);
            record.updated = Instant::now();
        }
    }

    pub fn transition(&self, id: Uuid, state: WithdrawalState) {
        self.update(id, |r| r.state = state);
    }

    pub fn progress(&self, id: Uuid, progress: f64) {
        self.update(id, |r| r.proof_progress = progress.clamp(0.0, 1.0));
    }

    pub fn submitted(&self, id: Uuid, tx_hash: TxHash) {
        self.update(id, |r| {
            r.state = WithdrawalState::Submitted;
            r.tx_hash = Some(tx_hash);
        });
    }

    pub fn confirmed(&self, id: Uuid, receipt: WithdrawalReceipt) {
        self.update(id, |r| {
            r.state = WithdrawalState::Confirmed;
            r.receipt = Some(receipt);
        });
    }

    pub fn reimbursed(&self, id: Uuid, outcome: &ReimbursementOutcome) {
        self.update(id, |r| {
            r.state = WithdrawalState::ReimbursementAttempted;
            r.reimbursement = Some(outcome.label().to_string());
        });
    }

    pub fn failed(&self, id: Uuid, error: &WithdrawalError) {
        self.update(id, |r| {
            r.state = WithdrawalState::Failed;
            r.error = Some(error.to_string());
        });
    }

    pub fn get(&self, id: &Uuid) -> Option<WithdrawalRecord> {
        self.records.get(id).map(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Withdrawals not yet in a terminal state.
    pub fn in_flight(&self) -> usize {
        self.records
            .iter()
            .filter(|r| !r.state.is_terminal())
            .count()
    }

    fn prune(&self) {
        self.records
            .retain(|_, r| !(r.state.is_terminal() && r.updated.elapsed() > RETENTION));
    }
}
