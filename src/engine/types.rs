//! Types exchanged with the shielded-pool engine.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by the engine, one variant per kind of call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Gas estimation failed: {0}")]
    Estimation(String),

    #[error("Proof generation failed: {0}")]
    Proof(String),

    #[error("Transaction population failed: {0}")]
    Population(String),

    #[error("Wallet operation failed: {0}")]
    Wallet(String),

    #[error("Merkle scan failed: {0}")]
    Scan(String),

    #[error("Balance read failed: {0}")]
    Balance(String),

    #[error("Shield population failed: {0}")]
    Shield(String),

    #[error("Engine unreachable: {0}")]
    Transport(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Progress callback for proof generation, called with values in `0.0..=1.0`.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// A shielded wallet known to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub id: String,
    /// Shielded (`0zk…`) receiving address.
    pub railgun_address: String,
}

/// What is being withdrawn, from where, to where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnshieldParams {
    pub wallet_id: String,
    pub destination: Address,
    /// Wrapped base token held in the pool.
    pub token: Address,
    pub amount: U256,
}

/// Opaque proof produced by the engine, handed back to it for population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofArtifact {
    pub params: UnshieldParams,
    pub gas_price: u128,
    pub payload: serde_json::Value,
}

/// An unsigned transaction: where to send it, with what calldata and value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDescriptor {
    pub to: Address,
    pub data: Bytes,
    #[serde(default)]
    pub value: U256,
}

/// Inputs for a base-token deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldParams {
    pub railgun_address: String,
    /// One-time secret derived from the depositor's signature.
    pub shield_private_key: B256,
    pub token: Address,
    pub amount: U256,
}
