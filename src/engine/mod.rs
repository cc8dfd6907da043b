//! Shielded-pool engine boundary.
//!
//! Everything cryptographic (note scanning, Merkle state, zk proofs, wallet
//! derivation) lives behind [`ShieldedEngine`]. The relayer only sequences
//! calls to it. [`HttpEngine`] talks to an engine sidecar over HTTP; tests
//! plug in their own implementation.

pub mod http;
pub mod types;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::fees::GasPolicy;

pub use http::HttpEngine;
pub use types::{
    EngineError, EngineResult, ProgressCallback, ProofArtifact, ShieldParams,
    TransactionDescriptor, UnshieldParams, WalletInfo,
};

/// Operations the relayer needs from the shielded-pool engine.
#[async_trait]
pub trait ShieldedEngine: Send + Sync {
    /// Gas the withdrawal will need, computed before any proof exists.
    async fn estimate_unproven_gas(
        &self,
        params: &UnshieldParams,
        gas: &GasPolicy,
    ) -> EngineResult<u64>;

    /// Generate the zk proof for a withdrawal. Long-running.
    async fn generate_proof(
        &self,
        params: &UnshieldParams,
        gas_price: u128,
        progress: ProgressCallback,
    ) -> EngineResult<ProofArtifact>;

    /// Turn a proof into a submittable transaction.
    async fn populate_proved_transaction(
        &self,
        proof: &ProofArtifact,
        gas: &GasPolicy,
    ) -> EngineResult<TransactionDescriptor>;

    /// Create (or re-open) the wallet for a mnemonic. Same mnemonic, same id.
    async fn derive_wallet_from_mnemonic(&self, mnemonic: &str) -> EngineResult<WalletInfo>;

    /// Look up a wallet previously created in this engine.
    async fn wallet_address(&self, wallet_id: &str) -> EngineResult<WalletInfo>;

    /// Bring the local view of the pool up to date for these wallets.
    async fn scan_incrementally(&self, wallet_ids: &[String]) -> EngineResult<()>;

    /// Spendable shielded balance of `asset` for a wallet.
    async fn read_balance(&self, wallet_id: &str, asset: Address) -> EngineResult<U256>;

    /// Build the deposit transaction for a base-token shield.
    async fn populate_shield(&self, params: &ShieldParams) -> EngineResult<TransactionDescriptor>;
}
