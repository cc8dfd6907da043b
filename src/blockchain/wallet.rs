//! Relayer signing identity.
//!
//! # Security
//! - The private key comes ONLY from the environment, via [`crate::config::Secrets`]
//! - Keys are never logged or serialized
//! - Only the submission queue signs transactions; see [`crate::blockchain::submitter`]

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;

use crate::blockchain::types::{
    BlockchainError, BlockchainResult, GasType, SignedTransaction, SubmissionRequest,
};

/// The relayer's signing key bound to one chain.
#[derive(Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Network wallet used to sign transaction envelopes.
    network_wallet: EthereumWallet,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// Accepts keys with or without a `0x` prefix.
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;
        let signer = signer.with_chain_id(Some(chain_id));

        tracing::info!(
            address = %signer.address(),
            chain_id = chain_id,
            "Relayer wallet initialized"
        );

        Ok(Self {
            network_wallet: EthereumWallet::from(signer.clone()),
            signer,
            chain_id,
        })
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Build and sign a transaction with an explicit nonce.
    pub async fn sign_transaction(
        &self,
        request: &SubmissionRequest,
        nonce: u64,
    ) -> BlockchainResult<SignedTransaction> {
        let tx = TransactionRequest::default()
            .with_from(self.address())
            .with_to(request.to)
            .with_value(request.value)
            .with_input(request.data.clone())
            .with_nonce(nonce)
            .with_chain_id(self.chain_id)
            .with_gas_limit(request.gas_limit);

        let tx = match request.gas_type {
            GasType::Legacy => tx.with_gas_price(request.gas_price),
            GasType::DynamicFee => tx
                .with_max_fee_per_gas(request.gas_price)
                .with_max_priority_fee_per_gas(request.gas_price),
        };

        let envelope =
            <TransactionRequest as TransactionBuilder<Ethereum>>::build(tx, &self.network_wallet)
                .await
                .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))?;

        Ok(SignedTransaction {
            tx_hash: *envelope.tx_hash(),
            nonce,
            raw: Bytes::from(envelope.encoded_2718()),
        })
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}
