//! Withdrawal requests, receipts and errors.

use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::blockchain::BlockchainError;
use crate::engine::EngineError;
use crate::paymaster::ReimbursementHandle;

#[derive(Debug, Error)]
pub enum WithdrawalError {
    /// Bad request shape or value. Raised before any I/O.
    #[error("{0}")]
    Validation(String),

    #[error("Gas estimation failed: {0}")]
    Estimation(#[source] EngineError),

    #[error("Proof generation failed: {0}")]
    Proof(#[source] EngineError),

    #[error("Transaction population failed: {0}")]
    Population(#[source] EngineError),

    #[error("Submission failed: {0}")]
    Submission(#[source] BlockchainError),

    /// Broadcast, but not seen mined in time. The caller should poll.
    #[error("Transaction {tx_hash} not confirmed within {secs} seconds")]
    ConfirmationTimeout { tx_hash: TxHash, secs: u64 },

    #[error("Transaction {tx_hash} reverted on-chain")]
    Reverted { tx_hash: TxHash },

    #[error("Chain error: {0}")]
    Chain(#[source] BlockchainError),

    /// The pipeline task panicked or was cancelled.
    #[error("Withdrawal interrupted: {0}")]
    Interrupted(String),
}

impl WithdrawalError {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid",
            Self::Estimation(_) => "estimation_failed",
            Self::Proof(_) => "proof_failed",
            Self::Population(_) => "population_failed",
            Self::Submission(_) => "submission_failed",
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
            Self::Reverted { .. } => "reverted",
            Self::Chain(_) => "chain_error",
            Self::Interrupted(_) => "interrupted",
        }
    }
}

/// Parse an integer amount of minor units (wei). Decimal or `0x` hex.
pub fn parse_amount(raw: &str) -> Result<U256, WithdrawalError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(WithdrawalError::Validation("amount is required".to_string()));
    }
    let amount = if let Some(hex) = raw.strip_prefix("0x") {
        U256::from_str_radix(hex, 16)
    } else {
        U256::from_str_radix(raw, 10)
    }
    .map_err(|_| {
        WithdrawalError::Validation("amount must be an integer number of wei".to_string())
    })?;
    Ok(amount)
}

/// Parse a destination: `0x` followed by exactly 40 hex characters.
pub fn parse_destination(raw: &str) -> Result<Address, WithdrawalError> {
    let invalid = || {
        WithdrawalError::Validation("Invalid BSC address (must be 0x + 40 hex chars)".to_string())
    };
    let hex = raw.strip_prefix("0x").ok_or_else(invalid)?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    raw.parse().map_err(|_| invalid())
}

/// A validated withdrawal. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRequest {
    wallet_id: String,
    destination: Address,
    amount: U256,
}

impl WithdrawalRequest {
    pub fn new(
        wallet_id: impl Into<String>,
        destination: &str,
        amount: U256,
    ) -> Result<Self, WithdrawalError> {
        let wallet_id = wallet_id.into();
        if wallet_id.trim().is_empty() {
            return Err(WithdrawalError::Validation("walletId is required".to_string()));
        }
        if amount.is_zero() {
            return Err(WithdrawalError::Validation("amount must be positive".to_string()));
        }
        let destination = parse_destination(destination)?;

        Ok(Self {
            wallet_id,
            destination,
            amount,
        })
    }

    pub fn wallet_id(&self) -> &str {
        &self.wallet_id
    }

    pub fn destination(&self) -> Address {
        self.destination
    }

    pub fn amount(&self) -> U256 {
        self.amount
    }
}

/// The mined withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    /// Network fee actually paid by the relayer.
    #[serde(serialize_with = "serialize_decimal")]
    pub confirmed_fee: U256,
}

/// Amounts go over the wire as decimal strings.
pub(crate) fn serialize_decimal<S: serde::Serializer>(
    value: &U256,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// What a successful withdrawal hands back.
#[derive(Debug)]
pub struct WithdrawalOutcome {
    pub id: Uuid,
    pub receipt: WithdrawalReceipt,
    /// Fee owed to the relayer for this amount.
    pub relayer_fee: U256,
    /// Still running when the outcome is returned.
    pub reimbursement: ReimbursementHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    #[test]
    fn test_zero_amount_rejected() {
        let err = WithdrawalRequest::new("wallet", GOOD, U256::ZERO).unwrap_err();
        assert!(matches!(err, WithdrawalError::Validation(_)));
    }

    #[test]
    fn test_destination_length() {
        let short = &GOOD[..41];
        assert!(matches!(
            WithdrawalRequest::new("wallet", short, U256::from(1)),
            Err(WithdrawalError::Validation(_))
        ));
        let long = format!("{GOOD}0");
        assert!(parse_destination(&long).is_err());
        assert!(parse_destination(&GOOD[2..]).is_err());
        assert!(parse_destination("0xZZ997970C51812dc3A010C7d01b50e0d17dc79C8").is_err());
        assert!(parse_destination(GOOD).is_ok());
    }

    #[test]
    fn test_empty_wallet_rejected() {
        assert!(WithdrawalRequest::new(" ", GOOD, U256::from(1)).is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1000").unwrap(), U256::from(1000));
        assert_eq!(parse_amount("0x10").unwrap(), U256::from(16));
        assert!(parse_amount("1.5").is_err());
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("").is_err());
        assert_eq!(parse_amount("0").unwrap(), U256::ZERO);
    }
}
