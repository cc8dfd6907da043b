use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::engine::{EngineError, ShieldParams, ShieldedEngine, TransactionDescriptor};

/// Fixed challenge the depositor signs.
pub const SHIELD_SIGNATURE_MESSAGE: &str = "RAILGUN_SHIELD";

/// Prefix of every shielded address.
pub const PRIVATE_ADDRESS_PREFIX: &str = "0zk";

const SIGNATURE_LEN: usize = 65;

#[derive(Debug, Error)]
pub enum ShieldError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// One-way derivation of the shielding secret from the raw signature bytes.
pub fn derive_shield_private_key(signature: &[u8]) -> B256 {
    keccak256(signature)
}

fn parse_signature(signature: &str) -> Result<Bytes, ShieldError> {
    let bytes: Bytes = signature
        .parse()
        .map_err(|_| ShieldError::Validation("signature must be 0x-prefixed hex".to_string()))?;
    if bytes.len() != SIGNATURE_LEN {
        return Err(ShieldError::Validation(format!(
            "signature must be {SIGNATURE_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

#[derive(Clone)]
pub struct ShieldComposer {
    engine: Arc<dyn ShieldedEngine>,
    wrapped_token: Address,
}

impl ShieldComposer {
    pub fn new(engine: Arc<dyn ShieldedEngine>, wrapped_token: Address) -> Self {
        Self {
            engine,
            wrapped_token,
        }
    }

    /// Build the deposit transaction. Validates everything before calling the engine.
    pub async fn compose_shield(
        &self,
        railgun_address: &str,
        signature: &str,
        amount: U256,
    ) -> Result<TransactionDescriptor, ShieldError> {
        if amount.is_zero() {
            return Err(ShieldError::Validation("amount must be positive".to_string()));
        }
        if !railgun_address.starts_with(PRIVATE_ADDRESS_PREFIX) {
            return Err(ShieldError::Validation(
                "railgunAddress must start with 0zk".to_string(),
            ));
        }
        let signature = parse_signature(signature)?;

        let params = ShieldParams {
            railgun_address: railgun_address.to_string(),
            shield_private_key: derive_shield_private_key(&signature),
            token: self.wrapped_token,
            amount,
        };

        info!(amount = %amount, "Populating shield transaction");
        Ok(self.engine.populate_shield(&params).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_deterministic() {
        let sig = [7u8; SIGNATURE_LEN];
        assert_eq!(derive_shield_private_key(&sig), derive_shield_private_key(&sig));

        let mut other = sig;
        other[0] = 8;
        assert_ne!(derive_shield_private_key(&sig), derive_shield_private_key(&other));
    }

    #[test]
    fn test_parse_signature() {
        let good = format!("0x{}", "ab".repeat(SIGNATURE_LEN));
        assert_eq!(parse_signature(&good).unwrap().len(), SIGNATURE_LEN);

        assert!(matches!(
            parse_signature("0x1234"),
            Err(ShieldError::Validation(_))
        ));
        assert!(matches!(
            parse_signature("not hex"),
            Err(ShieldError::Validation(_))
        ));
    }
}
