use alloy::primitives::{Address, U256};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::engine::ShieldedEngine;
use crate::observability::logging::short_id;
use crate::withdrawal::types::serialize_decimal;

/// Display symbol for the wrapped base token held in the pool.
pub const SHIELDED_SYMBOL: &str = "BNB (shielded)";

const DECIMALS: u32 = 18;
const DISPLAY_DECIMALS: u32 = 6;

/// Result of the incremental scan that precedes a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed,
    /// Scan failed; the read uses whatever the engine already had.
    Stale(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateBalance {
    pub token_address: Address,
    pub symbol: String,
    #[serde(serialize_with = "serialize_decimal")]
    pub balance_wei: U256,
    pub balance_formatted: String,
    #[serde(skip)]
    pub scan: ScanOutcome,
}

/// Render an 18-decimal amount with six fractional digits, rounding half up.
pub fn format_units(amount: U256) -> String {
    let step = U256::from(10u64).pow(U256::from(DECIMALS - DISPLAY_DECIMALS));
    let scale = U256::from(10u64).pow(U256::from(DISPLAY_DECIMALS));
    let rounded = amount.saturating_add(step / U256::from(2u64)) / step;
    let (whole, frac) = rounded.div_rem(scale);
    format!("{whole}.{:0>width$}", frac.to_string(), width = DISPLAY_DECIMALS as usize)
}

#[derive(Clone)]
pub struct BalanceReader {
    engine: Arc<dyn ShieldedEngine>,
    asset: Address,
}

impl BalanceReader {
    pub fn new(engine: Arc<dyn ShieldedEngine>, asset: Address) -> Self {
        Self { engine, asset }
    }

    async fn scan(&self, wallet_id: &str) -> ScanOutcome {
        match self.engine.scan_incrementally(&[wallet_id.to_string()]).await {
            Ok(()) => ScanOutcome::Completed,
            Err(e) => {
                warn!(wallet = %short_id(wallet_id), error = %e, "Balance scan failed, reading cached state");
                ScanOutcome::Stale(e.to_string())
            }
        }
    }

    /// Shielded balance of the reference asset. Zero on total failure.
    pub async fn get_private_balance(&self, wallet_id: &str) -> PrivateBalance {
        let scan = self.scan(wallet_id).await;

        let balance = match self.engine.read_balance(wallet_id, self.asset).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!(wallet = %short_id(wallet_id), error = %e, "Balance read failed, reporting zero");
                U256::ZERO
            }
        };

        PrivateBalance {
            token_address: self.asset,
            symbol: SHIELDED_SYMBOL.to_string(),
            balance_wei: balance,
            balance_formatted: format_units(balance),
            scan,
        }
    }
}
