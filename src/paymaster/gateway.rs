//! Reads and writes against the on-chain reimbursement pool.

use alloy::primitives::{utils::format_ether, Address, Bytes, TxHash, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use tracing::{info, warn};

use crate::blockchain::{BlockchainError, ChainConnector, SubmissionRequest};
use crate::config::GasType;
use crate::fees::{effective_gas_price, reimbursement_amount};
use crate::observability::metrics;
use crate::paymaster::types::{
    ClaimReceipt, PaymasterError, PaymasterPoolState, PaymasterResult, ReimbursementHandle,
    ReimbursementOutcome, SkipReason,
};

sol! {
    interface IGhostPaymaster {
        function relayer() external view returns (address);
        function feeBasisPoints() external view returns (uint256);
        function owner() external view returns (address);
        function calculateFee(uint256 amount) external view returns (uint256);
        function claimGasReimbursement(uint256 gasUsed, uint256 gasPrice) external;
    }
}

pub use IGhostPaymaster::{
    calculateFeeCall, claimGasReimbursementCall, feeBasisPointsCall, ownerCall, relayerCall,
};

/// Gas limit for `claimGasReimbursement`.
pub const CLAIM_GAS_LIMIT: u64 = 120_000;

/// Gas limit for a plain value transfer into the pool's `receive()`.
pub const FUND_GAS_LIMIT: u64 = 60_000;

/// Gateway to one deployed paymaster contract.
#[derive(Debug, Clone)]
pub struct PaymasterGateway {
    connector: ChainConnector,
    address: Address,
    min_gas_price: u128,
    gas_type: GasType,
}

impl PaymasterGateway {
    pub fn new(
        connector: ChainConnector,
        address: Address,
        min_gas_price: u128,
        gas_type: GasType,
    ) -> Self {
        Self {
            connector,
            address,
            min_gas_price,
            gas_type,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn read<C: SolCall>(&self, call: C) -> PaymasterResult<C::Return> {
        let data = self
            .connector
            .call(self.address, Bytes::from(call.abi_encode()))
            .await
            .map_err(PaymasterError::Read)?;
        C::abi_decode_returns(&data)
            .map_err(|e| PaymasterError::Read(BlockchainError::Abi(e.to_string())))
    }

    /// Native balance held by the pool.
    pub async fn pool_balance(&self) -> PaymasterResult<U256> {
        self.connector
            .get_balance(self.address)
            .await
            .map_err(PaymasterError::Read)
    }

    /// Snapshot of the pool. All four reads run concurrently.
    pub async fn info(&self) -> PaymasterResult<PaymasterPoolState> {
        let (relayer, fee_basis_points, owner, pool_balance) = tokio::try_join!(
            self.read(relayerCall {}),
            self.read(feeBasisPointsCall {}),
            self.read(ownerCall {}),
            self.pool_balance(),
        )?;

        Ok(PaymasterPoolState {
            address: self.address,
            relayer,
            owner,
            fee_basis_points,
            pool_balance,
        })
    }

    /// Fee the contract itself charges on `amount`.
    pub async fn calculate_fee(&self, amount: U256) -> PaymasterResult<U256> {
        self.read(calculateFeeCall { amount }).await
    }

    async fn send_gas_price(&self) -> Result<u128, BlockchainError> {
        let reported = self.connector.get_gas_price().await?;
        Ok(effective_gas_price(reported, self.min_gas_price))
    }

    /// Claim `gas_used * gas_price` from the pool and wait for it to mine.
    pub async fn claim(&self, gas_used: u64, gas_price: u128) -> PaymasterResult<ClaimReceipt> {
        let amount = reimbursement_amount(gas_used, gas_price);
        let call = claimGasReimbursementCall {
            gasUsed: U256::from(gas_used),
            gasPrice: U256::from(gas_price),
        };

        let send_price = self
            .send_gas_price()
            .await
            .map_err(|e| PaymasterError::Claim(e.to_string()))?;

        let pending = self
            .connector
            .submit(SubmissionRequest {
                to: self.address,
                data: Bytes::from(call.abi_encode()),
                value: U256::ZERO,
                gas_limit: CLAIM_GAS_LIMIT,
                gas_price: send_price,
                gas_type: self.gas_type,
            })
            .await
            .map_err(|e| PaymasterError::Claim(e.to_string()))?;

        let receipt = self
            .connector
            .await_confirmation(&pending)
            .await
            .map_err(|e| PaymasterError::Claim(e.to_string()))?;

        if !receipt.success {
            return Err(PaymasterError::Claim(format!(
                "claim transaction {} reverted",
                receipt.tx_hash
            )));
        }

        info!(
            tx_hash = %receipt.tx_hash,
            amount_bnb = %format_ether(amount),
            "Gas reimbursed"
        );
        Ok(ClaimReceipt {
            tx_hash: receipt.tx_hash,
            amount,
        })
    }

    /// Top up the pool from the relayer identity. Operator-only.
    pub async fn fund(&self, amount: U256) -> PaymasterResult<TxHash> {
        if amount.is_zero() {
            return Err(PaymasterError::Funding("amount must be positive".to_string()));
        }

        let gas_price = self
            .send_gas_price()
            .await
            .map_err(|e| PaymasterError::Funding(e.to_string()))?;

        let pending = self
            .connector
            .submit(SubmissionRequest {
                to: self.address,
                data: Bytes::new(),
                value: amount,
                gas_limit: FUND_GAS_LIMIT,
                gas_price,
                gas_type: self.gas_type,
            })
            .await
            .map_err(|e| PaymasterError::Funding(e.to_string()))?;

        let receipt = self
            .connector
            .await_confirmation(&pending)
            .await
            .map_err(|e| PaymasterError::Funding(e.to_string()))?;

        if !receipt.success {
            return Err(PaymasterError::Funding(format!(
                "funding transaction {} reverted",
                receipt.tx_hash
            )));
        }

        info!(tx_hash = %receipt.tx_hash, amount_bnb = %format_ether(amount), "Pool funded");
        Ok(receipt.tx_hash)
    }

    /// Best-effort reimbursement for a confirmed withdrawal.
    ///
    /// Skips when `pool < required`; an equal balance proceeds.
    pub async fn reimburse(&self, gas_used: u64, gas_price: u128) -> ReimbursementOutcome {
        let required = reimbursement_amount(gas_used, gas_price);

        let pool = match self.pool_balance().await {
            Ok(pool) => pool,
            Err(e) => {
                warn!(error = %e, "Could not read paymaster pool, skipping reimbursement");
                return ReimbursementOutcome::Failed(e.to_string());
            }
        };

        if pool < required {
            warn!(
                pool_bnb = %format_ether(pool),
                required_bnb = %format_ether(required),
                "Paymaster pool too low for reimbursement, skipping"
            );
            return ReimbursementOutcome::Skipped(SkipReason::PoolTooLow { pool, required });
        }

        match self.claim(gas_used, gas_price).await {
            Ok(receipt) => ReimbursementOutcome::Claimed(receipt),
            Err(e) => {
                warn!(error = %e, "Reimbursement failed");
                ReimbursementOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Run the reimbursement in its own task so the caller never waits on it.
///
/// `on_settled` sees the outcome before the handle does.
pub fn spawn_reimbursement<F>(
    gateway: Option<PaymasterGateway>,
    gas_used: u64,
    gas_price: u128,
    on_settled: F,
) -> ReimbursementHandle
where
    F: FnOnce(&ReimbursementOutcome) + Send + 'static,
{
    let task = tokio::spawn(async move {
        let outcome = match gateway {
            Some(gateway) => gateway.reimburse(gas_used, gas_price).await,
            None => {
                info!("Paymaster not configured, skipping reimbursement");
                ReimbursementOutcome::Skipped(SkipReason::NotConfigured)
            }
        };
        metrics::record_reimbursement(outcome.label());
        on_settled(&outcome);
        outcome
    });
    ReimbursementHandle::new(task)
}
