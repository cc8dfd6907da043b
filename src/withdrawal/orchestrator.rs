//! The withdrawal pipeline.
//!
//! ```text
//! Requested → GasEstimated → ProofGenerating → ProofReady
//!           → Submitted → Confirmed → ReimbursementAttempted
//! ```
//!
//! Proof generation runs outside the submission queue, so concurrent
//! withdrawals prove in parallel and only the broadcast is serialized.

use alloy::primitives::{Address, U256};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::blockchain::{BlockchainError, ChainConnector, SubmissionRequest};
use crate::config::GasType;
use crate::engine::{ProgressCallback, ShieldedEngine, UnshieldParams};
use crate::fees::{effective_gas_price, reimbursement_amount, relayer_fee, GasPolicy};
use crate::observability::{logging::short_id, metrics};
use crate::paymaster::{spawn_reimbursement, PaymasterGateway};
use crate::withdrawal::tracker::{WithdrawalState, WithdrawalTracker};
use crate::withdrawal::types::{
    WithdrawalError, WithdrawalOutcome, WithdrawalReceipt, WithdrawalRequest,
};

/// Static parameters of the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct WithdrawalSettings {
    /// Wrapped base token held in the pool.
    pub wrapped_token: Address,
    pub min_gas_price: u128,
    pub gas_type: GasType,
    pub relayer_fee_basis_points: u32,
}

#[derive(Clone)]
pub struct WithdrawalOrchestrator {
    connector: ChainConnector,
    engine: Arc<dyn ShieldedEngine>,
    paymaster: Option<PaymasterGateway>,
    tracker: WithdrawalTracker,
    settings: WithdrawalSettings,
}

impl WithdrawalOrchestrator {
    pub fn new(
        connector: ChainConnector,
        engine: Arc<dyn ShieldedEngine>,
        paymaster: Option<PaymasterGateway>,
        settings: WithdrawalSettings,
    ) -> Self {
        Self {
            connector,
            engine,
            paymaster,
            tracker: WithdrawalTracker::new(),
            settings,
        }
    }

    pub fn tracker(&self) -> &WithdrawalTracker {
        &self.tracker
    }

    /// Run a withdrawal to confirmation.
    ///
    /// Returns once the transaction is mined; the reimbursement claim keeps
    /// running in the background and never changes the result. The pipeline
    /// runs on its own task, so dropping the returned future (request
    /// timeout, client disconnect) leaves it running to a terminal state.
    pub async fn withdraw(
        &self,
        request: WithdrawalRequest,
    ) -> Result<WithdrawalOutcome, WithdrawalError> {
        let id = self.tracker.begin(&request);
        info!(
            %id,
            wallet = %short_id(request.wallet_id()),
            destination = %request.destination(),
            amount = %request.amount(),
            "Withdrawal requested"
        );

        let this = self.clone();
        let pipeline = tokio::spawn(async move {
            match this.run(id, &request).await {
                Ok(outcome) => {
                    metrics::record_withdrawal("confirmed");
                    Ok(outcome)
                }
                Err(e) => {
                    warn!(%id, error = %e, "Withdrawal failed");
                    this.tracker.failed(id, &e);
                    metrics::record_withdrawal(e.label());
                    Err(e)
                }
            }
        });

        match pipeline.await {
            Ok(result) => result,
            Err(e) => {
                let err = WithdrawalError::Interrupted(e.to_string());
                error!(%id, error = %err, "Withdrawal task aborted");
                self.tracker.failed(id, &err);
                metrics::record_withdrawal(err.label());
                Err(err)
            }
        }
    }

    async fn gas_price(&self) -> Result<u128, WithdrawalError> {
        let base_fee = self
            .connector
            .latest_base_fee()
            .await
            .map_err(WithdrawalError::Chain)?;
        Ok(effective_gas_price(
            base_fee.unwrap_or_default(),
            self.settings.min_gas_price,
        ))
    }

    async fn run(
        &self,
        id: Uuid,
        request: &WithdrawalRequest,
    ) -> Result<WithdrawalOutcome, WithdrawalError> {
        let params = UnshieldParams {
            wallet_id: request.wallet_id().to_string(),
            destination: request.destination(),
            token: self.settings.wrapped_token,
            amount: request.amount(),
        };

        // Requested → GasEstimated
        let started = Instant::now();
        let gas_price = self.gas_price().await?;
        let unestimated = GasPolicy {
            gas_type: self.settings.gas_type,
            gas_price,
            gas_estimate: 0,
        };
        let gas_estimate = self
            .engine
            .estimate_unproven_gas(&params, &unestimated)
            .await
            .map_err(WithdrawalError::Estimation)?;
        let gas = GasPolicy {
            gas_estimate,
            ..unestimated
        };
        metrics::record_stage("estimate", started.elapsed());
        self.tracker.transition(id, WithdrawalState::GasEstimated);
        debug!(%id, gas_estimate, gas_price, "Gas estimated");

        // GasEstimated → ProofReady
        let started = Instant::now();
        self.tracker.transition(id, WithdrawalState::ProofGenerating);
        let tracker = self.tracker.clone();
        let progress: ProgressCallback = Arc::new(move |p| {
            debug!(%id, percent = (p * 100.0) as u32, "Proof progress");
            tracker.progress(id, p);
        });
        let proof = self
            .engine
            .generate_proof(&params, gas_price, progress)
            .await
            .map_err(WithdrawalError::Proof)?;
        metrics::record_stage("proof", started.elapsed());
        self.tracker.transition(id, WithdrawalState::ProofReady);
        info!(%id, elapsed_ms = started.elapsed().as_millis() as u64, "Proof generated");

        // ProofReady → Submitted
        let started = Instant::now();
        let tx = self
            .engine
            .populate_proved_transaction(&proof, &gas)
            .await
            .map_err(WithdrawalError::Population)?;
        metrics::record_stage("populate", started.elapsed());

        let started = Instant::now();
        let pending = self
            .connector
            .submit(SubmissionRequest {
                to: tx.to,
                data: tx.data,
                value: tx.value,
                gas_limit: gas.gas_estimate,
                gas_price: gas.gas_price,
                gas_type: gas.gas_type,
            })
            .await
            .map_err(WithdrawalError::Submission)?;
        metrics::record_stage("submit", started.elapsed());
        self.tracker.submitted(id, pending.tx_hash);
        info!(%id, tx_hash = %pending.tx_hash, nonce = pending.nonce, "Withdrawal submitted");

        // Submitted → Confirmed
        let started = Instant::now();
        let mined = self
            .connector
            .await_confirmation(&pending)
            .await
            .map_err(|e| match e {
                BlockchainError::ConfirmationTimeout { tx_hash, secs } => {
                    WithdrawalError::ConfirmationTimeout { tx_hash, secs }
                }
                other => WithdrawalError::Chain(other),
            })?;
        metrics::record_stage("confirm", started.elapsed());

        if !mined.success {
            return Err(WithdrawalError::Reverted {
                tx_hash: mined.tx_hash,
            });
        }

        let paid_price = if mined.effective_gas_price > 0 {
            mined.effective_gas_price
        } else {
            gas.gas_price
        };
        let receipt = WithdrawalReceipt {
            tx_hash: mined.tx_hash,
            block_number: mined.block_number,
            gas_used: mined.gas_used,
            confirmed_fee: reimbursement_amount(mined.gas_used, paid_price),
        };
        self.tracker.confirmed(id, receipt);
        info!(
            %id,
            tx_hash = %receipt.tx_hash,
            block = receipt.block_number,
            gas_used = receipt.gas_used,
            "Withdrawal confirmed"
        );

        // Confirmed → ReimbursementAttempted, off the caller's path.
        let tracker = self.tracker.clone();
        let reimbursement = spawn_reimbursement(
            self.paymaster.clone(),
            mined.gas_used,
            gas.gas_price,
            move |outcome| tracker.reimbursed(id, outcome),
        );

        Ok(WithdrawalOutcome {
            id,
            receipt,
            relayer_fee: relayer_fee(request.amount(), self.settings.relayer_fee_basis_points),
            reimbursement,
        })
    }

    /// Quote the relayer fee without running anything.
    pub fn quote_fee(&self, amount: U256) -> U256 {
        relayer_fee(amount, self.settings.relayer_fee_basis_points)
    }
}

impl std::fmt::Debug for WithdrawalOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WithdrawalOrchestrator")
            .field("connector", &self.connector)
            .field("paymaster", &self.paymaster.as_ref().map(|p| p.address()))
            .field("settings", &self.settings)
            .finish()
    }
}
