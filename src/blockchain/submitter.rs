//! Serialized submission through the single relayer identity.
//!
//! Every relayed transaction, whichever component produced it, passes
//! through one bounded channel drained by one worker task. The worker is the
//! only holder of the nonce counter and hands out the next nonce only after
//! the network accepted the previous transaction.
//!
//! ```text
//! withdrawal task ─┐
//! withdrawal task ─┼─▶ mpsc (bounded) ─▶ SubmissionWorker ─▶ sign ─▶ broadcast
//! paymaster claim ─┘                          │
//!                                             └─▶ oneshot reply per job
//! ```
//!
//! A rejected broadcast drops the cached nonce; the next job resynchronizes
//! from the chain's pending nonce.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::blockchain::client::ChainBackend;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, PendingTransaction, SubmissionRequest,
};
use crate::blockchain::wallet::Wallet;
use crate::observability::metrics;

struct SubmissionJob {
    request: SubmissionRequest,
    reply: oneshot::Sender<BlockchainResult<PendingTransaction>>,
}

/// Producer side of the submission queue. Cheap to clone.
#[derive(Clone)]
pub struct SubmissionQueue {
    tx: mpsc::Sender<SubmissionJob>,
    received: Arc<AtomicU64>,
}

impl SubmissionQueue {
    /// Spawn the worker task and return the queue handle.
    ///
    /// The worker exits once every handle has been dropped.
    pub fn spawn(backend: Arc<dyn ChainBackend>, wallet: Wallet, depth: usize) -> Self {
        let (tx, rx) = mpsc::channel(depth.max(1));
        let worker = SubmissionWorker {
            backend,
            wallet,
            next_nonce: None,
            rx,
        };
        tokio::spawn(worker.run());

        Self {
            tx,
            received: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Enqueue a transaction and wait until the network accepted or rejected it.
    ///
    /// Waits for queue capacity when the queue is full. Dropping the returned
    /// future after enqueueing does not withdraw the job.
    pub async fn submit(&self, request: SubmissionRequest) -> BlockchainResult<PendingTransaction> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(SubmissionJob { request, reply })
            .await
            .map_err(|_| BlockchainError::QueueClosed)?;
        self.received.fetch_add(1, Ordering::SeqCst);

        response.await.map_err(|_| BlockchainError::QueueClosed)?
    }

    /// Number of jobs that entered the queue since start.
    pub fn jobs_received(&self) -> u64 {
        self.received.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for SubmissionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionQueue")
            .field("jobs_received", &self.jobs_received())
            .field("capacity", &self.tx.capacity())
            .finish()
    }
}

struct SubmissionWorker {
    backend: Arc<dyn ChainBackend>,
    wallet: Wallet,
    next_nonce: Option<u64>,
    rx: mpsc::Receiver<SubmissionJob>,
}

impl SubmissionWorker {
    async fn run(mut self) {
        tracing::info!(relayer = %self.wallet.address(), "Submission worker started");

        while let Some(job) = self.rx.recv().await {
            let result = self.process(&job.request).await;
            metrics::record_submission(if result.is_ok() { "accepted" } else { "rejected" });
            if job.reply.send(result).is_err() {
                tracing::debug!("Submitter went away before the result was delivered");
            }
        }

        tracing::info!("Submission worker stopped");
    }

    async fn process(&mut self, request: &SubmissionRequest) -> BlockchainResult<PendingTransaction> {
        let nonce = match self.next_nonce {
            Some(nonce) => nonce,
            None => {
                let nonce = self.backend.pending_nonce(self.wallet.address()).await?;
                tracing::debug!(nonce, "Synchronized relayer nonce from chain");
                nonce
            }
        };

        let signed = self.wallet.sign_transaction(request, nonce).await?;

        match self.backend.send_raw_transaction(&signed).await {
            Ok(tx_hash) => {
                self.next_nonce = Some(nonce + 1);
                tracing::info!(
                    tx_hash = %tx_hash,
                    nonce,
                    to = %request.to,
                    gas_limit = request.gas_limit,
                    gas_price = request.gas_price,
                    "Transaction accepted by network"
                );
                Ok(PendingTransaction { tx_hash, nonce })
            }
            Err(e) => {
                self.next_nonce = None;
                tracing::warn!(nonce, error = %e, "Transaction rejected, nonce will be resynchronized");
                Err(BlockchainError::Submission(e.to_string()))
            }
        }
    }
}
