//! Withdrawal orchestrator.
//!
//! # Data Flow
//! ```text
//! API request (walletId, destination, amount)
//!     → types.rs (validation, before any I/O)
//!     → orchestrator.rs
//!         gas price (latest base fee, floored) → engine gas estimate
//!         → engine proof (long, parallel across requests)
//!         → engine population → submission queue (serialized, nonce assigned)
//!         → bounded confirmation wait
//!         → reimbursement task (detached, never fails the withdrawal)
//!     → tracker.rs (state per request id)
//! ```
//!
//! # Failure Semantics
//! - Validation, estimation and proof failures submit nothing
//! - A confirmation timeout is reported with the hash; it is not resubmitted
//! - Proof generation is not cancellable once started

pub mod orchestrator;
pub mod tracker;
pub mod types;

pub use orchestrator::{WithdrawalOrchestrator, WithdrawalSettings};
pub use tracker::{WithdrawalRecord, WithdrawalState, WithdrawalTracker};
pub use types::{
    parse_amount, parse_destination, WithdrawalError, WithdrawalOutcome, WithdrawalReceipt,
    WithdrawalRequest,
};
