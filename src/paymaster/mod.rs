//! Paymaster gateway.
//!
//! # Data Flow
//! ```text
//! Withdrawal confirmed (gas_used, gas_price)
//!     → gateway.rs reimburse(): pool balance check, strict `pool < required` skip
//!     → claimGasReimbursement through the submission queue
//!     → ReimbursementOutcome (Claimed | Skipped | Failed), never an error
//!
//! API → gateway.rs info() / calculate_fee() / fund()
//! ```
//!
//! Fee quotes come from the contract's own `calculateFee`, never recomputed
//! locally.

pub mod gateway;
pub mod types;

pub use gateway::{spawn_reimbursement, PaymasterGateway};
pub use types::{
    ClaimReceipt, PaymasterError, PaymasterPoolState, PaymasterResult, ReimbursementHandle,
    ReimbursementOutcome, SkipReason,
};
