//! Blockchain integration subsystem (the chain connector).
//!
//! # Data Flow
//! ```text
//! Environment (RELAYER_PRIVATE_KEY) + BlockchainConfig
//!     → wallet.rs (key loading, signing)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → submitter.rs (single-consumer queue, nonce assignment, broadcast)
//!     → transaction.rs (bounded confirmation wait)
//!     → connector.rs (the one chain session handed to every component)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - The relayer key is only used by the submission worker

pub mod client;
pub mod connector;
pub mod submitter;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{BlockchainClient, ChainBackend};
pub use connector::ChainConnector;
pub use submitter::SubmissionQueue;
pub use transaction::ConfirmationPolicy;
pub use types::{
    BlockchainError, BlockchainResult, ChainId, ConfirmationStatus, PendingTransaction,
    SignedTransaction, SubmissionRequest, TxReceiptSummary,
};
pub use wallet::Wallet;
