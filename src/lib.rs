//! Shielded-pool withdrawal relayer.
//!
//! Turns withdrawal requests into signed, submitted and confirmed
//! transactions paid for by a single relayer identity, and claims the gas
//! back from an on-chain paymaster pool when one is configured.

pub mod balance;
pub mod blockchain;
pub mod config;
pub mod context;
pub mod engine;
pub mod fees;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod paymaster;
pub mod resilience;
pub mod shield;
pub mod withdrawal;

pub use config::RelayerConfig;
pub use context::RelayerContext;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
