//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Secrets from env → Chain session
//!     → Engine adapter → RelayerContext → Wallet preload (background)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown (shutdown.rs) → Stop accepting → Drain → Exit
//! ```
//!
//! Startup is fail-fast: a missing secret or bad config aborts before the
//! listener binds. The mnemonic preload is the one best-effort step.

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
pub use startup::{build_context, preload_wallet, StartupError};
