//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + environment
//!     → loader.rs (parse, deserialize, env overrides, secrets)
//!     → validation.rs (semantic checks)
//!     → RelayerConfig (validated, immutable)
//!     → shared via Arc<RelayerContext> to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at boot; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Secrets are only ever read from the environment
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, Secrets};
pub use schema::{
    AdminConfig, BlockchainConfig, ContractsConfig, EngineConfig, ExplorerConfig, FeeConfig,
    GasType, ListenerConfig, ObservabilityConfig, RelayerConfig, TlsConfig,
};
