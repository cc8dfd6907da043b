//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relayer.
//! All types derive Serde traits for deserialization from config files.
//! Secrets (relayer key, engine encryption key) are never part of the file;
//! see [`crate::config::loader`] for the environment variables that carry them.

use serde::{Deserialize, Serialize};

/// Root configuration for the relayer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayerConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Chain connection settings.
    pub blockchain: BlockchainConfig,

    /// Deployed contract addresses.
    pub contracts: ContractsConfig,

    /// Relayer and protocol fee settings.
    pub fees: FeeConfig,

    /// External shielded-pool engine.
    pub engine: EngineConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub explorer: ExplorerConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Request timeout in seconds. Withdrawals block while the proof is built.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
            tls: None,
            request_timeout_secs: 120,
            max_body_size: 64 * 1024,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Transaction envelope used for relayed transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GasType {
    /// Type 0 transactions with a single gas price (BSC).
    #[default]
    Legacy,
    /// EIP-1559 transactions.
    DynamicFee,
}

/// Blockchain integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs, tried in order.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Chain ID (97 for BSC testnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Upper bound on waiting for a submitted transaction to be mined.
    pub confirmation_timeout_secs: u64,

    /// Number of block confirmations required before a receipt is reported.
    pub confirmation_blocks: u32,

    /// Base receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Protocol gas price floor in wei. Some testnets report less than they accept.
    pub min_gas_price_wei: u64,

    /// Envelope type for relayed transactions.
    pub gas_type: GasType,

    /// Capacity of the submission queue in front of the relayer key.
    pub submission_queue_depth: usize,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 97,
            rpc_timeout_secs: 10,
            confirmation_timeout_secs: 60,
            confirmation_blocks: 1,
            poll_interval_ms: 1_000,
            min_gas_price_wei: 3_000_000_000, // 3 gwei
            gas_type: GasType::Legacy,
            submission_queue_depth: 64,
        }
    }
}

/// Addresses of the deployed contracts.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractsConfig {
    /// Shielded pool proxy contract.
    pub railgun_proxy: String,

    /// Relay adapt contract used for base-token wrapping.
    pub relay_adapt: String,

    /// Wrapped base token held inside the pool (WBNB).
    pub wrapped_token: String,

    /// Gas reimbursement pool. Reimbursement is disabled when unset.
    pub paymaster: Option<String>,
}

/// Relayer and protocol fee configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Relayer fee in basis points of the withdrawn amount.
    pub relayer_fee_basis_points: u32,

    /// Shielded-pool protocol fee on deposit, in basis points.
    pub shield_fee_basis_points: u32,

    /// Shielded-pool protocol fee on withdrawal, in basis points.
    pub unshield_fee_basis_points: u32,

    /// Display symbol of the base token.
    pub token_symbol: String,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            relayer_fee_basis_points: 30,
            shield_fee_basis_points: 25,
            unshield_fee_basis_points: 25,
            token_symbol: "BNB".to_string(),
        }
    }
}

/// Connection to the external shielded-pool engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the engine service.
    pub base_url: String,

    /// Timeout for quick engine calls (estimates, balances, wallets).
    pub request_timeout_secs: u64,

    /// Optional timeout for proof generation. Unbounded when unset.
    pub proof_timeout_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3100".to_string(),
            request_timeout_secs: 30,
            proof_timeout_secs: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Operator access configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required by operator endpoints. Usually injected from the
    /// environment rather than written to the file.
    pub api_key: Option<String>,
}

/// Block explorer links included in API responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Prefix a transaction hash is appended to.
    pub tx_url_prefix: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            tx_url_prefix: "https://testnet.bscscan.com/tx/".to_string(),
        }
    }
}

impl ExplorerConfig {
    /// Explorer URL for a transaction hash.
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}{}", self.tx_url_prefix, tx_hash)
    }
}
