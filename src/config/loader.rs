//! Configuration loading from disk and environment.
//!
//! The file supplies structure; the environment supplies secrets and a small
//! set of deployment overrides. Everything is resolved once at boot.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::config::schema::RelayerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Relayer signing key (hex, with or without 0x).
pub const RELAYER_PRIVATE_KEY_ENV: &str = "RELAYER_PRIVATE_KEY";
/// Key the engine uses to encrypt wallet material at rest.
pub const ENGINE_ENCRYPTION_KEY_ENV: &str = "RAILGUN_ENCRYPTION_KEY";
/// Optional mnemonic whose wallet is preloaded at boot.
pub const MNEMONIC_ENV: &str = "RAILGUN_MNEMONIC";
/// Optional operator token for pool funding.
pub const ADMIN_TOKEN_ENV: &str = "RELAYER_ADMIN_TOKEN";

const RPC_URL_ENV: &str = "BSC_TESTNET_RPC";
const RPC_FALLBACK_ENV: &str = "BSC_TESTNET_RPC_FALLBACK";
const PAYMASTER_ENV: &str = "GHOST_PAYMASTER";
const PROXY_ENV: &str = "RAILGUN_PROXY";
const RELAY_ADAPT_ENV: &str = "RAILGUN_RELAY_ADAPT";
const WRAPPED_TOKEN_ENV: &str = "RAILGUN_WBNB";
const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required env var: {0}")]
    MissingEnv(&'static str),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Secret material read from the environment. Never logged or serialized.
#[derive(Clone)]
pub struct Secrets {
    pub relayer_private_key: String,
    pub engine_encryption_key: String,
    pub mnemonic: Option<String>,
}

impl Secrets {
    /// Read secrets from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingEnv(name))
        };

        Ok(Self {
            relayer_private_key: required(RELAYER_PRIVATE_KEY_ENV)?,
            engine_encryption_key: required(ENGINE_ENCRYPTION_KEY_ENV)?,
            mnemonic: lookup(MNEMONIC_ENV).filter(|m| !m.trim().is_empty()),
        })
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("relayer_private_key", &"<redacted>")
            .field("engine_encryption_key", &"<redacted>")
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Load, apply environment overrides, and validate configuration.
///
/// A missing file is not an error: defaults plus environment overrides are
/// enough for a single-node testnet deployment.
pub fn load_config(path: &Path) -> Result<RelayerConfig, ConfigError> {
    let mut config: RelayerConfig = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        tracing::warn!(path = ?path, "Config file not found, using defaults");
        RelayerConfig::default()
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_env_overrides(config: &mut RelayerConfig, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(RPC_URL_ENV) {
        config.blockchain.rpc_url = url;
    }
    if let Some(url) = non_empty(RPC_FALLBACK_ENV) {
        if !config.blockchain.failover_urls.contains(&url) {
            config.blockchain.failover_urls.push(url);
        }
    }
    if let Some(proxy) = non_empty(PROXY_ENV) {
        config.contracts.railgun_proxy = proxy;
    }
    if let Some(adapt) = non_empty(RELAY_ADAPT_ENV) {
        config.contracts.relay_adapt = adapt;
    }
    if let Some(token) = non_empty(WRAPPED_TOKEN_ENV) {
        config.contracts.wrapped_token = token;
    }
    if let Some(paymaster) = non_empty(PAYMASTER_ENV) {
        config.contracts.paymaster = Some(paymaster);
    }
    if let Some(port) = non_empty(PORT_ENV) {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{host}:{port}");
    }
    if let Some(token) = non_empty(ADMIN_TOKEN_ENV) {
        config.admin.api_key = Some(token);
    }
}
