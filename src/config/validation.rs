//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, basis points <= 10_000)
//! - Check that URLs and contract addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use std::fmt;

use crate::config::schema::RelayerConfig;
use crate::fees::BASIS_POINTS_DENOMINATOR;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human readable description.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &RelayerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be > 0"));
    }

    let chain = &config.blockchain;
    check_url(&mut errors, "blockchain.rpc_url", &chain.rpc_url);
    for (i, url) in chain.failover_urls.iter().enumerate() {
        check_url(&mut errors, &format!("blockchain.failover_urls[{i}]"), url);
    }
    if chain.chain_id == 0 {
        errors.push(ValidationError::new("blockchain.chain_id", "must be > 0"));
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be > 0"));
    }
    if chain.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "blockchain.confirmation_timeout_secs",
            "must be > 0",
        ));
    }
    if chain.poll_interval_ms == 0 {
        errors.push(ValidationError::new("blockchain.poll_interval_ms", "must be > 0"));
    }
    if chain.submission_queue_depth == 0 {
        errors.push(ValidationError::new(
            "blockchain.submission_queue_depth",
            "must be > 0",
        ));
    }

    let contracts = &config.contracts;
    check_address(&mut errors, "contracts.railgun_proxy", &contracts.railgun_proxy);
    check_address(&mut errors, "contracts.relay_adapt", &contracts.relay_adapt);
    check_address(&mut errors, "contracts.wrapped_token", &contracts.wrapped_token);
    if let Some(paymaster) = &contracts.paymaster {
        check_address(&mut errors, "contracts.paymaster", paymaster);
    }

    for (field, bps) in [
        ("fees.relayer_fee_basis_points", config.fees.relayer_fee_basis_points),
        ("fees.shield_fee_basis_points", config.fees.shield_fee_basis_points),
        ("fees.unshield_fee_basis_points", config.fees.unshield_fee_basis_points),
    ] {
        if u64::from(bps) > BASIS_POINTS_DENOMINATOR {
            errors.push(ValidationError::new(
                field,
                format!("{bps} exceeds {BASIS_POINTS_DENOMINATOR}"),
            ));
        }
    }

    check_url(&mut errors, "engine.base_url", &config.engine.base_url);
    if config.engine.proof_timeout_secs == Some(0) {
        errors.push(ValidationError::new("engine.proof_timeout_secs", "must be > 0 when set"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "is not a socket address",
        ));
    }

    if matches!(&config.admin.api_key, Some(key) if key.trim().is_empty()) {
        errors.push(ValidationError::new("admin.api_key", "must be non-empty when set"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if let Err(e) = value.parse::<url::Url>() {
        errors.push(ValidationError::new(field, format!("invalid URL '{value}': {e}")));
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(field, "is required"));
    } else if value.parse::<Address>().is_err() {
        errors.push(ValidationError::new(field, format!("'{value}' is not an address")));
    }
}
