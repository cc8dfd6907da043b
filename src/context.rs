//! Composition root.
//!
//! Everything the API needs, built once at startup and shared by `Arc`.
//! There are no process-wide singletons: tests build their own context
//! around mock chain and engine backends.

use alloy::primitives::Address;
use std::sync::Arc;

use crate::balance::BalanceReader;
use crate::blockchain::ChainConnector;
use crate::config::validation::ValidationError;
use crate::config::{ConfigError, RelayerConfig};
use crate::engine::ShieldedEngine;
use crate::fees::FeeSchedule;
use crate::paymaster::{PaymasterError, PaymasterGateway};
use crate::shield::ShieldComposer;
use crate::withdrawal::{WithdrawalOrchestrator, WithdrawalSettings};

pub struct RelayerContext {
    pub config: RelayerConfig,
    pub connector: ChainConnector,
    pub engine: Arc<dyn ShieldedEngine>,
    pub paymaster: Option<PaymasterGateway>,
    pub withdrawals: WithdrawalOrchestrator,
    pub balances: BalanceReader,
    pub shield: ShieldComposer,
    pub fees: FeeSchedule,
}

fn parse_address(field: &str, raw: &str) -> Result<Address, ConfigError> {
    raw.parse().map_err(|_| {
        ConfigError::Validation(vec![ValidationError {
            field: field.to_string(),
            message: format!("invalid address '{raw}'"),
        }])
    })
}

impl RelayerContext {
    pub fn new(
        config: RelayerConfig,
        connector: ChainConnector,
        engine: Arc<dyn ShieldedEngine>,
    ) -> Result<Self, ConfigError> {
        let wrapped_token = parse_address("contracts.wrapped_token", &config.contracts.wrapped_token)?;
        let min_gas_price = u128::from(config.blockchain.min_gas_price_wei);
        let gas_type = config.blockchain.gas_type;

        let paymaster = config
            .contracts
            .paymaster
            .as_deref()
            .map(|raw| parse_address("contracts.paymaster", raw))
            .transpose()?
            .map(|address| {
                PaymasterGateway::new(connector.clone(), address, min_gas_price, gas_type)
            });

        let withdrawals = WithdrawalOrchestrator::new(
            connector.clone(),
            engine.clone(),
            paymaster.clone(),
            WithdrawalSettings {
                wrapped_token,
                min_gas_price,
                gas_type,
                relayer_fee_basis_points: config.fees.relayer_fee_basis_points,
            },
        );

        Ok(Self {
            balances: BalanceReader::new(engine.clone(), wrapped_token),
            shield: ShieldComposer::new(engine.clone(), wrapped_token),
            fees: FeeSchedule::from_config(&config.fees),
            config,
            connector,
            engine,
            paymaster,
            withdrawals,
        })
    }

    /// The paymaster gateway, or `NotConfigured`.
    pub fn paymaster(&self) -> Result<&PaymasterGateway, PaymasterError> {
        self.paymaster.as_ref().ok_or(PaymasterError::NotConfigured)
    }

    /// Block explorer link for a transaction.
    pub fn explorer_url(&self, tx_hash: &str) -> String {
        self.config.explorer.tx_url(tx_hash)
    }

    /// Human-readable network name for the configured chain.
    pub fn network_name(&self) -> &'static str {
        match self.connector.chain_id() {
            56 => "BSC Mainnet",
            97 => "BSC Testnet",
            1 => "Ethereum Mainnet",
            11155111 => "Sepolia",
            31337 => "Local",
            _ => "Unknown",
        }
    }
}

impl std::fmt::Debug for RelayerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayerContext")
            .field("connector", &self.connector)
            .field("paymaster", &self.paymaster.as_ref().map(|p| p.address()))
            .finish()
    }
}
