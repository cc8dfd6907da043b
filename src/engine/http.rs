//! HTTP adapter for an engine sidecar.
//!
//! The sidecar exposes the wallet, scan, proof and population calls as JSON
//! endpoints under `/v1`. Failed calls answer with `{"error": "..."}`.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{EngineConfig, GasType};
use crate::engine::types::{
    EngineError, EngineResult, ProgressCallback, ProofArtifact, ShieldParams,
    TransactionDescriptor, UnshieldParams, WalletInfo,
};
use crate::engine::ShieldedEngine;
use crate::fees::GasPolicy;
use crate::observability::logging::short_id;

/// Engine reached over HTTP.
pub struct HttpEngine {
    client: reqwest::Client,
    base_url: String,
    encryption_key: String,
    request_timeout: Duration,
    proof_timeout: Option<Duration>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GasEstimateBody {
    gas_estimate: u64,
}

#[derive(Deserialize)]
struct ProofBody {
    proof: Value,
}

#[derive(Deserialize)]
struct BalanceBody {
    balance: U256,
}

impl HttpEngine {
    pub fn new(config: &EngineConfig, encryption_key: String) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            encryption_key,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            proof_timeout: config.proof_timeout_secs.map(Duration::from_secs),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode the reply, mapping remote failures with `kind`.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        kind: fn(String) -> EngineError,
    ) -> EngineResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => format!("engine returned {status}"),
            };
            return Err(kind(message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| kind(format!("malformed engine response: {e}")))
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
        kind: fn(String) -> EngineError,
    ) -> EngineResult<T> {
        let request = self
            .client
            .post(self.url(path))
            .timeout(self.request_timeout)
            .json(&body);
        self.send(request, kind).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        kind: fn(String) -> EngineError,
    ) -> EngineResult<T> {
        let request = self.client.get(self.url(path)).timeout(self.request_timeout);
        self.send(request, kind).await
    }
}

fn gas_json(gas: &GasPolicy) -> Value {
    let gas_type = match gas.gas_type {
        GasType::Legacy => "legacy",
        GasType::DynamicFee => "dynamic_fee",
    };
    json!({
        "gasType": gas_type,
        "gasPrice": gas.gas_price.to_string(),
        "gasEstimate": gas.gas_estimate.to_string(),
    })
}

#[async_trait]
impl ShieldedEngine for HttpEngine {
    async fn estimate_unproven_gas(
        &self,
        params: &UnshieldParams,
        gas: &GasPolicy,
    ) -> EngineResult<u64> {
        let body: GasEstimateBody = self
            .post(
                "/v1/unshield/estimate",
                json!({ "params": params, "gas": gas_json(gas) }),
                EngineError::Estimation,
            )
            .await?;
        Ok(body.gas_estimate)
    }

    async fn generate_proof(
        &self,
        params: &UnshieldParams,
        gas_price: u128,
        progress: ProgressCallback,
    ) -> EngineResult<ProofArtifact> {
        progress(0.0);

        let mut request = self.client.post(self.url("/v1/unshield/proof")).json(&json!({
            "params": params,
            "gasPrice": gas_price.to_string(),
            "encryptionKey": self.encryption_key,
        }));
        if let Some(limit) = self.proof_timeout {
            request = request.timeout(limit);
        }

        debug!(wallet = %short_id(&params.wallet_id), "Requesting proof from engine");
        let body: ProofBody = self.send(request, EngineError::Proof).await?;
        progress(1.0);

        Ok(ProofArtifact {
            params: params.clone(),
            gas_price,
            payload: body.proof,
        })
    }

    async fn populate_proved_transaction(
        &self,
        proof: &ProofArtifact,
        gas: &GasPolicy,
    ) -> EngineResult<TransactionDescriptor> {
        self.post(
            "/v1/unshield/populate",
            json!({ "proof": proof, "gas": gas_json(gas) }),
            EngineError::Population,
        )
        .await
    }

    async fn derive_wallet_from_mnemonic(&self, mnemonic: &str) -> EngineResult<WalletInfo> {
        let wallet: WalletInfo = self
            .post(
                "/v1/wallets",
                json!({ "mnemonic": mnemonic, "encryptionKey": self.encryption_key }),
                EngineError::Wallet,
            )
            .await?;
        info!(wallet = %short_id(&wallet.id), "Shielded wallet loaded");
        Ok(wallet)
    }

    async fn wallet_address(&self, wallet_id: &str) -> EngineResult<WalletInfo> {
        self.get(&format!("/v1/wallets/{wallet_id}"), EngineError::Wallet)
            .await
    }

    async fn scan_incrementally(&self, wallet_ids: &[String]) -> EngineResult<()> {
        let _: Value = self
            .post(
                "/v1/scan",
                json!({ "walletIds": wallet_ids }),
                EngineError::Scan,
            )
            .await?;
        Ok(())
    }

    async fn read_balance(&self, wallet_id: &str, asset: Address) -> EngineResult<U256> {
        let body: BalanceBody = self
            .get(
                &format!("/v1/wallets/{wallet_id}/balances/{asset}"),
                EngineError::Balance,
            )
            .await?;
        Ok(body.balance)
    }

    async fn populate_shield(&self, params: &ShieldParams) -> EngineResult<TransactionDescriptor> {
        self.post(
            "/v1/shield/populate",
            serde_json::to_value(params).map_err(|e| EngineError::Shield(e.to_string()))?,
            EngineError::Shield,
        )
        .await
    }
}

impl std::fmt::Debug for HttpEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEngine")
            .field("base_url", &self.base_url)
            .field("encryption_key", &"[REDACTED]")
            .finish()
    }
}
