//! Client for the relayer HTTP API.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("relayer returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: String,
    pub network: String,
    pub chain_id: u64,
    pub relayer_address: String,
    pub relayer_balance: Option<String>,
    pub paymaster_configured: bool,
    pub rpc_healthy: bool,
    #[serde(default)]
    pub withdrawals_in_flight: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSchedule {
    pub relayer_fee_basis_points: u32,
    pub relayer_fee_percent: String,
    pub shield_fee_percent: String,
    pub unshield_fee_percent: String,
    pub total_approx_percent: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub id: String,
    pub railgun_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldTransaction {
    pub to: String,
    pub data: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedWithdrawal {
    pub id: String,
    pub status: String,
    pub tx_hash: String,
    pub block_number: u64,
    pub gas_used: String,
    pub network_fee: String,
    pub relayer_fee: String,
    pub explorer_url: String,
}

/// A withdrawal either confirmed within the bound or is still pending on-chain.
#[derive(Debug, Clone)]
pub enum WithdrawalResult {
    Confirmed(ConfirmedWithdrawal),
    Submitted { tx_hash: String, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus {
    pub status: String,
    pub block_number: Option<u64>,
    pub gas_used: Option<String>,
    pub explorer_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateBalance {
    pub token_address: String,
    pub symbol: String,
    pub balance_wei: String,
    pub balance_formatted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterFee {
    pub amount_wei: String,
    pub fee_wei: String,
}

pub struct RelayerClient {
    client: Client,
    base_url: String,
    operator_token: Option<String>,
}

impl RelayerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            operator_token: None,
        }
    }

    /// Token sent as `Authorization: Bearer` on operator routes.
    pub fn with_operator_token(mut self, token: impl Into<String>) -> Self {
        self.operator_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_raw(&self, request: RequestBuilder) -> SdkResult<(StatusCode, Value)> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body: Value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok((status, body))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> SdkResult<T> {
        let (status, body) = self.send_raw(request).await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        Ok(serde_json::from_value(body)?)
    }

    pub async fn health(&self) -> SdkResult<Health> {
        self.send(self.client.get(self.url("/api/health"))).await
    }

    pub async fn fees(&self) -> SdkResult<FeeSchedule> {
        self.send(self.client.get(self.url("/api/fees"))).await
    }

    pub async fn create_wallet(&self, mnemonic: &str) -> SdkResult<WalletInfo> {
        let request = self
            .client
            .post(self.url("/api/wallet/create"))
            .json(&json!({ "mnemonic": mnemonic }));
        self.send(request).await
    }

    pub async fn wallet_address(&self, wallet_id: &str) -> SdkResult<WalletInfo> {
        self.send(self.client.get(self.url(&format!("/api/wallet/{wallet_id}/address"))))
            .await
    }

    /// The message a depositor signs before shielding.
    pub async fn shield_signature_message(&self) -> SdkResult<String> {
        let body: Value = self
            .send(self.client.get(self.url("/api/shield/signature-message")))
            .await?;
        Ok(body["message"].as_str().unwrap_or_default().to_string())
    }

    pub async fn shield(
        &self,
        amount_wei: &str,
        railgun_address: &str,
        signature: &str,
    ) -> SdkResult<ShieldTransaction> {
        let request = self.client.post(self.url("/api/shield")).json(&json!({
            "amount": amount_wei,
            "railgunAddress": railgun_address,
            "signature": signature,
        }));
        let body: Value = self.send(request).await?;
        Ok(serde_json::from_value(body["transaction"].clone())?)
    }

    /// Request a withdrawal. Blocks until mined or the confirmation bound passes.
    pub async fn unshield(
        &self,
        wallet_id: &str,
        destination: &str,
        amount_wei: &str,
    ) -> SdkResult<WithdrawalResult> {
        let request = self.client.post(self.url("/api/unshield")).json(&json!({
            "walletId": wallet_id,
            "destinationAddress": destination,
            "amount": amount_wei,
        }));
        let (status, body) = self.send_raw(request).await?;

        match status {
            StatusCode::ACCEPTED => Ok(WithdrawalResult::Submitted {
                tx_hash: body["txHash"].as_str().unwrap_or_default().to_string(),
                message: body["error"].as_str().unwrap_or_default().to_string(),
            }),
            s if s.is_success() => Ok(WithdrawalResult::Confirmed(serde_json::from_value(body)?)),
            s => Err(api_error(s, &body)),
        }
    }

    /// Where a previously requested withdrawal is in the pipeline.
    pub async fn withdrawal(&self, id: &str) -> SdkResult<Value> {
        self.send(self.client.get(self.url(&format!("/api/unshield/{id}"))))
            .await
    }

    pub async fn transaction_status(&self, tx_hash: &str) -> SdkResult<TransactionStatus> {
        self.send(self.client.get(self.url(&format!("/api/status/{tx_hash}"))))
            .await
    }

    pub async fn balance(&self, wallet_id: &str) -> SdkResult<PrivateBalance> {
        self.send(
            self.client
                .get(self.url(&format!("/api/status/balance/{wallet_id}"))),
        )
        .await
    }

    pub async fn paymaster(&self) -> SdkResult<Value> {
        self.send(self.client.get(self.url("/api/paymaster"))).await
    }

    pub async fn paymaster_fee(&self, amount_wei: &str) -> SdkResult<PaymasterFee> {
        self.send(
            self.client
                .get(self.url(&format!("/api/paymaster/fee/{amount_wei}"))),
        )
        .await
    }

    /// Top up the paymaster pool. Needs the operator token when the relayer has one.
    pub async fn fund_paymaster(&self, amount_wei: &str) -> SdkResult<Value> {
        let mut request = self
            .client
            .post(self.url("/api/paymaster/fund"))
            .json(&json!({ "amount": amount_wei }));
        if let Some(token) = &self.operator_token {
            request = request.bearer_auth(token);
        }
        self.send(request).await
    }
}

fn api_error(status: StatusCode, body: &Value) -> SdkError {
    let message = body["error"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());
    SdkError::Api {
        status: status.as_u16(),
        message,
    }
}
