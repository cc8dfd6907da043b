//! Route handlers.

use alloy::primitives::{utils::format_ether, TxHash, U256};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::balance::PrivateBalance;
use crate::blockchain::ConfirmationStatus;
use crate::context::RelayerContext;
use crate::engine::WalletInfo;
use crate::fees::FeeSchedule;
use crate::http::error::{ApiError, ApiResult};
use crate::shield::SHIELD_SIGNATURE_MESSAGE;
use crate::withdrawal::{parse_amount, WithdrawalRecord, WithdrawalRequest};

type Ctx = State<Arc<RelayerContext>>;

/// An amount given either as a JSON number or a decimal/hex string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(u64),
    Text(String),
}

impl AmountInput {
    fn parse(&self) -> ApiResult<U256> {
        match self {
            AmountInput::Number(n) => Ok(U256::from(*n)),
            AmountInput::Text(s) => Ok(parse_amount(s)?),
        }
    }
}

fn required<T>(value: Option<T>, message: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

// ---- wallet ----

#[derive(Debug, Deserialize)]
pub struct CreateWalletBody {
    mnemonic: Option<String>,
}

pub async fn create_wallet(
    State(ctx): Ctx,
    payload: Result<Json<CreateWalletBody>, JsonRejection>,
) -> ApiResult<Json<WalletInfo>> {
    let Json(body) = payload?;
    let mnemonic = required(
        body.mnemonic.filter(|m| !m.trim().is_empty()),
        "mnemonic is required (string)",
    )?;
    Ok(Json(ctx.engine.derive_wallet_from_mnemonic(&mnemonic).await?))
}

pub async fn wallet_address(
    State(ctx): Ctx,
    Path(wallet_id): Path<String>,
) -> ApiResult<Json<WalletInfo>> {
    Ok(Json(ctx.engine.wallet_address(&wallet_id).await?))
}

// ---- shield ----

pub async fn shield_signature_message() -> Json<Value> {
    Json(json!({ "message": SHIELD_SIGNATURE_MESSAGE }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldBody {
    amount: Option<AmountInput>,
    railgun_address: Option<String>,
    #[serde(alias = "shieldPrivateKey")]
    signature: Option<String>,
}

pub async fn shield(
    State(ctx): Ctx,
    payload: Result<Json<ShieldBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = payload?;
    let missing = "amount, railgunAddress, and signature are required";
    let amount = required(body.amount, missing)?.parse()?;
    let railgun_address = required(body.railgun_address, missing)?;
    let signature = required(body.signature, missing)?;

    let tx = ctx
        .shield
        .compose_shield(&railgun_address, &signature, amount)
        .await?;

    Ok(Json(json!({
        "transaction": {
            "to": tx.to,
            "data": tx.data,
            "value": tx.value.to_string(),
        }
    })))
}

// ---- unshield ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnshieldBody {
    wallet_id: Option<String>,
    amount: Option<AmountInput>,
    destination_address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnshieldResponse {
    id: Uuid,
    status: &'static str,
    tx_hash: TxHash,
    block_number: u64,
    gas_used: String,
    network_fee: String,
    relayer_fee: String,
    explorer_url: String,
}

/// Blocks until the withdrawal is mined. Proof generation alone takes tens of seconds.
pub async fn unshield(
    State(ctx): Ctx,
    payload: Result<Json<UnshieldBody>, JsonRejection>,
) -> ApiResult<Json<UnshieldResponse>> {
    let Json(body) = payload?;
    let missing = "walletId, amount, and destinationAddress are required";
    let wallet_id = required(body.wallet_id, missing)?;
    let destination = required(body.destination_address, missing)?;
    let amount = required(body.amount, missing)?.parse()?;

    let request = WithdrawalRequest::new(wallet_id, &destination, amount)?;
    let outcome = ctx.withdrawals.withdraw(request).await?;
    let receipt = outcome.receipt;

    Ok(Json(UnshieldResponse {
        id: outcome.id,
        status: "confirmed",
        tx_hash: receipt.tx_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used.to_string(),
        network_fee: receipt.confirmed_fee.to_string(),
        relayer_fee: outcome.relayer_fee.to_string(),
        explorer_url: ctx.explorer_url(&receipt.tx_hash.to_string()),
    }))
}

pub async fn unshield_status(
    State(ctx): Ctx,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<WithdrawalRecord>> {
    let Path(raw) = path?;
    let id: Uuid = raw
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid withdrawal id".to_string()))?;
    ctx.withdrawals
        .tracker()
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Withdrawal not found".to_string()))
}

// ---- status ----

fn parse_tx_hash(raw: &str) -> ApiResult<TxHash> {
    let invalid = || ApiError::BadRequest("Invalid transaction hash".to_string());
    let hex = raw.strip_prefix("0x").ok_or_else(invalid)?;
    if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    raw.parse().map_err(|_| invalid())
}

pub async fn transaction_status(
    State(ctx): Ctx,
    Path(raw): Path<String>,
) -> ApiResult<Json<Value>> {
    let tx_hash = parse_tx_hash(&raw)?;

    let body = match ctx.connector.transaction_status(tx_hash).await? {
        ConfirmationStatus::Pending => json!({ "status": "pending" }),
        ConfirmationStatus::Confirmed(r) | ConfirmationStatus::Failed(r) => json!({
            "status": if r.success { "confirmed" } else { "failed" },
            "blockNumber": r.block_number,
            "gasUsed": r.gas_used.to_string(),
            "explorerUrl": ctx.explorer_url(&raw),
        }),
    };
    Ok(Json(body))
}

pub async fn private_balance(
    State(ctx): Ctx,
    Path(wallet_id): Path<String>,
) -> ApiResult<Json<PrivateBalance>> {
    if wallet_id.trim().is_empty() {
        return Err(ApiError::BadRequest("walletId is required".to_string()));
    }
    Ok(Json(ctx.balances.get_private_balance(&wallet_id).await))
}

// ---- fees / health ----

pub async fn fees(State(ctx): Ctx) -> Json<FeeSchedule> {
    Json(ctx.fees.clone())
}

pub async fn health(State(ctx): Ctx) -> Json<Value> {
    let rpc_healthy = ctx.connector.is_healthy().await;
    let mut body = json!({
        "status": "ok",
        "network": ctx.network_name(),
        "chainId": ctx.connector.chain_id(),
        "relayerAddress": ctx.connector.relayer_address(),
        "paymasterConfigured": ctx.paymaster.is_some(),
        "rpcHealthy": rpc_healthy,
        "withdrawalsInFlight": ctx.withdrawals.tracker().in_flight(),
    });

    match ctx.connector.relayer_balance().await {
        Ok(balance) => body["relayerBalance"] = json!(balance.to_string()),
        Err(e) => warn!(error = %e, "Relayer balance unavailable"),
    }
    Json(body)
}

// ---- paymaster ----

pub async fn paymaster_info(State(ctx): Ctx) -> ApiResult<Json<Value>> {
    let state = ctx.paymaster()?.info().await?;
    let bps: u64 = state.fee_basis_points.saturating_to();

    Ok(Json(json!({
        "address": state.address,
        "relayer": state.relayer,
        "owner": state.owner,
        "feeBasisPoints": bps,
        "feePercent": crate::fees::policy::format_basis_points(
            u32::try_from(bps).unwrap_or(u32::MAX)
        ),
        "poolBalanceWei": state.pool_balance.to_string(),
        "poolBalanceBNB": format_ether(state.pool_balance),
    })))
}

pub async fn paymaster_fee(
    State(ctx): Ctx,
    Path(raw): Path<String>,
) -> ApiResult<Json<Value>> {
    let gateway = ctx.paymaster()?;
    let amount = parse_amount(&raw)?;
    let fee = gateway.calculate_fee(amount).await?;
    Ok(Json(json!({
        "amountWei": amount.to_string(),
        "feeWei": fee.to_string(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct FundBody {
    amount: Option<AmountInput>,
}

pub async fn fund_paymaster(
    State(ctx): Ctx,
    payload: Result<Json<FundBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let gateway = ctx.paymaster()?;
    let Json(body) = payload?;
    let amount = required(body.amount, "amount (in wei) is required")?.parse()?;
    if amount.is_zero() {
        return Err(ApiError::BadRequest("amount must be positive".to_string()));
    }

    info!(amount = %amount, "Funding paymaster pool");
    let tx_hash = gateway.fund(amount).await?;
    Ok(Json(json!({
        "status": "funded",
        "txHash": tx_hash,
        "explorerUrl": ctx.explorer_url(&tx_hash.to_string()),
    })))
}

pub async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
