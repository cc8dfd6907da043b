//! API error type. Every failure answers with `{"error": "..."}`.

use alloy::primitives::TxHash;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::engine::EngineError;
use crate::paymaster::PaymasterError;
use crate::shield::ShieldError;
use crate::withdrawal::WithdrawalError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("operator token required")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// Broadcast but unconfirmed; the caller polls the status endpoint.
    #[error("{message}")]
    Submitted { tx_hash: TxHash, message: String },

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    BadGateway(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "operator token required" }),
            ),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
            ApiError::Submitted { tx_hash, message } => (
                StatusCode::ACCEPTED,
                json!({ "status": "submitted", "txHash": tx_hash, "error": message }),
            ),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": m })),
            ApiError::BadGateway(m) => (StatusCode::BAD_GATEWAY, json!({ "error": m })),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<WithdrawalError> for ApiError {
    fn from(e: WithdrawalError) -> Self {
        match e {
            WithdrawalError::Validation(m) => ApiError::BadRequest(m),
            WithdrawalError::ConfirmationTimeout { tx_hash, .. } => ApiError::Submitted {
                tx_hash,
                message: e.to_string(),
            },
            WithdrawalError::Submission(_) | WithdrawalError::Chain(_) => {
                ApiError::BadGateway(e.to_string())
            }
            WithdrawalError::Estimation(_)
            | WithdrawalError::Proof(_)
            | WithdrawalError::Population(_)
            | WithdrawalError::Reverted { .. }
            | WithdrawalError::Interrupted(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ShieldError> for ApiError {
    fn from(e: ShieldError) -> Self {
        match e {
            ShieldError::Validation(m) => ApiError::BadRequest(m),
            ShieldError::Engine(e) => ApiError::from(e),
        }
    }
}

impl From<PaymasterError> for ApiError {
    fn from(e: PaymasterError) -> Self {
        match e {
            PaymasterError::NotConfigured => ApiError::NotFound(e.to_string()),
            PaymasterError::Read(_) => ApiError::BadGateway(e.to_string()),
            PaymasterError::Claim(_) | PaymasterError::Funding(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Transport(_) => ApiError::BadGateway(e.to_string()),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<BlockchainError> for ApiError {
    fn from(e: BlockchainError) -> Self {
        ApiError::BadGateway(e.to_string())
    }
}
