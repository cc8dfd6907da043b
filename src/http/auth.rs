//! Operator token check for pool funding.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use crate::context::RelayerContext;
use crate::http::error::ApiError;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Requires `Authorization: Bearer <token>` when an operator token is configured.
pub async fn require_operator_token(
    State(ctx): State<Arc<RelayerContext>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = ctx.config.admin.api_key.as_deref() {
        if bearer_token(request.headers()) != Some(expected) {
            warn!(path = %request.uri().path(), "Rejected operator request");
            return ApiError::Unauthorized.into_response();
        }
    }
    next.run(request).await
}
