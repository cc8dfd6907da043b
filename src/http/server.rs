//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with every API route
//! - Wire up middleware (request ids, tracing, timeouts, body limits, metrics)
//! - Serve plain HTTP or TLS with graceful shutdown

use axum::{
    extract::{DefaultBodyLimit, MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::context::RelayerContext;
use crate::http::auth::require_operator_token;
use crate::http::handlers;
use crate::http::tls::load_tls_config;
use crate::observability::metrics;

/// HTTP server for the relayer API.
pub struct HttpServer {
    router: Router,
    ctx: Arc<RelayerContext>,
}

impl HttpServer {
    pub fn new(ctx: Arc<RelayerContext>) -> Self {
        let router = Self::build_router(ctx.clone());
        Self { router, ctx }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(ctx: Arc<RelayerContext>) -> Router {
        let listener = &ctx.config.listener;
        let request_timeout = Duration::from_secs(listener.request_timeout_secs);
        let body_limit = listener.max_body_size;

        Router::new()
            .route("/api/health", get(handlers::health))
            .route("/api/fees", get(handlers::fees))
            .route("/api/wallet/create", post(handlers::create_wallet))
            .route("/api/wallet/{wallet_id}/address", get(handlers::wallet_address))
            .route(
                "/api/shield/signature-message",
                get(handlers::shield_signature_message),
            )
            .route("/api/shield", post(handlers::shield))
            .route("/api/unshield", post(handlers::unshield))
            .route("/api/unshield/{id}", get(handlers::unshield_status))
            .route("/api/status/{tx_hash}", get(handlers::transaction_status))
            .route(
                "/api/status/balance/{wallet_id}",
                get(handlers::private_balance),
            )
            .route("/api/paymaster", get(handlers::paymaster_info))
            .route("/api/paymaster/fee/{amount}", get(handlers::paymaster_fee))
            .route(
                "/api/paymaster/fund",
                post(handlers::fund_paymaster).route_layer(middleware::from_fn_with_state(
                    ctx.clone(),
                    require_operator_token,
                )),
            )
            .route_layer(middleware::from_fn(track_requests))
            .fallback(handlers::not_found)
            .with_state(ctx)
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(request_timeout)),
            )
    }

    /// The router, for serving it elsewhere.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;

        if let Some(tls) = self.ctx.config.listener.tls.clone() {
            let std_listener = listener.into_std()?;
            let rustls = load_tls_config(&tls).await?;
            let handle = axum_server::Handle::new();

            let drain = handle.clone();
            tokio::spawn(async move {
                shutdown.await;
                drain.graceful_shutdown(Some(Duration::from_secs(30)));
            });

            tracing::info!(address = %addr, "HTTPS server starting");
            axum_server::from_tcp_rustls(std_listener, rustls)
                .handle(handle)
                .serve(self.router.into_make_service_with_connect_info::<SocketAddr>())
                .await?;
        } else {
            tracing::info!(address = %addr, "HTTP server starting");
            axum::serve(
                listener,
                self.router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(shutdown)
            .await?;
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Count requests per matched route and status.
async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(route, response.status().as_u16());
    response
}
