//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup: request id, trace, timeout, body limit, metrics)
//!     → auth.rs (operator token, funding route only)
//!     → handlers.rs (parse + validate, call into RelayerContext)
//!     → error.rs (every failure as {"error": "..."} with a 4xx/5xx status)
//! ```

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod tls;

pub use error::{ApiError, ApiResult};
pub use server::HttpServer;
