//! Observability: structured logging and Prometheus metrics.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (tracing events, filtered per crate)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (log aggregation)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! Secrets never reach either sink: private keys and mnemonics are not
//! logged, wallet ids are truncated.

pub mod logging;
pub mod metrics;
