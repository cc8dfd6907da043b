//! Resilience helpers.
//!
//! # Design Decisions
//! - Every RPC call and every confirmation wait has a deadline
//!   (see `blockchain::client` and `blockchain::transaction`)
//! - Receipt polling uses jittered exponential backoff
//! - Submissions are never retried automatically; a rejected or unconfirmed
//!   transaction is reported to the caller

pub mod backoff;
