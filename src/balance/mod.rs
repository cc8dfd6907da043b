//! Balance reader: shielded balances for display.
//!
//! Scan first (best-effort), then read. Never fails: a dead engine reads as
//! a zero balance.

pub mod reader;

pub use reader::{format_units, BalanceReader, PrivateBalance, ScanOutcome};
