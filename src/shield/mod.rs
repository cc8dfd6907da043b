//! Shield composer: builds base-token deposit transactions.
//!
//! Stateless. The depositor signs [`SHIELD_SIGNATURE_MESSAGE`] with their
//! public-chain key; the signature's keccak hash becomes the one-time
//! shielding secret, so retrying with the same signature yields the same
//! secret. The returned descriptor is signed and sent by the depositor's own
//! wallet, never by the relayer.

pub mod composer;

pub use composer::{derive_shield_private_key, ShieldComposer, ShieldError, SHIELD_SIGNATURE_MESSAGE};
