//! Fee policy.
//!
//! Pure arithmetic for relayer fees, gas-price floors and reimbursements,
//! plus the fee schedule the API publishes.

pub mod policy;
pub mod schedule;

pub use policy::{
    effective_gas_price, reimbursement_amount, relayer_fee, GasPolicy, BASIS_POINTS_DENOMINATOR,
};
pub use schedule::FeeSchedule;
