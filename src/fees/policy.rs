//! Pure fee and gas-price arithmetic. No I/O, no hidden state.

use alloy::primitives::U256;

use crate::config::GasType;

/// Basis points in one whole.
pub const BASIS_POINTS_DENOMINATOR: u64 = 10_000;

/// Relayer fee: `floor(amount * basis_points / 10_000)`.
///
/// Computed as `q * bps + floor(r * bps / D)` with `amount = q * D + r`, which
/// is exact and cannot overflow for `basis_points <= 10_000`.
pub fn relayer_fee(amount: U256, basis_points: u32) -> U256 {
    let denominator = U256::from(BASIS_POINTS_DENOMINATOR);
    let bps = U256::from(basis_points);
    let (quotient, remainder) = amount.div_rem(denominator);
    quotient.saturating_mul(bps).saturating_add(remainder * bps / denominator)
}

/// Gas price actually used: never below the protocol minimum.
///
/// Guards against networks that report a base fee below what they accept.
pub fn effective_gas_price(reported: u128, protocol_minimum: u128) -> u128 {
    reported.max(protocol_minimum)
}

/// Wei owed to the relayer for a mined transaction.
pub fn reimbursement_amount(gas_used: u64, gas_price: u128) -> U256 {
    U256::from(gas_used) * U256::from(gas_price)
}

/// Gas parameters for one withdrawal. Derived per request, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPolicy {
    pub gas_type: GasType,
    pub gas_price: u128,
    pub gas_estimate: u64,
}

/// Render basis points as a percent string: 30 → "0.3%", 25 → "0.25%".
pub fn format_basis_points(basis_points: u32) -> String {
    let whole = basis_points / 100;
    let frac = basis_points % 100;
    if frac == 0 {
        format!("{whole}%")
    } else if frac % 10 == 0 {
        format!("{whole}.{}%", frac / 10)
    } else {
        format!("{whole}.{frac:02}%")
    }
}
