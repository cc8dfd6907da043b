//! Published fee schedule.

use serde::Serialize;

use crate::config::FeeConfig;
use crate::fees::policy::format_basis_points;

/// Fees a user pays end to end, as shown by `GET /api/fees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSchedule {
    pub relayer_fee_basis_points: u32,
    pub relayer_fee_percent: String,
    pub shield_fee_percent: String,
    pub unshield_fee_percent: String,
    pub total_approx_percent: String,
    pub token: String,
}

impl FeeSchedule {
    pub fn from_config(fees: &FeeConfig) -> Self {
        let total = fees
            .relayer_fee_basis_points
            .saturating_add(fees.shield_fee_basis_points)
            .saturating_add(fees.unshield_fee_basis_points);

        Self {
            relayer_fee_basis_points: fees.relayer_fee_basis_points,
            relayer_fee_percent: format_basis_points(fees.relayer_fee_basis_points),
            shield_fee_percent: format_basis_points(fees.shield_fee_basis_points),
            unshield_fee_percent: format_basis_points(fees.unshield_fee_basis_points),
            total_approx_percent: format_basis_points(total),
            token: fees.token_symbol.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let schedule = FeeSchedule::from_config(&FeeConfig::default());
        assert_eq!(schedule.relayer_fee_percent, "0.3%");
        assert_eq!(schedule.shield_fee_percent, "0.25%");
        assert_eq!(schedule.total_approx_percent, "0.8%");

        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["relayerFeeBasisPoints"], 30);
        assert_eq!(json["token"], "BNB");
    }
}
