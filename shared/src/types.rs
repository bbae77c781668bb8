//! Common types used across the platform

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places kept on stored weights
pub const WEIGHT_DECIMALS: u32 = 3;

/// Decimal places shown on monetary amounts
pub const MONEY_DECIMALS: u32 = 2;

/// Reference to another entity by id, serialized as `{ "id": ... }`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct IdRef<T> {
    pub id: T,
}

impl<T> IdRef<T> {
    pub fn new(id: T) -> Self {
        Self { id }
    }
}

/// Round a weight to the stored precision (kg, 3 decimals)
pub fn round_weight(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(WEIGHT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a monetary amount for presentation only.
///
/// Internal totals keep full precision; call this at the display boundary.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Weight and amount roll-up shared by line totals and reception previews
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_kg: Decimal,
    pub total_amount: Decimal,
}

impl Totals {
    /// Same totals rounded for display (3 dp weight, 2 dp money)
    pub fn for_display(&self) -> Self {
        Self {
            total_kg: round_weight(self.total_kg),
            total_amount: round_money(self.total_amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec("10.005")), dec("10.01"));
        assert_eq!(round_money(dec("10.004")), dec("10.00"));
    }

    #[test]
    fn test_round_weight() {
        assert_eq!(round_weight(dec("1.2345")), dec("1.235"));
        assert_eq!(round_weight(dec("7")), dec("7"));
    }

    #[test]
    fn test_id_ref_shape() {
        let json = serde_json::to_value(IdRef::new(crate::ProductId::new(3))).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 3 }));
    }
}
