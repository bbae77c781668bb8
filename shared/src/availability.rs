//! Available quantity of pallets
//!
//! A box is available unless it has been explicitly flagged unavailable
//! (consumed by production, dispatched, or committed to a closed order).
//! When only aggregate data is at hand, the whole pallet is assumed available
//! and the result is marked approximate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Pallet, PalletSummary};

/// Whether an availability figure was computed box by box
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    Exact,
    /// Derived from pallet totals; committed boxes are not subtracted
    Approximate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    pub box_count: usize,
    pub net_weight: Decimal,
    pub precision: Precision,
}

impl AvailabilityReport {
    pub fn is_exact(&self) -> bool {
        self.precision == Precision::Exact
    }
}

/// Anything whose available quantity can be computed
pub trait Availability {
    fn availability(&self) -> AvailabilityReport;

    fn available_box_count(&self) -> usize {
        self.availability().box_count
    }

    fn available_net_weight(&self) -> Decimal {
        self.availability().net_weight
    }
}

impl Availability for Pallet {
    fn availability(&self) -> AvailabilityReport {
        let (box_count, net_weight) = self
            .boxes()
            .iter()
            .filter(|b| b.counts_as_available())
            .fold((0, Decimal::ZERO), |(count, weight), b| {
                (count + 1, weight + b.net_weight)
            });
        AvailabilityReport {
            box_count,
            net_weight,
            precision: Precision::Exact,
        }
    }
}

impl Availability for PalletSummary {
    fn availability(&self) -> AvailabilityReport {
        AvailabilityReport {
            box_count: self.number_of_boxes,
            net_weight: self.net_weight,
            precision: Precision::Approximate,
        }
    }
}

/// Committed (unavailable) part of a pallet: `total - available`
pub fn committed_net_weight(pallet: &Pallet) -> Decimal {
    pallet.net_weight() - pallet.available_net_weight()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{PalletId, ProductId};
    use crate::models::{PalletBox, Product};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn boxed(net: &str, available: Option<bool>) -> PalletBox {
        let mut b = PalletBox::new(Some(Product::new(ProductId::new(1), "Hake")), "L1", dec(net));
        b.is_available = available;
        b
    }

    #[test]
    fn test_scenario_c_one_box_committed() {
        let pallet = Pallet::with_boxes(vec![
            boxed("5.0", Some(false)),
            boxed("3.2", Some(true)),
            boxed("1.8", None),
        ]);

        assert_eq!(pallet.available_box_count(), 2);
        assert_eq!(pallet.available_net_weight(), dec("5.0"));
        assert_eq!(committed_net_weight(&pallet), dec("5.0"));
        assert!(pallet.availability().is_exact());
    }

    #[test]
    fn test_missing_flags_count_as_available() {
        let pallet = Pallet::with_boxes(vec![boxed("2", None), boxed("3", None)]);
        assert_eq!(pallet.available_net_weight(), pallet.net_weight());
        assert_eq!(pallet.available_box_count(), pallet.number_of_boxes());
    }

    #[test]
    fn test_summary_falls_back_to_totals() {
        let summary = PalletSummary {
            id: PalletId::new(1),
            state: Default::default(),
            net_weight: dec("120.5"),
            number_of_boxes: 12,
            products_names: vec!["Hake".to_string()],
            product_ids: vec![],
            lots: vec![],
            reception_id: None,
            order_id: None,
            location: None,
        };

        let report = summary.availability();

        assert_eq!(report.box_count, 12);
        assert_eq!(report.net_weight, dec("120.5"));
        assert_eq!(report.precision, Precision::Approximate);
    }
}
