//! Reception (raw-material intake) models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Pallet, Product};
use crate::error::CoreResult;
use crate::ids::{ProductId, ReceptionId, SupplierId};
use crate::pricing::PriceEntry;
use crate::types::IdRef;
use crate::weight::{self, TareCode};

/// Reception header, common to both intake modes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionHeader {
    pub supplier: Option<SupplierId>,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

/// One itemized line of an automatic-mode reception.
///
/// Exists only while the reception is being entered; it becomes a detail of
/// the submission payload and is not persisted as such.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionDetail {
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub gross_weight: Option<Decimal>,
    #[serde(default)]
    pub boxes: Option<u32>,
    #[serde(default)]
    pub tare: TareCode,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub lot: String,
}

impl Default for ReceptionDetail {
    fn default() -> Self {
        Self::empty(TareCode::default())
    }
}

impl ReceptionDetail {
    /// A blank line using `tare` until the operator picks another
    pub fn empty(tare: TareCode) -> Self {
        Self {
            product: None,
            gross_weight: None,
            boxes: None,
            tare,
            price: None,
            lot: String::new(),
        }
    }

    /// Any of product, weight, price or lot has been entered
    pub fn has_data(&self) -> bool {
        self.product.is_some()
            || self.gross_weight.is_some()
            || self.price.is_some()
            || !self.lot.trim().is_empty()
    }

    /// Derived net weight; `None` while no gross weight is entered
    pub fn net_weight(&self) -> CoreResult<Option<Decimal>> {
        match self.gross_weight {
            Some(gross) => {
                weight::net_weight(gross, self.boxes.unwrap_or(0), self.tare).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Line amount, zero when unpriced or incomplete
    pub fn amount(&self) -> CoreResult<Decimal> {
        let net = self.net_weight()?.unwrap_or(Decimal::ZERO);
        Ok(net * self.price.unwrap_or(Decimal::ZERO))
    }
}

/// Line of an automatic-mode submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedDetail {
    pub product: IdRef<ProductId>,
    pub net_weight: Decimal,
    pub boxes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot: Option<String>,
}

/// Box of a manual-mode submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedBox {
    pub product: IdRef<ProductId>,
    pub lot: String,
    pub net_weight: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_weight: Option<Decimal>,
}

/// Pallet of a manual-mode submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedPallet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    pub boxes: Vec<SubmittedBox>,
}

/// Line-based reception payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutomaticSubmission {
    pub supplier: IdRef<SupplierId>,
    pub date: NaiveDate,
    pub notes: String,
    pub details: Vec<SubmittedDetail>,
}

/// Pallet-based reception payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManualSubmission {
    pub supplier: IdRef<SupplierId>,
    pub date: NaiveDate,
    pub notes: String,
    pub prices: Vec<PriceEntry>,
    pub pallets: Vec<SubmittedPallet>,
}

/// Reception payload: carries either `details` or `pallets`, never both
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ReceptionSubmission {
    Automatic(AutomaticSubmission),
    Manual(ManualSubmission),
}

impl ReceptionSubmission {
    pub fn supplier(&self) -> SupplierId {
        match self {
            ReceptionSubmission::Automatic(s) => s.supplier.id,
            ReceptionSubmission::Manual(s) => s.supplier.id,
        }
    }

    /// Total net weight carried by the payload
    pub fn total_net_weight(&self) -> Decimal {
        match self {
            ReceptionSubmission::Automatic(s) => s.details.iter().map(|d| d.net_weight).sum(),
            ReceptionSubmission::Manual(s) => s
                .pallets
                .iter()
                .flat_map(|p| p.boxes.iter())
                .map(|b| b.net_weight)
                .sum(),
        }
    }

    /// Number of lines or pallets carried by the payload
    pub fn entry_count(&self) -> usize {
        match self {
            ReceptionSubmission::Automatic(s) => s.details.len(),
            ReceptionSubmission::Manual(s) => s.pallets.len(),
        }
    }
}

/// A reception as returned by the persistence API once created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reception {
    pub id: ReceptionId,
    #[serde(default)]
    pub supplier: Option<IdRef<SupplierId>>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub pallets: Vec<Pallet>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_empty_line_has_no_data() {
        let line = ReceptionDetail::default();
        assert!(!line.has_data());
        assert_eq!(line.net_weight().unwrap(), None);
    }

    #[test]
    fn test_tare_alone_is_not_data() {
        let line = ReceptionDetail::empty(TareCode::Five);
        assert!(!line.has_data());
    }

    #[test]
    fn test_line_net_weight_and_amount() {
        let line = ReceptionDetail {
            gross_weight: Some(dec("27.50")),
            boxes: Some(2),
            tare: TareCode::Three,
            price: Some(dec("2")),
            ..ReceptionDetail::default()
        };

        assert_eq!(line.net_weight().unwrap(), Some(dec("21.50")));
        assert_eq!(line.amount().unwrap(), dec("43.00"));
    }

    #[test]
    fn test_automatic_payload_has_details_only() {
        let submission = ReceptionSubmission::Automatic(AutomaticSubmission {
            supplier: IdRef::new(SupplierId::new(7)),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            notes: String::new(),
            details: vec![SubmittedDetail {
                product: IdRef::new(ProductId::new(1)),
                net_weight: dec("10"),
                boxes: 2,
                price: None,
                lot: None,
            }],
        });

        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["supplier"]["id"], 7);
        assert!(json.get("details").is_some());
        assert!(json.get("pallets").is_none());
        assert!(json.get("prices").is_none());
    }
}
