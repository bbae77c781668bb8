//! Net weight resolution from gross weight, box count and tare
//!
//! All arithmetic is done on `Decimal`, so repeated evaluation with the same
//! inputs is bit-identical. Weights are held at 3 decimals: a finer gross
//! weight is rounded once on entry, the same way box weights are. Money is
//! rounded only at presentation (see [`crate::types::round_money`]).

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::ReceptionDetail;
use crate::types::{round_weight, Totals};

/// Tare code printed on the weighing slip; the code is the kg per empty box
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TareCode {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[default]
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
}

impl TareCode {
    pub const ALL: [TareCode; 5] = [
        TareCode::One,
        TareCode::Two,
        TareCode::Three,
        TareCode::Four,
        TareCode::Five,
    ];

    /// Weight of one empty box in kg
    pub fn kg_per_box(&self) -> Decimal {
        match self {
            TareCode::One => Decimal::ONE,
            TareCode::Two => Decimal::TWO,
            TareCode::Three => Decimal::from(3),
            TareCode::Four => Decimal::from(4),
            TareCode::Five => Decimal::from(5),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TareCode::One => "1",
            TareCode::Two => "2",
            TareCode::Three => "3",
            TareCode::Four => "4",
            TareCode::Five => "5",
        }
    }
}

impl FromStr for TareCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TareCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s.trim())
            .ok_or_else(|| CoreError::UnknownTareCode(s.to_string()))
    }
}

impl std::fmt::Display for TareCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `gross - box_count * tare`, rejecting negative inputs and results.
///
/// A negative result means the gross weight cannot hold that many boxes of
/// that tare; it is reported rather than floored at zero. The gross weight is
/// taken at stored precision (`round_weight`).
pub fn net_weight(gross: Decimal, box_count: u32, tare: TareCode) -> CoreResult<Decimal> {
    if gross.is_sign_negative() && !gross.is_zero() {
        return Err(CoreError::InvalidWeight(format!(
            "gross weight {} is negative",
            gross
        )));
    }
    let gross = round_weight(gross);
    let net = gross - Decimal::from(box_count) * tare.kg_per_box();
    if net < Decimal::ZERO {
        return Err(CoreError::InvalidWeight(format!(
            "gross {} kg minus {} boxes of {} kg tare is negative",
            gross, box_count, tare
        )));
    }
    Ok(net)
}

/// Same as [`net_weight`] with the tare given by its code
pub fn net_weight_for_code(gross: Decimal, box_count: u32, tare_code: &str) -> CoreResult<Decimal> {
    net_weight(gross, box_count, tare_code.parse()?)
}

/// Per-line net weights plus the reception roll-up
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineTotals {
    /// Same order as the input; `None` for lines without gross weight
    pub net_weights: Vec<Option<Decimal>>,
    #[serde(flatten)]
    pub totals: Totals,
}

/// Net weight of every line and `{ total_kg, total_amount }`.
///
/// `total_amount = Σ net × price`; unpriced lines add weight but no amount.
pub fn summarize_lines(lines: &[ReceptionDetail]) -> CoreResult<LineTotals> {
    let mut net_weights = Vec::with_capacity(lines.len());
    let mut totals = Totals::default();

    for line in lines {
        let net = line.net_weight()?;
        if let Some(net) = net {
            totals.total_kg += net;
            totals.total_amount += net * line.price.unwrap_or(Decimal::ZERO);
        }
        net_weights.push(net);
    }

    Ok(LineTotals {
        net_weights,
        totals,
    })
}

/// Split `total` into `count` box weights of 2 decimals.
///
/// The last box absorbs the remainder so the parts always sum to `total`.
pub fn split_evenly(total: Decimal, count: u32) -> CoreResult<Vec<Decimal>> {
    if count == 0 {
        return Err(CoreError::InvalidWeight(
            "box count must be at least 1".to_string(),
        ));
    }
    if total < Decimal::ZERO {
        return Err(CoreError::InvalidWeight(format!(
            "total weight {} is negative",
            total
        )));
    }

    let share = (total / Decimal::from(count)).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let mut parts = vec![share; count as usize - 1];
    parts.push(total - share * Decimal::from(count - 1));
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReceptionDetail;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(gross: &str, boxes: u32, tare: TareCode, price: Option<&str>) -> ReceptionDetail {
        ReceptionDetail {
            gross_weight: Some(dec(gross)),
            boxes: Some(boxes),
            tare,
            price: price.map(dec),
            ..ReceptionDetail::default()
        }
    }

    #[test]
    fn test_scenario_a_net_weight() {
        assert_eq!(net_weight_for_code(dec("27.50"), 2, "3").unwrap(), dec("21.50"));
    }

    #[test]
    fn test_tare_table() {
        for (i, code) in TareCode::ALL.iter().enumerate() {
            assert_eq!(code.kg_per_box(), Decimal::from(i as u32 + 1));
            assert_eq!(code.as_str().parse::<TareCode>().unwrap(), *code);
        }
    }

    #[test]
    fn test_unknown_tare_code() {
        assert_eq!(
            "7".parse::<TareCode>(),
            Err(CoreError::UnknownTareCode("7".to_string()))
        );
        assert!(net_weight_for_code(dec("10"), 1, "").is_err());
    }

    #[test]
    fn test_negative_net_weight_is_rejected() {
        let result = net_weight(dec("5"), 2, TareCode::Three);
        assert!(matches!(result, Err(CoreError::InvalidWeight(_))));
    }

    #[test]
    fn test_negative_gross_is_rejected() {
        assert!(net_weight(dec("-1"), 0, TareCode::One).is_err());
    }

    #[test]
    fn test_gross_finer_than_a_gram_is_rounded() {
        assert_eq!(net_weight(dec("1.0004"), 0, TareCode::One).unwrap(), dec("1.000"));
        assert_eq!(net_weight(dec("7.2345"), 2, TareCode::Two).unwrap(), dec("3.235"));
    }

    #[test]
    fn test_zero_net_weight_is_allowed() {
        assert_eq!(net_weight(dec("6"), 2, TareCode::Three).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_scenario_b_totals() {
        let lines = vec![
            line("10.00", 0, TareCode::Three, Some("2.50")),
            line("5.00", 0, TareCode::Three, Some("4.00")),
        ];

        let summary = summarize_lines(&lines).unwrap();

        assert_eq!(summary.totals.total_kg, dec("15.00"));
        assert_eq!(summary.totals.total_amount, dec("45.00"));
        assert_eq!(summary.net_weights, vec![Some(dec("10.00")), Some(dec("5.00"))]);
    }

    #[test]
    fn test_summary_skips_incomplete_lines() {
        let lines = vec![
            ReceptionDetail::default(),
            line("12", 1, TareCode::Two, None),
        ];

        let summary = summarize_lines(&lines).unwrap();

        assert_eq!(summary.net_weights, vec![None, Some(dec("10"))]);
        assert_eq!(summary.totals.total_kg, dec("10"));
        assert_eq!(summary.totals.total_amount, Decimal::ZERO);
    }

    #[test]
    fn test_summary_is_idempotent() {
        let lines = vec![
            line("13.37", 3, TareCode::One, Some("3.33")),
            line("8.10", 1, TareCode::Four, Some("1.10")),
        ];
        assert_eq!(summarize_lines(&lines).unwrap(), summarize_lines(&lines).unwrap());
    }

    #[test]
    fn test_split_evenly_keeps_total() {
        let parts = split_evenly(dec("10"), 3).unwrap();
        assert_eq!(parts, vec![dec("3.33"), dec("3.33"), dec("3.34")]);
        assert_eq!(parts.iter().sum::<Decimal>(), dec("10"));
    }

    #[test]
    fn test_split_evenly_rejects_zero_boxes() {
        assert!(split_evenly(dec("10"), 0).is_err());
    }

    #[test]
    fn test_tare_code_serializes_as_code() {
        assert_eq!(serde_json::to_string(&TareCode::Three).unwrap(), "\"3\"");
        let parsed: TareCode = serde_json::from_str("\"5\"").unwrap();
        assert_eq!(parsed, TareCode::Five);
    }
}
