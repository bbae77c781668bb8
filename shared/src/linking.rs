//! Pallet-to-order association rules

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::ids::{OrderId, PalletId, ProductId};
use crate::models::{Pallet, PalletState, PalletSummary};

/// Narrowing of the candidate pool shown for an order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PalletFilter {
    /// Matched against pallet id, product names and lots
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub lot: Option<String>,
    #[serde(default)]
    pub stored_only: bool,
}

impl PalletFilter {
    pub fn matches(&self, pallet: &PalletSummary) -> bool {
        if self.stored_only && pallet.state != PalletState::Stored {
            return false;
        }
        if let Some(product_id) = self.product_id {
            if !pallet.product_ids.contains(&product_id) {
                return false;
            }
        }
        if let Some(lot) = self.lot.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            if !pallet.lots.iter().any(|l| l == lot) {
                return false;
            }
        }
        match self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(text) => {
                let needle = text.to_lowercase();
                pallet.id.to_string() == text
                    || pallet
                        .products_names
                        .iter()
                        .chain(pallet.lots.iter())
                        .any(|s| s.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

/// Unlinked pallets and pallets already on `order` may be linked to it
pub fn is_linkable_to(order_id: Option<OrderId>, order: OrderId) -> bool {
    order_id.map_or(true, |current| current == order)
}

/// Candidate pool for an order.
///
/// Pallets already on `order` always stay in it. Unlinked pallets qualify
/// only while they are not shipped or processed.
pub fn available_pallets_for_order(
    pallets: &[PalletSummary],
    order: OrderId,
    filter: &PalletFilter,
) -> Vec<PalletSummary> {
    pallets
        .iter()
        .filter(|p| match p.order_id {
            Some(current) => current == order,
            None => p.state.allows_box_changes(),
        })
        .filter(|p| filter.matches(p))
        .cloned()
        .collect()
}

/// Whether a link call actually changes anything
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkChange {
    Linked,
    AlreadyOnOrder,
}

/// Link a pallet to an order; a pallet on another order must be unlinked first
pub fn link(pallet: &mut Pallet, order: OrderId) -> CoreResult<LinkChange> {
    match pallet.order_id {
        Some(current) if current == order => Ok(LinkChange::AlreadyOnOrder),
        Some(current) => Err(CoreError::AlreadyLinked {
            pallet: pallet
                .id
                .ok_or_else(|| CoreError::NotFound("Pallet id".to_string()))?,
            order: current,
        }),
        None => {
            pallet.order_id = Some(order);
            Ok(LinkChange::Linked)
        }
    }
}

/// Detach a pallet from its order, returning the order it was on
pub fn unlink(pallet: &mut Pallet) -> Option<OrderId> {
    pallet.order_id.take()
}

/// One failed item of a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure<Id> {
    pub id: Id,
    pub message: String,
}

/// Per-item result of a multi-status batch; successes are never rolled back
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome<Id> {
    pub succeeded: Vec<Id>,
    pub failed: Vec<BatchFailure<Id>>,
}

impl<Id> Default for BatchOutcome<Id> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<Id> BatchOutcome<Id> {
    pub fn record_success(&mut self, id: Id) {
        self.succeeded.push(id);
    }

    pub fn record_failure(&mut self, id: Id, message: impl Into<String>) {
        self.failed.push(BatchFailure {
            id,
            message: message.into(),
        });
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Some items went through and some did not
    pub fn is_partial(&self) -> bool {
        !self.succeeded.is_empty() && !self.failed.is_empty()
    }
}

/// Outcome of a batch over pallets
pub type PalletBatchOutcome = BatchOutcome<PalletId>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn summary(id: i64, order: Option<i64>) -> PalletSummary {
        PalletSummary {
            id: PalletId::new(id),
            state: PalletState::Stored,
            net_weight: Decimal::from(100),
            number_of_boxes: 10,
            products_names: vec!["Hake fillet".to_string()],
            product_ids: vec![ProductId::new(1)],
            lots: vec!["L-7".to_string()],
            reception_id: None,
            order_id: order.map(OrderId::new),
            location: None,
        }
    }

    fn ids(pool: &[PalletSummary]) -> Vec<i64> {
        pool.iter().map(|p| p.id.as_i64()).collect()
    }

    #[test]
    fn test_scenario_d_pool_follows_links() {
        let o1 = OrderId::new(1);
        let o2 = OrderId::new(2);
        let mut p = summary(5, Some(1));
        let filter = PalletFilter::default();

        assert!(available_pallets_for_order(std::slice::from_ref(&p), o2, &filter).is_empty());
        assert_eq!(ids(&available_pallets_for_order(std::slice::from_ref(&p), o1, &filter)), vec![5]);

        p.order_id = None;
        assert_eq!(ids(&available_pallets_for_order(&[p], o2, &filter)), vec![5]);
    }

    #[test]
    fn test_shipped_unlinked_pallets_are_not_candidates() {
        let mut p = summary(1, None);
        p.state = PalletState::Shipped;
        assert!(available_pallets_for_order(&[p], OrderId::new(1), &PalletFilter::default()).is_empty());
    }

    #[test]
    fn test_shipped_pallet_stays_in_its_own_order_pool() {
        let order = OrderId::new(7);
        let mut p = summary(1, Some(7));
        p.state = PalletState::Shipped;

        let own = available_pallets_for_order(std::slice::from_ref(&p), order, &PalletFilter::default());
        assert_eq!(ids(&own), vec![1]);
        assert!(available_pallets_for_order(&[p], OrderId::new(8), &PalletFilter::default()).is_empty());
    }

    #[test]
    fn test_filter_by_text_product_and_lot() {
        let pool = vec![summary(1, None), {
            let mut other = summary(2, None);
            other.products_names = vec!["Octopus".to_string()];
            other.product_ids = vec![ProductId::new(2)];
            other.lots = vec!["L-9".to_string()];
            other
        }];
        let order = OrderId::new(3);

        let by_text = PalletFilter {
            text: Some("octo".to_string()),
            ..PalletFilter::default()
        };
        assert_eq!(ids(&available_pallets_for_order(&pool, order, &by_text)), vec![2]);

        let by_id = PalletFilter {
            text: Some("1".to_string()),
            ..PalletFilter::default()
        };
        assert_eq!(ids(&available_pallets_for_order(&pool, order, &by_id)), vec![1]);

        let by_product = PalletFilter {
            product_id: Some(ProductId::new(1)),
            ..PalletFilter::default()
        };
        assert_eq!(ids(&available_pallets_for_order(&pool, order, &by_product)), vec![1]);

        let by_lot = PalletFilter {
            lot: Some("L-9".to_string()),
            ..PalletFilter::default()
        };
        assert_eq!(ids(&available_pallets_for_order(&pool, order, &by_lot)), vec![2]);
    }

    #[test]
    fn test_stored_only_filter() {
        let mut registered = summary(1, None);
        registered.state = PalletState::Registered;
        let filter = PalletFilter {
            stored_only: true,
            ..PalletFilter::default()
        };
        assert!(available_pallets_for_order(&[registered], OrderId::new(1), &filter).is_empty());
    }

    #[test]
    fn test_link_rules() {
        let mut pallet = Pallet::new();
        pallet.id = Some(PalletId::new(8));
        pallet.reception_id = Some(crate::ids::ReceptionId::new(1));

        assert_eq!(link(&mut pallet, OrderId::new(1)).unwrap(), LinkChange::Linked);
        assert_eq!(link(&mut pallet, OrderId::new(1)).unwrap(), LinkChange::AlreadyOnOrder);
        assert_eq!(
            link(&mut pallet, OrderId::new(2)),
            Err(CoreError::AlreadyLinked {
                pallet: PalletId::new(8),
                order: OrderId::new(1)
            })
        );

        assert_eq!(unlink(&mut pallet), Some(OrderId::new(1)));
        assert_eq!(unlink(&mut pallet), None);
        assert_eq!(link(&mut pallet, OrderId::new(2)).unwrap(), LinkChange::Linked);
    }

    #[test]
    fn test_batch_outcome_flags() {
        let mut outcome = PalletBatchOutcome::default();
        outcome.record_success(PalletId::new(1));
        assert!(outcome.is_complete_success());
        assert!(!outcome.is_partial());

        outcome.record_failure(PalletId::new(2), "Pallet is shipped");
        assert!(!outcome.is_complete_success());
        assert!(outcome.is_partial());
        assert_eq!(outcome.failed[0].message, "Pallet is shipped");
    }
}
