//! Unit price synchronization across the pallets of one reception
//!
//! Prices are keyed by `(product, lot)`, never by pallet. The registry is the
//! single source of truth while a reception is assembled; boxes do not carry
//! their own price. Prices are attached once, at submission, by
//! [`PriceRegistry::resolve`].

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::ids::ProductId;
use crate::models::{Pallet, PalletBox};
use crate::types::IdRef;

/// `(product, lot)` synchronization token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct PriceKey {
    pub product_id: ProductId,
    pub lot: String,
}

impl PriceKey {
    pub fn new(product_id: ProductId, lot: impl Into<String>) -> Self {
        Self {
            product_id,
            lot: lot.into(),
        }
    }

    /// Key of a box; boxes without product have none
    pub fn of_box(pallet_box: &PalletBox) -> Option<Self> {
        pallet_box
            .product_id()
            .map(|product_id| Self::new(product_id, pallet_box.lot.clone()))
    }
}

impl std::fmt::Display for PriceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product {} lot '{}'", self.product_id, self.lot)
    }
}

/// Price line of a manual-mode submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub product: IdRef<ProductId>,
    pub lot: String,
    pub price: Decimal,
}

/// Price per key, shared by every pallet of a reception draft
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceRegistry {
    prices: BTreeMap<PriceKey, Decimal>,
}

fn ensure_price(key: &PriceKey, price: Decimal) -> CoreResult<()> {
    if price < Decimal::ZERO {
        return Err(CoreError::InvalidPrice {
            key: key.clone(),
            price,
        });
    }
    Ok(())
}

impl PriceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PriceKey) -> Option<Decimal> {
        self.prices.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn clear(&mut self) {
        self.prices.clear();
    }

    /// Set the price for `key`; the last write wins.
    ///
    /// Returns the price it replaced, if any.
    pub fn update_price(&mut self, key: PriceKey, price: Decimal) -> CoreResult<Option<Decimal>> {
        ensure_price(&key, price)?;
        Ok(self.prices.insert(key, price))
    }

    /// Set the price only if the current one is still `expected`
    pub fn compare_and_set(
        &mut self,
        key: PriceKey,
        expected: Option<Decimal>,
        price: Decimal,
    ) -> CoreResult<Option<Decimal>> {
        ensure_price(&key, price)?;
        let actual = self.get(&key);
        if actual != expected {
            return Err(CoreError::PriceConflict {
                key,
                expected,
                actual,
            });
        }
        Ok(self.prices.insert(key, price))
    }

    /// Price applying to a box, looked up by its key
    pub fn price_for(&self, pallet_box: &PalletBox) -> Option<Decimal> {
        PriceKey::of_box(pallet_box).and_then(|key| self.get(&key))
    }

    /// All keys present on the given pallets
    pub fn keys_in(pallets: &[Pallet]) -> BTreeSet<PriceKey> {
        pallets
            .iter()
            .flat_map(|p| p.boxes())
            .filter_map(PriceKey::of_box)
            .collect()
    }

    /// Flatten the registry for submission.
    ///
    /// One entry per key present on `pallets` that has a price. Prices for
    /// keys no pallet holds any more are left out.
    pub fn resolve(&self, pallets: &[Pallet]) -> Vec<PriceEntry> {
        Self::keys_in(pallets)
            .into_iter()
            .filter_map(|key| {
                self.get(&key).map(|price| PriceEntry {
                    product: IdRef::new(key.product_id),
                    lot: key.lot,
                    price,
                })
            })
            .collect()
    }

    /// Σ box net weight × price of its key
    pub fn total_amount(&self, pallets: &[Pallet]) -> Decimal {
        pallets
            .iter()
            .flat_map(|p| p.boxes())
            .map(|b| b.net_weight * self.price_for(b).unwrap_or(Decimal::ZERO))
            .sum()
    }

    /// Entries in key order, for display
    pub fn entries(&self) -> Vec<PriceEntry> {
        self.prices
            .iter()
            .map(|(key, price)| PriceEntry {
                product: IdRef::new(key.product_id),
                lot: key.lot.clone(),
                price: *price,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn boxed(product: i64, lot: &str, net: &str) -> PalletBox {
        PalletBox::new(
            Some(Product::new(ProductId::new(product), format!("P{}", product))),
            lot,
            dec(net),
        )
    }

    #[test]
    fn test_price_follows_key_across_pallets() {
        let pallets = vec![
            Pallet::with_boxes(vec![boxed(1, "A", "10"), boxed(2, "A", "4")]),
            Pallet::with_boxes(vec![boxed(1, "A", "6")]),
        ];
        let mut registry = PriceRegistry::new();
        registry.update_price(PriceKey::new(ProductId::new(1), "A"), dec("2.5")).unwrap();

        for pallet in &pallets {
            for b in pallet.boxes().iter().filter(|b| b.product_id() == Some(ProductId::new(1))) {
                assert_eq!(registry.price_for(b), Some(dec("2.5")));
            }
        }
        assert_eq!(registry.total_amount(&pallets), dec("40"));
    }

    #[test]
    fn test_last_write_wins() {
        let key = PriceKey::new(ProductId::new(1), "A");
        let mut registry = PriceRegistry::new();

        assert_eq!(registry.update_price(key.clone(), dec("2")).unwrap(), None);
        assert_eq!(registry.update_price(key.clone(), dec("3")).unwrap(), Some(dec("2")));
        assert_eq!(registry.get(&key), Some(dec("3")));
    }

    #[test]
    fn test_compare_and_set_rejects_stale_writes() {
        let key = PriceKey::new(ProductId::new(1), "A");
        let mut registry = PriceRegistry::new();
        registry.update_price(key.clone(), dec("2")).unwrap();

        let result = registry.compare_and_set(key.clone(), None, dec("4"));
        assert!(matches!(result, Err(CoreError::PriceConflict { .. })));
        assert_eq!(registry.get(&key), Some(dec("2")));

        registry.compare_and_set(key.clone(), Some(dec("2")), dec("4")).unwrap();
        assert_eq!(registry.get(&key), Some(dec("4")));
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let mut registry = PriceRegistry::new();
        let result = registry.update_price(PriceKey::new(ProductId::new(1), "A"), dec("-1"));
        assert!(matches!(result, Err(CoreError::InvalidPrice { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_emits_one_entry_per_present_priced_key() {
        let pallets = vec![
            Pallet::with_boxes(vec![boxed(1, "A", "1"), boxed(1, "A", "1"), boxed(2, "B", "1")]),
            Pallet::with_boxes(vec![boxed(1, "A", "1"), boxed(3, "C", "1")]),
        ];
        let mut registry = PriceRegistry::new();
        registry.update_price(PriceKey::new(ProductId::new(1), "A"), dec("2")).unwrap();
        registry.update_price(PriceKey::new(ProductId::new(3), "C"), dec("5")).unwrap();
        // no pallet holds this key any more
        registry.update_price(PriceKey::new(ProductId::new(9), "Z"), dec("1")).unwrap();

        let entries = registry.resolve(&pallets);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].product.id, ProductId::new(1));
        assert_eq!(entries[0].price, dec("2"));
        assert_eq!(entries[1].lot, "C");
    }
}
