//! Pallet placement inside a store and per-store summaries

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::availability::Availability;
use crate::error::{CoreError, CoreResult};
use crate::ids::{PalletId, PositionId};
use crate::models::{Store, StoreLocation};

/// Put pallets at a position; several pallets may share one.
///
/// All ids are checked before anything moves, so a rejected call leaves the
/// store untouched.
pub fn assign_to_position(
    store: &mut Store,
    pallet_ids: &[PalletId],
    position_id: PositionId,
) -> CoreResult<()> {
    if !store.has_position(position_id) {
        return Err(CoreError::UnknownPosition {
            store: store.id,
            position: position_id,
        });
    }
    if let Some(missing) = pallet_ids.iter().find(|id| store.pallet(**id).is_none()) {
        return Err(CoreError::PalletNotInStore {
            store: store.id,
            pallet: *missing,
        });
    }

    let store_id = store.id;
    for id in pallet_ids {
        if let Some(pallet) = store.pallet_mut(*id) {
            pallet.location = Some(StoreLocation {
                store_id,
                position_id: Some(position_id),
            });
        }
    }
    Ok(())
}

/// Clear the position of a pallet; it stays in the store
pub fn unassign(store: &mut Store, pallet_id: PalletId) -> CoreResult<()> {
    let store_id = store.id;
    let pallet = store
        .pallet_mut(pallet_id)
        .ok_or(CoreError::PalletNotInStore {
            store: store_id,
            pallet: pallet_id,
        })?;
    pallet.location = Some(StoreLocation {
        store_id,
        position_id: None,
    });
    Ok(())
}

/// Share of a species in the available stock of a store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesShare {
    pub name: String,
    pub quantity: Decimal,
    pub percentage: Decimal,
}

/// Available net weight per species, largest first
pub fn species_summary(store: &Store) -> Vec<SpeciesShare> {
    let mut by_species: BTreeMap<String, Decimal> = BTreeMap::new();
    for pallet_box in store
        .pallets
        .iter()
        .flat_map(|p| p.boxes())
        .filter(|b| b.counts_as_available())
    {
        let name = pallet_box
            .product
            .as_ref()
            .map(|p| p.species_name())
            .unwrap_or(crate::models::UNCLASSIFIED_SPECIES);
        *by_species.entry(name.to_string()).or_default() += pallet_box.net_weight;
    }

    let total: Decimal = by_species.values().sum();
    if total.is_zero() {
        return Vec::new();
    }

    let mut shares: Vec<SpeciesShare> = by_species
        .into_iter()
        .map(|(name, quantity)| SpeciesShare {
            name,
            percentage: quantity / total * Decimal::ONE_HUNDRED,
            quantity,
        })
        .collect();
    // stable sort keeps name order on ties
    shares.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    shares
}

/// Pallets and available weight at one position, or unlocated when `None`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionOccupancy {
    pub position_id: Option<PositionId>,
    pub position_name: Option<String>,
    pub pallet_ids: Vec<PalletId>,
    pub available_net_weight: Decimal,
}

/// One entry per position of the store, in store order, then the unlocated bucket
pub fn position_occupancy(store: &Store) -> Vec<PositionOccupancy> {
    let mut entries: Vec<PositionOccupancy> = store
        .positions
        .iter()
        .map(|position| PositionOccupancy {
            position_id: Some(position.id),
            position_name: Some(position.name.clone()),
            pallet_ids: Vec::new(),
            available_net_weight: Decimal::ZERO,
        })
        .collect();
    let mut unlocated = PositionOccupancy {
        position_id: None,
        position_name: None,
        pallet_ids: Vec::new(),
        available_net_weight: Decimal::ZERO,
    };

    for pallet in &store.pallets {
        let position = pallet.location.and_then(|l| l.position_id);
        let entry = entries
            .iter_mut()
            .find(|e| position.is_some() && e.position_id == position)
            .unwrap_or(&mut unlocated);
        if let Some(id) = pallet.id {
            entry.pallet_ids.push(id);
        }
        entry.available_net_weight += pallet.available_net_weight();
    }

    entries.push(unlocated);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ProductId, SpeciesId, StoreId};
    use crate::models::{Pallet, PalletBox, Product, SpeciesRef, StorePosition};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn product(id: i64, species: Option<&str>) -> Product {
        let product = Product::new(ProductId::new(id), format!("P{}", id));
        match species {
            Some(name) => product.with_species(SpeciesRef {
                id: SpeciesId::new(id),
                name: name.to_string(),
            }),
            None => product,
        }
    }

    fn pallet(id: i64, boxes: Vec<PalletBox>) -> Pallet {
        let mut pallet = Pallet::with_boxes(boxes);
        pallet.id = Some(PalletId::new(id));
        pallet
    }

    fn store() -> Store {
        let mut unavailable = PalletBox::new(Some(product(1, Some("Hake"))), "L", dec("50"));
        unavailable.is_available = Some(false);

        Store {
            id: StoreId::new(1),
            name: "Cold room 1".to_string(),
            positions: vec![
                StorePosition {
                    id: PositionId::new(10),
                    name: "A1".to_string(),
                },
                StorePosition {
                    id: PositionId::new(11),
                    name: "A2".to_string(),
                },
            ],
            pallets: vec![
                pallet(
                    100,
                    vec![
                        PalletBox::new(Some(product(1, Some("Hake"))), "L", dec("30")),
                        unavailable,
                    ],
                ),
                pallet(
                    101,
                    vec![PalletBox::new(Some(product(2, Some("Octopus"))), "L", dec("60"))],
                ),
                pallet(
                    102,
                    vec![PalletBox::new(Some(product(3, None)), "L", dec("10"))],
                ),
            ],
        }
    }

    #[test]
    fn test_assign_several_pallets_to_one_position() {
        let mut store = store();
        let ids = [PalletId::new(100), PalletId::new(101)];

        assign_to_position(&mut store, &ids, PositionId::new(10)).unwrap();

        for id in ids {
            assert_eq!(
                store.pallet(id).unwrap().location.unwrap().position_id,
                Some(PositionId::new(10))
            );
        }
        assert!(!store.pallet(PalletId::new(102)).unwrap().is_located());
    }

    #[test]
    fn test_assign_rejects_unknown_position() {
        let mut store = store();
        let result = assign_to_position(&mut store, &[PalletId::new(100)], PositionId::new(99));
        assert!(matches!(result, Err(CoreError::UnknownPosition { .. })));
    }

    #[test]
    fn test_assign_is_all_or_nothing() {
        let mut store = store();
        let before = store.clone();

        let result = assign_to_position(
            &mut store,
            &[PalletId::new(100), PalletId::new(555)],
            PositionId::new(10),
        );

        assert!(matches!(result, Err(CoreError::PalletNotInStore { .. })));
        assert_eq!(store, before);
    }

    #[test]
    fn test_unassign_clears_only_position() {
        let mut store = store();
        assign_to_position(&mut store, &[PalletId::new(100)], PositionId::new(10)).unwrap();

        unassign(&mut store, PalletId::new(100)).unwrap();

        let pallet = store.pallet(PalletId::new(100)).unwrap();
        assert!(!pallet.is_located());
        assert_eq!(pallet.location.unwrap().store_id, StoreId::new(1));
        assert_eq!(pallet.number_of_boxes(), 2);
    }

    #[test]
    fn test_species_summary_uses_available_weight() {
        let summary = species_summary(&store());

        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].name, "Octopus");
        assert_eq!(summary[0].quantity, dec("60"));
        assert_eq!(summary[0].percentage, dec("60"));
        assert_eq!(summary[1].name, "Hake");
        assert_eq!(summary[1].quantity, dec("30"));
        assert_eq!(summary[2].name, "Unclassified");
        assert_eq!(summary[2].percentage, dec("10"));
    }

    #[test]
    fn test_species_summary_of_empty_store() {
        let mut store = store();
        store.pallets.clear();
        assert!(species_summary(&store).is_empty());
    }

    #[test]
    fn test_position_occupancy() {
        let mut store = store();
        assign_to_position(&mut store, &[PalletId::new(101)], PositionId::new(11)).unwrap();

        let occupancy = position_occupancy(&store);

        assert_eq!(occupancy.len(), 3);
        assert!(occupancy[0].pallet_ids.is_empty());
        assert_eq!(occupancy[1].pallet_ids, vec![PalletId::new(101)]);
        assert_eq!(occupancy[1].available_net_weight, dec("60"));
        assert_eq!(occupancy[2].position_id, None);
        assert_eq!(occupancy[2].pallet_ids.len(), 2);
        assert_eq!(occupancy[2].available_net_weight, dec("40"));
    }
}
