//! Cold-storage stores and their positions

use serde::{Deserialize, Serialize};

use super::Pallet;
use crate::ids::{PalletId, PositionId, StoreId};

/// A named location inside a store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorePosition {
    pub id: PositionId,
    pub name: String,
}

/// A store with its positions and the pallets it currently holds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub positions: Vec<StorePosition>,
    #[serde(default)]
    pub pallets: Vec<Pallet>,
}

impl Store {
    pub fn has_position(&self, position_id: PositionId) -> bool {
        self.positions.iter().any(|p| p.id == position_id)
    }

    pub fn pallet(&self, pallet_id: PalletId) -> Option<&Pallet> {
        self.pallets.iter().find(|p| p.id == Some(pallet_id))
    }

    pub fn pallet_mut(&mut self, pallet_id: PalletId) -> Option<&mut Pallet> {
        self.pallets.iter_mut().find(|p| p.id == Some(pallet_id))
    }
}
