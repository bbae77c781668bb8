//! Pallet and box models
//!
//! A pallet exclusively owns its boxes. Its box count and net weight are
//! derived values: they are private here and only ever written by
//! [`crate::pallet_stats::recalculate`], including when a pallet is
//! deserialized from the remote API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Product;
use crate::error::{CoreError, CoreResult};
use crate::ids::{BoxId, OrderId, PalletId, PositionId, ProductId, ReceptionId, StoreId};
use crate::pallet_stats;

/// The smallest tracked physical unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PalletBox {
    /// Identity while editing; stable across edits, fresh on duplicate
    #[serde(default = "Uuid::new_v4")]
    pub local_id: Uuid,
    /// Server id, absent until the box is persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BoxId>,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub lot: String,
    pub net_weight: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_weight: Option<Decimal>,
    /// `Some(false)` once consumed, dispatched or committed to a closed order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    /// Created or duplicated during the current editing session
    #[serde(default)]
    pub is_new: bool,
}

impl PalletBox {
    /// A new, unsaved box
    pub fn new(product: Option<Product>, lot: impl Into<String>, net_weight: Decimal) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            id: None,
            product,
            lot: lot.into(),
            net_weight,
            gross_weight: None,
            is_available: None,
            is_new: true,
        }
    }

    pub fn product_id(&self) -> Option<ProductId> {
        self.product.as_ref().map(|p| p.id)
    }

    /// A box counts as available unless explicitly flagged otherwise
    pub fn counts_as_available(&self) -> bool {
        self.is_available != Some(false)
    }

    /// Copy with a fresh identity, flagged as newly added
    pub fn duplicate(&self) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            id: None,
            is_new: true,
            ..self.clone()
        }
    }
}

/// Lifecycle state of a pallet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PalletState {
    #[default]
    Registered,
    Stored,
    Shipped,
    Processed,
}

impl PalletState {
    /// Shipped and processed pallets are frozen
    pub fn allows_box_changes(&self) -> bool {
        matches!(self, PalletState::Registered | PalletState::Stored)
    }
}

impl std::fmt::Display for PalletState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PalletState::Registered => write!(f, "registered"),
            PalletState::Stored => write!(f, "stored"),
            PalletState::Shipped => write!(f, "shipped"),
            PalletState::Processed => write!(f, "processed"),
        }
    }
}

/// Where a pallet sits: a store, and optionally a position inside it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoreLocation {
    pub store_id: StoreId,
    #[serde(default)]
    pub position_id: Option<PositionId>,
}

/// A physical unit of storage composed of boxes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "PalletRecord")]
pub struct Pallet {
    pub id: Option<PalletId>,
    pub state: PalletState,
    pub observations: Option<String>,
    pub reception_id: Option<ReceptionId>,
    pub order_id: Option<OrderId>,
    pub location: Option<StoreLocation>,
    pub(crate) boxes: Vec<PalletBox>,
    pub(crate) number_of_boxes: usize,
    pub(crate) net_weight: Decimal,
}

/// Wire shape of a pallet; aggregates sent by the server are discarded
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PalletRecord {
    #[serde(default)]
    id: Option<PalletId>,
    #[serde(default)]
    state: PalletState,
    #[serde(default)]
    observations: Option<String>,
    #[serde(default)]
    reception_id: Option<ReceptionId>,
    #[serde(default)]
    order_id: Option<OrderId>,
    #[serde(default)]
    location: Option<StoreLocation>,
    #[serde(default)]
    boxes: Vec<PalletBox>,
}

impl From<PalletRecord> for Pallet {
    fn from(record: PalletRecord) -> Self {
        let pallet = Pallet {
            id: record.id,
            state: record.state,
            observations: record.observations,
            reception_id: record.reception_id,
            order_id: record.order_id,
            location: record.location,
            boxes: record.boxes,
            number_of_boxes: 0,
            net_weight: Decimal::ZERO,
        };
        pallet_stats::recalculate(pallet)
    }
}

impl Default for Pallet {
    fn default() -> Self {
        Self::new()
    }
}

impl Pallet {
    /// An empty, unsaved pallet
    pub fn new() -> Self {
        Self {
            id: None,
            state: PalletState::Registered,
            observations: None,
            reception_id: None,
            order_id: None,
            location: None,
            boxes: Vec::new(),
            number_of_boxes: 0,
            net_weight: Decimal::ZERO,
        }
    }

    /// A pallet holding `boxes`, with aggregates derived from them
    pub fn with_boxes(boxes: Vec<PalletBox>) -> Self {
        pallet_stats::recalculate(Self {
            boxes,
            ..Self::new()
        })
    }

    pub fn boxes(&self) -> &[PalletBox] {
        &self.boxes
    }

    pub fn number_of_boxes(&self) -> usize {
        self.number_of_boxes
    }

    pub fn net_weight(&self) -> Decimal {
        self.net_weight
    }

    pub fn find_box(&self, local_id: Uuid) -> Option<&PalletBox> {
        self.boxes.iter().find(|b| b.local_id == local_id)
    }

    /// Belongs to a persisted reception
    pub fn is_reception_owned(&self) -> bool {
        self.reception_id.is_some()
    }

    pub fn is_located(&self) -> bool {
        self.location.map(|l| l.position_id.is_some()).unwrap_or(false)
    }

    /// Delete, clone, box delete and in-place box edits
    pub fn ensure_structurally_editable(&self) -> CoreResult<()> {
        self.ensure_appendable()?;
        if self.is_reception_owned() {
            return Err(CoreError::ReadOnlyPallet(
                "pallet belongs to a reception; boxes can only be added".to_string(),
            ));
        }
        Ok(())
    }

    /// Adding boxes is allowed on any pallet that is not shipped or processed
    pub fn ensure_appendable(&self) -> CoreResult<()> {
        if !self.state.allows_box_changes() {
            return Err(CoreError::ReadOnlyPallet(format!(
                "pallet is {}",
                self.state
            )));
        }
        Ok(())
    }

    /// Structural copy for the editor: same boxes under fresh identities
    pub fn clone_structure(&self) -> CoreResult<Pallet> {
        self.ensure_structurally_editable()?;
        let boxes = self.boxes.iter().map(PalletBox::duplicate).collect();
        Ok(Pallet {
            observations: self.observations.clone(),
            ..Pallet::with_boxes(boxes)
        })
    }

    /// Distinct product names on the pallet, in first-seen order
    pub fn products_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for product in self.boxes.iter().filter_map(|b| b.product.as_ref()) {
            if !names.contains(&product.name) {
                names.push(product.name.clone());
            }
        }
        names
    }

    /// Distinct non-empty lots on the pallet, in first-seen order
    pub fn lots(&self) -> Vec<String> {
        let mut lots: Vec<String> = Vec::new();
        for lot in self.boxes.iter().map(|b| &b.lot) {
            if !lot.is_empty() && !lots.contains(lot) {
                lots.push(lot.clone());
            }
        }
        lots
    }
}

/// Aggregate-only pallet view returned by search endpoints.
///
/// Carries no per-box data, so availability derived from it is approximate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PalletSummary {
    pub id: PalletId,
    #[serde(default)]
    pub state: PalletState,
    pub net_weight: Decimal,
    pub number_of_boxes: usize,
    #[serde(default)]
    pub products_names: Vec<String>,
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
    #[serde(default)]
    pub lots: Vec<String>,
    #[serde(default)]
    pub reception_id: Option<ReceptionId>,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub location: Option<StoreLocation>,
}

impl PalletSummary {
    /// Summary of a fully loaded pallet
    pub fn from_pallet(id: PalletId, pallet: &Pallet) -> Self {
        let mut product_ids: Vec<ProductId> = Vec::new();
        for product_id in pallet.boxes.iter().filter_map(PalletBox::product_id) {
            if !product_ids.contains(&product_id) {
                product_ids.push(product_id);
            }
        }
        Self {
            id,
            state: pallet.state,
            net_weight: pallet.net_weight,
            number_of_boxes: pallet.number_of_boxes,
            products_names: pallet.products_names(),
            product_ids,
            lots: pallet.lots(),
            reception_id: pallet.reception_id,
            order_id: pallet.order_id,
            location: pallet.location,
        }
    }
}
