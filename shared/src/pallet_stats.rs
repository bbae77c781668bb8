//! Pallet aggregate recomputation and box-level mutations
//!
//! `recalculate` is the only code that writes a pallet's box count and net
//! weight. Every mutation below ends by calling it, so no caller can observe
//! or persist an aggregate that disagrees with the boxes.
//!
//! Box weights are held at [`crate::types::WEIGHT_DECIMALS`]; finer input is
//! rounded here, so the stored total is the exact sum of the boxes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::{Pallet, PalletBox, Product};
use crate::types::round_weight;
use crate::weight::split_evenly;

/// Recompute `number_of_boxes` and `net_weight` from the live boxes
pub fn recalculate(mut pallet: Pallet) -> Pallet {
    for b in &mut pallet.boxes {
        b.net_weight = round_weight(b.net_weight);
        b.gross_weight = b.gross_weight.map(round_weight);
    }
    pallet.number_of_boxes = pallet.boxes.len();
    pallet.net_weight = pallet.boxes.iter().map(|b| b.net_weight).sum();
    pallet
}

/// In-place edit of a box; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoxEdit {
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub lot: Option<String>,
    #[serde(default)]
    pub net_weight: Option<Decimal>,
    #[serde(default)]
    pub gross_weight: Option<Decimal>,
}

fn ensure_weight(net_weight: Decimal) -> CoreResult<()> {
    if net_weight < Decimal::ZERO {
        return Err(CoreError::InvalidWeight(format!(
            "box net weight {} is negative",
            net_weight
        )));
    }
    Ok(())
}

fn box_position(pallet: &Pallet, local_id: Uuid) -> CoreResult<usize> {
    pallet
        .boxes
        .iter()
        .position(|b| b.local_id == local_id)
        .ok_or_else(|| CoreError::NotFound(format!("Box {}", local_id)))
}

/// Append a box
pub fn add_box(mut pallet: Pallet, new_box: PalletBox) -> CoreResult<Pallet> {
    pallet.ensure_appendable()?;
    ensure_weight(new_box.net_weight)?;
    pallet.boxes.push(new_box);
    Ok(recalculate(pallet))
}

/// Append `count` boxes of one product/lot sharing `total_net` evenly
pub fn add_boxes_evenly(
    mut pallet: Pallet,
    product: Product,
    lot: &str,
    total_net: Decimal,
    count: u32,
) -> CoreResult<Pallet> {
    pallet.ensure_appendable()?;
    for net in split_evenly(total_net, count)? {
        pallet
            .boxes
            .push(PalletBox::new(Some(product.clone()), lot, net));
    }
    Ok(recalculate(pallet))
}

/// Append a copy of an existing box under a new identity
pub fn duplicate_box(mut pallet: Pallet, local_id: Uuid) -> CoreResult<Pallet> {
    pallet.ensure_appendable()?;
    let index = box_position(&pallet, local_id)?;
    let copy = pallet.boxes[index].duplicate();
    pallet.boxes.insert(index + 1, copy);
    Ok(recalculate(pallet))
}

/// Remove a box; only on pallets that are still structurally editable
pub fn delete_box(mut pallet: Pallet, local_id: Uuid) -> CoreResult<Pallet> {
    pallet.ensure_structurally_editable()?;
    let index = box_position(&pallet, local_id)?;
    pallet.boxes.remove(index);
    Ok(recalculate(pallet))
}

/// Change product, lot or weights of a box in place
pub fn edit_box(mut pallet: Pallet, local_id: Uuid, edit: BoxEdit) -> CoreResult<Pallet> {
    pallet.ensure_structurally_editable()?;
    let index = box_position(&pallet, local_id)?;
    if let Some(net_weight) = edit.net_weight {
        ensure_weight(net_weight)?;
    }

    let target = &mut pallet.boxes[index];
    if let Some(product) = edit.product {
        target.product = Some(product);
    }
    if let Some(lot) = edit.lot {
        target.lot = lot;
    }
    if let Some(net_weight) = edit.net_weight {
        target.net_weight = net_weight;
    }
    if let Some(gross_weight) = edit.gross_weight {
        target.gross_weight = Some(gross_weight);
    }
    Ok(recalculate(pallet))
}
