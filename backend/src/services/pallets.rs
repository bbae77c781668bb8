//! Persisted pallets: box edits, availability and order links
//!
//! Pallets are fetched fresh for every operation. Rules are checked locally
//! before anything is sent to the inventory service.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::linking::{self, LinkChange};
use shared::pallet_stats::{self, BoxEdit};
use shared::{
    available_pallets_for_order, validate_lot, Availability, AvailabilityReport, BoxId, OrderId,
    Pallet, PalletBatchOutcome, PalletBox, PalletFilter, PalletId, PalletState, PalletSummary,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult, GENERIC_REMOTE_MESSAGE_EN};
use crate::external::{ApiError, BatchItemResult, InventoryApi, PalletOrderLink, PalletQuery};
use crate::middleware::RequestContext;
use crate::services::in_flight::{InFlight, InFlightTicket};
use crate::services::intake::BoxInput;

/// Pallet service
#[derive(Clone)]
pub struct PalletService {
    api: Arc<dyn InventoryApi>,
    in_flight: InFlight,
}

/// Input for linking one pallet
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInput {
    pub order_id: OrderId,
}

/// Input for linking several pallets at once
#[derive(Debug, Deserialize)]
pub struct BatchLinkInput {
    pub links: Vec<PalletOrderLink>,
}

/// Input for unlinking several pallets at once
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUnlinkInput {
    pub pallet_ids: Vec<PalletId>,
}

/// Availability of one pallet
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PalletAvailability {
    pub pallet_id: PalletId,
    pub number_of_boxes: usize,
    pub net_weight: rust_decimal::Decimal,
    pub available: AvailabilityReport,
}

/// Result of a single link or unlink
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResult {
    pub pallet_id: PalletId,
    pub order_id: Option<OrderId>,
    /// False when the pallet was already in the requested state
    pub changed: bool,
}

/// Pool entry for an order, with approximate availability
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCandidate {
    #[serde(flatten)]
    pub pallet: PalletSummary,
    pub available: AvailabilityReport,
}

fn local_box_id(pallet: &Pallet, box_id: BoxId) -> AppResult<Uuid> {
    pallet
        .boxes()
        .iter()
        .find(|b| b.id == Some(box_id))
        .map(|b| b.local_id)
        .ok_or_else(|| AppError::NotFound(format!("Box {}", box_id)))
}

/// First occurrence of every pallet, in request order
fn unique_by_pallet<T>(items: Vec<T>, pallet_of: impl Fn(&T) -> PalletId) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(pallet_of(item)))
        .collect()
}

fn item_result(pallet_id: PalletId, failure: Option<String>) -> BatchItemResult {
    BatchItemResult {
        pallet_id,
        success: failure.is_none(),
        message: failure,
    }
}

/// Fold per-pallet results into an outcome, in request order.
///
/// Pallets the service did not report on count as failed.
pub fn batch_outcome(requested: &[PalletId], results: &[BatchItemResult]) -> PalletBatchOutcome {
    let mut outcome = PalletBatchOutcome::default();
    for id in requested {
        match results.iter().find(|r| r.pallet_id == *id) {
            Some(result) if result.success => outcome.record_success(*id),
            Some(result) => outcome.record_failure(
                *id,
                result
                    .message
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_REMOTE_MESSAGE_EN.to_string()),
            ),
            None => outcome.record_failure(*id, GENERIC_REMOTE_MESSAGE_EN),
        }
    }
    outcome
}

impl PalletService {
    /// Create a new PalletService instance
    pub fn new(api: Arc<dyn InventoryApi>, in_flight: InFlight) -> Self {
        Self { api, in_flight }
    }

    async fn fetch(&self, ctx: &RequestContext, id: PalletId) -> AppResult<Pallet> {
        let mut pallet = self.api.get_pallet(ctx, id).await?;
        pallet.id.get_or_insert(id);
        Ok(pallet)
    }

    async fn save(&self, ctx: &RequestContext, id: PalletId, pallet: &Pallet) -> AppResult<Pallet> {
        let saved = self.api.update_pallet(ctx, id, pallet).await.map_err(|e| {
            tracing::warn!("Saving pallet {} failed: {}", id, e);
            e
        })?;
        tracing::info!(
            "Pallet {} saved: {} boxes, {} kg",
            id,
            saved.number_of_boxes(),
            saved.net_weight()
        );
        Ok(saved)
    }

    /// Exact availability from the pallet's boxes
    pub async fn availability(&self, ctx: &RequestContext, id: PalletId) -> AppResult<PalletAvailability> {
        let pallet = self.fetch(ctx, id).await?;
        Ok(PalletAvailability {
            pallet_id: id,
            number_of_boxes: pallet.number_of_boxes(),
            net_weight: pallet.net_weight(),
            available: pallet.availability(),
        })
    }

    // ------------------------------------------------------------------
    // Box edits
    // ------------------------------------------------------------------

    pub async fn add_box(&self, ctx: &RequestContext, id: PalletId, input: BoxInput) -> AppResult<Pallet> {
        validate_lot(input.lot.trim()).map_err(|msg| AppError::invalid_input("lot", msg))?;
        let mut new_box = PalletBox::new(input.product, input.lot.trim(), input.net_weight);
        new_box.gross_weight = input.gross_weight;

        let pallet = pallet_stats::add_box(self.fetch(ctx, id).await?, new_box)?;
        self.save(ctx, id, &pallet).await
    }

    pub async fn edit_box(
        &self,
        ctx: &RequestContext,
        id: PalletId,
        box_id: BoxId,
        edit: BoxEdit,
    ) -> AppResult<Pallet> {
        if let Some(lot) = &edit.lot {
            validate_lot(lot).map_err(|msg| AppError::invalid_input("lot", msg))?;
        }
        let pallet = self.fetch(ctx, id).await?;
        let local_id = local_box_id(&pallet, box_id)?;
        let pallet = pallet_stats::edit_box(pallet, local_id, edit)?;
        self.save(ctx, id, &pallet).await
    }

    pub async fn delete_box(&self, ctx: &RequestContext, id: PalletId, box_id: BoxId) -> AppResult<Pallet> {
        let pallet = self.fetch(ctx, id).await?;
        let local_id = local_box_id(&pallet, box_id)?;
        let pallet = pallet_stats::delete_box(pallet, local_id)?;
        self.save(ctx, id, &pallet).await
    }

    // ------------------------------------------------------------------
    // Order links
    // ------------------------------------------------------------------

    /// Link a pallet to an order; already on that order is a no-op
    pub async fn link(&self, ctx: &RequestContext, id: PalletId, order: OrderId) -> AppResult<LinkResult> {
        let _ticket = self.in_flight.acquire(InFlight::link_key(id))?;
        let mut pallet = self.fetch(ctx, id).await?;

        match linking::link(&mut pallet, order)? {
            LinkChange::AlreadyOnOrder => {
                tracing::debug!("Pallet {} already linked to order {}", id, order);
                Ok(LinkResult {
                    pallet_id: id,
                    order_id: Some(order),
                    changed: false,
                })
            }
            LinkChange::Linked => {
                self.api.link_pallet_to_order(ctx, id, order).await.map_err(|e| {
                    tracing::warn!("Linking pallet {} to order {} failed: {}", id, order, e);
                    e
                })?;
                tracing::info!("Linked pallet {} to order {}", id, order);
                Ok(LinkResult {
                    pallet_id: id,
                    order_id: Some(order),
                    changed: true,
                })
            }
        }
    }

    /// Detach a pallet from its order; an unlinked pallet is left as is
    pub async fn unlink(&self, ctx: &RequestContext, id: PalletId) -> AppResult<LinkResult> {
        let _ticket = self.in_flight.acquire(InFlight::link_key(id))?;
        let mut pallet = self.fetch(ctx, id).await?;

        let Some(order) = linking::unlink(&mut pallet) else {
            tracing::debug!("Pallet {} is not linked to any order", id);
            return Ok(LinkResult {
                pallet_id: id,
                order_id: None,
                changed: false,
            });
        };

        self.api.unlink_pallet_from_order(ctx, id).await.map_err(|e| {
            tracing::warn!("Unlinking pallet {} from order {} failed: {}", id, order, e);
            e
        })?;
        tracing::info!("Unlinked pallet {} from order {}", id, order);
        Ok(LinkResult {
            pallet_id: id,
            order_id: None,
            changed: true,
        })
    }

    fn claim_all(&self, ids: &[PalletId]) -> AppResult<Vec<InFlightTicket>> {
        if ids.is_empty() {
            return Err(AppError::invalid_input("palletIds", "At least one pallet is required"));
        }
        ids.iter()
            .map(|id| self.in_flight.acquire(InFlight::link_key(*id)))
            .collect()
    }

    fn log_outcome(action: &str, outcome: &PalletBatchOutcome) {
        tracing::info!(
            "Batch {}: {} succeeded, {} failed",
            action,
            outcome.succeeded.len(),
            outcome.failed.len()
        );
        for failure in &outcome.failed {
            tracing::warn!("Batch {} failed for pallet {}: {}", action, failure.id, failure.message);
        }
    }

    /// Link many pallets; each pallet succeeds or fails on its own.
    ///
    /// The single-link rule holds per pallet: one on another order fails
    /// locally, one already on the requested order succeeds without a call.
    /// A pallet listed twice is linked once.
    pub async fn link_batch(
        &self,
        ctx: &RequestContext,
        links: Vec<PalletOrderLink>,
    ) -> AppResult<PalletBatchOutcome> {
        let links = unique_by_pallet(links, |l| l.pallet_id);
        let ids: Vec<PalletId> = links.iter().map(|l| l.pallet_id).collect();
        let _tickets = self.claim_all(&ids)?;

        let mut results = Vec::with_capacity(links.len());
        let mut pending = Vec::new();
        for link in &links {
            let id = link.pallet_id;
            let mut pallet = match self.api.get_pallet(ctx, id).await {
                Ok(pallet) => pallet,
                Err(ApiError::Status { message, .. }) => {
                    results.push(item_result(id, Some(message)));
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            pallet.id.get_or_insert(id);
            match linking::link(&mut pallet, link.order_id) {
                Ok(LinkChange::Linked) => pending.push(*link),
                Ok(LinkChange::AlreadyOnOrder) => results.push(item_result(id, None)),
                Err(e) => {
                    tracing::debug!("Batch link skipped pallet {}: {}", id, e);
                    results.push(item_result(id, Some(e.to_string())));
                }
            }
        }

        if !pending.is_empty() {
            results.extend(self.api.link_pallets_to_orders(ctx, &pending).await?);
        }
        let outcome = batch_outcome(&ids, &results);
        Self::log_outcome("link", &outcome);
        Ok(outcome)
    }

    /// Unlink many pallets; the inventory service decides per pallet.
    ///
    /// A pallet listed twice is unlinked once.
    pub async fn unlink_batch(
        &self,
        ctx: &RequestContext,
        pallet_ids: Vec<PalletId>,
    ) -> AppResult<PalletBatchOutcome> {
        let pallet_ids = unique_by_pallet(pallet_ids, |id| *id);
        let _tickets = self.claim_all(&pallet_ids)?;

        let results = self.api.unlink_pallets_from_orders(ctx, &pallet_ids).await?;
        let outcome = batch_outcome(&pallet_ids, &results);
        Self::log_outcome("unlink", &outcome);
        Ok(outcome)
    }

    /// Pallets that may be linked to `order`, narrowed by `filter`
    pub async fn available_for_order(
        &self,
        ctx: &RequestContext,
        order: OrderId,
        filter: PalletFilter,
    ) -> AppResult<Vec<OrderCandidate>> {
        let query = PalletQuery {
            text: filter.text.clone(),
            product_id: filter.product_id,
            lot: filter.lot.clone(),
            state: filter.stored_only.then_some(PalletState::Stored),
            store_id: None,
        };
        let found = self.api.search_pallets(ctx, &query).await?;
        let pool = available_pallets_for_order(&found, order, &filter);
        tracing::debug!(
            "Order {}: {} of {} pallets available",
            order,
            pool.len(),
            found.len()
        );

        Ok(pool
            .into_iter()
            .map(|pallet| OrderCandidate {
                available: pallet.availability(),
                pallet,
            })
            .collect())
    }
}
