//! Pallet positions inside stores and per-store summaries

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::placement;
use shared::{PalletId, PositionId, PositionOccupancy, SpeciesShare, StoreId};

use crate::error::{AppError, AppResult};
use crate::external::InventoryApi;
use crate::middleware::RequestContext;
use crate::services::in_flight::InFlight;

/// Placement service
#[derive(Clone)]
pub struct PlacementService {
    api: Arc<dyn InventoryApi>,
    in_flight: InFlight,
}

/// Input for placing pallets at a position
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignInput {
    pub store_id: StoreId,
    pub pallet_ids: Vec<PalletId>,
}

/// Pallets now at a position
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignResult {
    pub store_id: StoreId,
    pub position_id: PositionId,
    pub pallet_ids: Vec<PalletId>,
}

/// Result of clearing a pallet's position
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignResult {
    pub pallet_id: PalletId,
    /// False when the pallet had no position
    pub changed: bool,
}

impl PlacementService {
    /// Create a new PlacementService instance
    pub fn new(api: Arc<dyn InventoryApi>, in_flight: InFlight) -> Self {
        Self { api, in_flight }
    }

    /// Place pallets at a position of their store
    pub async fn assign(
        &self,
        ctx: &RequestContext,
        position: PositionId,
        input: AssignInput,
    ) -> AppResult<AssignResult> {
        if input.pallet_ids.is_empty() {
            return Err(AppError::invalid_input(
                "palletIds",
                "At least one pallet is required",
            ));
        }
        let _ticket = self.in_flight.acquire(InFlight::assign_key(position))?;

        let mut store = self.api.get_store(ctx, input.store_id).await?;
        placement::assign_to_position(&mut store, &input.pallet_ids, position)?;

        self.api
            .assign_pallets_to_position(ctx, position, &input.pallet_ids)
            .await
            .map_err(|e| {
                tracing::warn!("Assigning pallets to position {} failed: {}", position, e);
                e
            })?;
        tracing::info!(
            "Placed {} pallets at position {} of store {}",
            input.pallet_ids.len(),
            position,
            input.store_id
        );

        Ok(AssignResult {
            store_id: input.store_id,
            position_id: position,
            pallet_ids: input.pallet_ids,
        })
    }

    /// Clear a pallet's position; it stays in its store
    pub async fn unassign(&self, ctx: &RequestContext, pallet_id: PalletId) -> AppResult<UnassignResult> {
        let pallet = self.api.get_pallet(ctx, pallet_id).await?;
        let Some(location) = pallet.location.filter(|l| l.position_id.is_some()) else {
            tracing::debug!("Pallet {} has no position", pallet_id);
            return Ok(UnassignResult {
                pallet_id,
                changed: false,
            });
        };

        let mut store = self.api.get_store(ctx, location.store_id).await?;
        placement::unassign(&mut store, pallet_id)?;

        self.api
            .unassign_pallet_position(ctx, pallet_id)
            .await
            .map_err(|e| {
                tracing::warn!("Clearing position of pallet {} failed: {}", pallet_id, e);
                e
            })?;
        tracing::info!("Cleared position of pallet {}", pallet_id);

        Ok(UnassignResult {
            pallet_id,
            changed: true,
        })
    }

    pub async fn species_summary(&self, ctx: &RequestContext, store_id: StoreId) -> AppResult<Vec<SpeciesShare>> {
        let store = self.api.get_store(ctx, store_id).await?;
        Ok(placement::species_summary(&store))
    }

    pub async fn occupancy(&self, ctx: &RequestContext, store_id: StoreId) -> AppResult<Vec<PositionOccupancy>> {
        let store = self.api.get_store(ctx, store_id).await?;
        Ok(placement::position_occupancy(&store))
    }
}
