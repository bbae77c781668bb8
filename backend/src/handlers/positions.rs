//! HTTP handlers for positions and store summaries

use axum::{
    extract::{Path, State},
    Json,
};
use shared::{PalletId, PositionId, PositionOccupancy, SpeciesShare, StoreId};

use crate::error::AppResult;
use crate::middleware::RequestContext;
use crate::services::placement::{AssignInput, AssignResult, UnassignResult};
use crate::AppState;

/// Place pallets at a position
pub async fn assign_pallets(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(position_id): Path<PositionId>,
    Json(input): Json<AssignInput>,
) -> AppResult<Json<AssignResult>> {
    Ok(Json(
        state.placement().assign(&ctx, position_id, input).await?,
    ))
}

/// Clear the position of a pallet
pub async fn unassign_pallet(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(pallet_id): Path<PalletId>,
) -> AppResult<Json<UnassignResult>> {
    Ok(Json(state.placement().unassign(&ctx, pallet_id).await?))
}

/// Available weight per species in a store
pub async fn species_summary(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(store_id): Path<StoreId>,
) -> AppResult<Json<Vec<SpeciesShare>>> {
    Ok(Json(
        state.placement().species_summary(&ctx, store_id).await?,
    ))
}

/// Pallets and available weight per position of a store
pub async fn occupancy(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(store_id): Path<StoreId>,
) -> AppResult<Json<Vec<PositionOccupancy>>> {
    Ok(Json(state.placement().occupancy(&ctx, store_id).await?))
}
