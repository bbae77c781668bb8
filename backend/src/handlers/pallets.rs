//! HTTP handlers for persisted pallet endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::pallet_stats::BoxEdit;
use shared::{BoxId, OrderId, Pallet, PalletBatchOutcome, PalletFilter, PalletId};

use crate::error::AppResult;
use crate::middleware::RequestContext;
use crate::services::intake::BoxInput;
use crate::services::pallets::{
    BatchLinkInput, BatchUnlinkInput, LinkInput, LinkResult, OrderCandidate, PalletAvailability,
};
use crate::AppState;

/// Exact available quantity of a pallet
pub async fn get_availability(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(pallet_id): Path<PalletId>,
) -> AppResult<Json<PalletAvailability>> {
    Ok(Json(state.pallets().availability(&ctx, pallet_id).await?))
}

/// Add a box to a stored pallet
pub async fn add_box(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(pallet_id): Path<PalletId>,
    Json(input): Json<BoxInput>,
) -> AppResult<Json<Pallet>> {
    Ok(Json(state.pallets().add_box(&ctx, pallet_id, input).await?))
}

/// Edit a box of a stored pallet
pub async fn edit_box(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((pallet_id, box_id)): Path<(PalletId, BoxId)>,
    Json(edit): Json<BoxEdit>,
) -> AppResult<Json<Pallet>> {
    Ok(Json(
        state.pallets().edit_box(&ctx, pallet_id, box_id, edit).await?,
    ))
}

/// Delete a box of a stored pallet
pub async fn delete_box(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((pallet_id, box_id)): Path<(PalletId, BoxId)>,
) -> AppResult<Json<Pallet>> {
    Ok(Json(
        state.pallets().delete_box(&ctx, pallet_id, box_id).await?,
    ))
}

/// Link a pallet to an order
pub async fn link(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(pallet_id): Path<PalletId>,
    Json(input): Json<LinkInput>,
) -> AppResult<Json<LinkResult>> {
    Ok(Json(
        state.pallets().link(&ctx, pallet_id, input.order_id).await?,
    ))
}

/// Unlink a pallet from its order
pub async fn unlink(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(pallet_id): Path<PalletId>,
) -> AppResult<Json<LinkResult>> {
    Ok(Json(state.pallets().unlink(&ctx, pallet_id).await?))
}

/// Link several pallets; partial success is reported per pallet
pub async fn link_batch(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(input): Json<BatchLinkInput>,
) -> AppResult<Json<PalletBatchOutcome>> {
    Ok(Json(state.pallets().link_batch(&ctx, input.links).await?))
}

/// Unlink several pallets; partial success is reported per pallet
pub async fn unlink_batch(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(input): Json<BatchUnlinkInput>,
) -> AppResult<Json<PalletBatchOutcome>> {
    Ok(Json(
        state.pallets().unlink_batch(&ctx, input.pallet_ids).await?,
    ))
}

/// Pallets that can be linked to an order
pub async fn available_for_order(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(order_id): Path<OrderId>,
    Query(filter): Query<PalletFilter>,
) -> AppResult<Json<Vec<OrderCandidate>>> {
    Ok(Json(
        state
            .pallets()
            .available_for_order(&ctx, order_id, filter)
            .await?,
    ))
}
