//! HTTP handlers for reception draft endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::pallet_stats::BoxEdit;
use shared::Totals;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::RequestContext;
use crate::services::intake::{
    BoxInput, DraftView, HeaderInput, LineInput, ModeInput, ModeSwitchView, PalletInput,
    PriceInput, SplitInput, SubmitResult,
};
use crate::AppState;

/// Start a new reception draft
pub async fn create_draft(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> AppResult<(StatusCode, Json<DraftView>)> {
    let draft = state.intake().create_draft(&ctx).await?;
    Ok((StatusCode::CREATED, Json(draft)))
}

/// Get a reception draft
pub async fn get_draft(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(draft_id): Path<Uuid>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(state.intake().get_draft(&ctx, draft_id).await?))
}

/// Discard a reception draft
pub async fn delete_draft(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(draft_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.intake().delete_draft(&ctx, draft_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Update supplier, date and notes
pub async fn update_header(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(draft_id): Path<Uuid>,
    Json(input): Json<HeaderInput>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(state.intake().update_header(&ctx, draft_id, input).await?))
}

/// Request a switch to another intake mode
pub async fn request_mode(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(draft_id): Path<Uuid>,
    Json(input): Json<ModeInput>,
) -> AppResult<Json<ModeSwitchView>> {
    Ok(Json(state.intake().request_mode(&ctx, draft_id, input.mode).await?))
}

/// Confirm a pending mode switch, discarding the abandoned mode's data
pub async fn confirm_mode(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(draft_id): Path<Uuid>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(state.intake().confirm_mode(&ctx, draft_id).await?))
}

/// Cancel a pending mode switch
pub async fn cancel_mode(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(draft_id): Path<Uuid>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(state.intake().cancel_mode(&ctx, draft_id).await?))
}

/// Append an empty line
pub async fn add_line(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(draft_id): Path<Uuid>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(state.intake().add_line(&ctx, draft_id).await?))
}

/// Replace a line
pub async fn update_line(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((draft_id, index)): Path<(Uuid, usize)>,
    Json(input): Json<LineInput>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(state.intake().update_line(&ctx, draft_id, index, input).await?))
}

/// Remove a line
pub async fn remove_line(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((draft_id, index)): Path<(Uuid, usize)>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(state.intake().remove_line(&ctx, draft_id, index).await?))
}

/// Append an empty pallet
pub async fn add_pallet(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(draft_id): Path<Uuid>,
    Json(input): Json<PalletInput>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(state.intake().add_pallet(&ctx, draft_id, input).await?))
}

/// Remove a pallet
pub async fn remove_pallet(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((draft_id, index)): Path<(Uuid, usize)>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(state.intake().remove_pallet(&ctx, draft_id, index).await?))
}

/// Insert a copy of a pallet after it
pub async fn clone_pallet(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((draft_id, index)): Path<(Uuid, usize)>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(state.intake().clone_pallet(&ctx, draft_id, index).await?))
}

/// Add a box to a draft pallet
pub async fn add_box(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((draft_id, index)): Path<(Uuid, usize)>,
    Json(input): Json<BoxInput>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(state.intake().add_box(&ctx, draft_id, index, input).await?))
}

/// Add several boxes sharing a total weight
pub async fn split_boxes(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((draft_id, index)): Path<(Uuid, usize)>,
    Json(input): Json<SplitInput>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(
        state.intake().add_boxes_evenly(&ctx, draft_id, index, input).await?,
    ))
}

/// Duplicate a box of a draft pallet
pub async fn duplicate_box(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((draft_id, index, box_id)): Path<(Uuid, usize, Uuid)>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(
        state.intake().duplicate_box(&ctx, draft_id, index, box_id).await?,
    ))
}

/// Edit a box of a draft pallet
pub async fn edit_box(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((draft_id, index, box_id)): Path<(Uuid, usize, Uuid)>,
    Json(edit): Json<BoxEdit>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(
        state.intake().edit_box(&ctx, draft_id, index, box_id, edit).await?,
    ))
}

/// Delete a box of a draft pallet
pub async fn delete_box(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((draft_id, index, box_id)): Path<(Uuid, usize, Uuid)>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(state.intake().delete_box(&ctx, draft_id, index, box_id).await?))
}

/// Set the price of a product/lot across all pallets
pub async fn set_price(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(draft_id): Path<Uuid>,
    Json(input): Json<PriceInput>,
) -> AppResult<Json<DraftView>> {
    Ok(Json(state.intake().set_price(&ctx, draft_id, input).await?))
}

/// Totals of the active mode
pub async fn get_totals(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(draft_id): Path<Uuid>,
) -> AppResult<Json<Totals>> {
    Ok(Json(state.intake().totals(&ctx, draft_id).await?))
}

/// Validate and create the reception
pub async fn submit(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(draft_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<SubmitResult>)> {
    let result = state.intake().submit(&ctx, draft_id).await?;
    Ok((StatusCode::CREATED, Json(result)))
}
