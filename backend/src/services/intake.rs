//! Reception drafts and their submission
//!
//! Drafts live in memory, one per editing session. A draft belongs to the
//! token and tenant that created it; other callers get a 404 for it. Every
//! edit runs under the write lock, so an edit and its derived updates
//! (aggregates, shared prices) are applied together. Only submission talks to
//! the inventory service.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::pallet_stats::{self, BoxEdit};
use shared::{
    parse_reception_date, summarize_lines, validate_lot, validate_notes, IntakeMode, ModeSwitch,
    Pallet, PalletBox, PriceEntry, PriceKey, Product, ProductId, Reception, ReceptionDetail,
    ReceptionDraft, ReceptionHeader, SupplierId, TareCode, Totals,
};
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

use crate::config::IntakeConfig;
use crate::error::{AppError, AppResult};
use crate::external::InventoryApi;
use crate::middleware::RequestContext;
use crate::services::in_flight::InFlight;

/// A draft together with the session that opened it
#[derive(Debug, Clone)]
pub struct OwnedDraft {
    owner: RequestContext,
    draft: ReceptionDraft,
}

/// Drafts by id, shared by all handlers
pub type DraftStore = Arc<RwLock<HashMap<Uuid, OwnedDraft>>>;

fn draft_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Draft {}", id))
}

/// The caller's draft; drafts of other sessions look absent
fn owned<'a>(
    drafts: &'a HashMap<Uuid, OwnedDraft>,
    ctx: &RequestContext,
    id: Uuid,
) -> AppResult<&'a ReceptionDraft> {
    match drafts.get(&id) {
        Some(entry) if entry.owner == *ctx => Ok(&entry.draft),
        Some(_) => {
            tracing::debug!("Draft {} requested from another session", id);
            Err(draft_not_found(id))
        }
        None => Err(draft_not_found(id)),
    }
}

fn owned_mut<'a>(
    drafts: &'a mut HashMap<Uuid, OwnedDraft>,
    ctx: &RequestContext,
    id: Uuid,
) -> AppResult<&'a mut ReceptionDraft> {
    match drafts.get_mut(&id) {
        Some(entry) if entry.owner == *ctx => Ok(&mut entry.draft),
        Some(_) => {
            tracing::debug!("Draft {} requested from another session", id);
            Err(draft_not_found(id))
        }
        None => Err(draft_not_found(id)),
    }
}

/// Reception entry service
#[derive(Clone)]
pub struct IntakeService {
    api: Arc<dyn InventoryApi>,
    drafts: DraftStore,
    in_flight: InFlight,
    config: IntakeConfig,
}

/// Input for updating the reception header
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderInput {
    pub supplier_id: Option<SupplierId>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// Input for requesting a mode change
#[derive(Debug, Deserialize)]
pub struct ModeInput {
    pub mode: IntakeMode,
}

/// Input for writing one reception line
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineInput {
    pub product: Option<Product>,
    pub gross_weight: Option<Decimal>,
    pub boxes: Option<u32>,
    /// Tare code, `"1"` to `"5"`; the configured default when absent
    pub tare: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub lot: String,
}

/// Input for adding an empty pallet
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PalletInput {
    #[validate(length(max = 500))]
    pub observations: Option<String>,
}

/// Input for adding one box
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxInput {
    pub product: Option<Product>,
    #[serde(default)]
    pub lot: String,
    pub net_weight: Decimal,
    pub gross_weight: Option<Decimal>,
}

/// Input for adding several boxes sharing a total weight
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SplitInput {
    pub product: Product,
    #[serde(default)]
    pub lot: String,
    pub total_net_weight: Decimal,
    #[validate(range(min = 1, max = 1000))]
    pub count: u32,
}

/// Input for setting the price of a product/lot
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInput {
    pub product_id: ProductId,
    #[serde(default)]
    pub lot: String,
    pub price: Decimal,
    /// Price the editor last saw; checked only with strict price sync
    pub expected: Option<Decimal>,
}

/// A draft as shown to the editor
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub id: Uuid,
    pub mode: IntakeMode,
    pub pending_switch: Option<IntakeMode>,
    pub header: ReceptionHeader,
    pub details: Vec<ReceptionDetail>,
    pub net_weights: Vec<Option<Decimal>>,
    pub pallets: Vec<Pallet>,
    pub prices: Vec<PriceEntry>,
    pub totals: Totals,
}

/// Outcome of a mode request together with the resulting draft
#[derive(Debug, Clone, Serialize)]
pub struct ModeSwitchView {
    pub outcome: ModeSwitch,
    pub draft: DraftView,
}

/// Reception created by a submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub reception: Reception,
    pub entries: usize,
    pub total_net_weight: Decimal,
}

fn lot_checked(lot: &str) -> AppResult<String> {
    validate_lot(lot.trim()).map_err(|msg| AppError::invalid_input("lot", msg))?;
    Ok(lot.trim().to_string())
}

fn view(id: Uuid, draft: &ReceptionDraft) -> AppResult<DraftView> {
    let lines = summarize_lines(draft.details())?;
    Ok(DraftView {
        id,
        mode: draft.mode(),
        pending_switch: draft.pending_switch(),
        header: draft.header.clone(),
        details: draft.details().to_vec(),
        net_weights: lines.net_weights,
        pallets: draft.pallets().to_vec(),
        prices: draft.prices().entries(),
        totals: draft.totals()?.for_display(),
    })
}

impl IntakeService {
    /// Create a new IntakeService instance
    pub fn new(
        api: Arc<dyn InventoryApi>,
        drafts: DraftStore,
        in_flight: InFlight,
        config: IntakeConfig,
    ) -> Self {
        Self {
            api,
            drafts,
            in_flight,
            config,
        }
    }

    /// Apply `edit` to a draft under the write lock and return the new view
    async fn edit<F>(&self, ctx: &RequestContext, id: Uuid, edit: F) -> AppResult<DraftView>
    where
        F: FnOnce(&mut ReceptionDraft) -> AppResult<()>,
    {
        let mut drafts = self.drafts.write().await;
        let draft = owned_mut(&mut drafts, ctx, id)?;
        edit(draft)?;
        view(id, draft)
    }

    /// Start a new draft in automatic mode, owned by the caller
    pub async fn create_draft(&self, ctx: &RequestContext) -> AppResult<DraftView> {
        let id = Uuid::new_v4();
        let draft = ReceptionDraft::new(self.config.default_tare_code);
        let view = view(id, &draft)?;
        self.drafts.write().await.insert(
            id,
            OwnedDraft {
                owner: ctx.clone(),
                draft,
            },
        );
        tracing::info!("Created reception draft {}", id);
        Ok(view)
    }

    pub async fn get_draft(&self, ctx: &RequestContext, id: Uuid) -> AppResult<DraftView> {
        let drafts = self.drafts.read().await;
        view(id, owned(&drafts, ctx, id)?)
    }

    /// Discard a draft without submitting it
    pub async fn delete_draft(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let mut drafts = self.drafts.write().await;
        owned(&drafts, ctx, id)?;
        drafts.remove(&id);
        tracing::info!("Discarded reception draft {}", id);
        Ok(())
    }

    pub async fn update_header(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: HeaderInput,
    ) -> AppResult<DraftView> {
        validate_notes(&input.notes).map_err(|msg| AppError::invalid_input("notes", msg))?;
        let date = input.date.as_deref().map(parse_reception_date).transpose()?;

        self.edit(ctx, id, |draft| {
            draft.header = ReceptionHeader {
                supplier: input.supplier_id,
                date,
                notes: input.notes,
            };
            Ok(())
        })
        .await
    }

    // ------------------------------------------------------------------
    // Mode
    // ------------------------------------------------------------------

    pub async fn request_mode(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        mode: IntakeMode,
    ) -> AppResult<ModeSwitchView> {
        let mut outcome = ModeSwitch::Unchanged;
        let draft = self
            .edit(ctx, id, |draft| {
                outcome = draft.request_mode(mode);
                Ok(())
            })
            .await?;
        tracing::debug!("Draft {} mode request {}: {:?}", id, mode, outcome);
        Ok(ModeSwitchView { outcome, draft })
    }

    pub async fn confirm_mode(&self, ctx: &RequestContext, id: Uuid) -> AppResult<DraftView> {
        self.edit(ctx, id, |draft| {
            let mode = draft.confirm_mode_switch()?;
            tracing::info!("Draft {} switched to {} mode, previous data discarded", id, mode);
            Ok(())
        })
        .await
    }

    pub async fn cancel_mode(&self, ctx: &RequestContext, id: Uuid) -> AppResult<DraftView> {
        self.edit(ctx, id, |draft| Ok(draft.cancel_mode_switch()?)).await
    }

    // ------------------------------------------------------------------
    // Lines
    // ------------------------------------------------------------------

    pub async fn add_line(&self, ctx: &RequestContext, id: Uuid) -> AppResult<DraftView> {
        self.edit(ctx, id, |draft| draft.add_line().map(|_| ()).map_err(Into::into))
            .await
    }

    pub async fn update_line(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        index: usize,
        input: LineInput,
    ) -> AppResult<DraftView> {
        let lot = lot_checked(&input.lot)?;
        let tare = match input.tare.as_deref() {
            Some(code) => Some(TareCode::from_str(code)?),
            None => None,
        };

        self.edit(ctx, id, |draft| {
            let line = ReceptionDetail {
                product: input.product,
                gross_weight: input.gross_weight,
                boxes: input.boxes,
                tare: tare.unwrap_or(self.config.default_tare_code),
                price: input.price,
                lot,
            };
            Ok(draft.update_line(index, line)?)
        })
        .await
    }

    pub async fn remove_line(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        index: usize,
    ) -> AppResult<DraftView> {
        self.edit(ctx, id, |draft| Ok(draft.remove_line(index)?)).await
    }

    // ------------------------------------------------------------------
    // Pallets and boxes
    // ------------------------------------------------------------------

    pub async fn add_pallet(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: PalletInput,
    ) -> AppResult<DraftView> {
        input.validate()?;
        self.edit(ctx, id, |draft| {
            let mut pallet = Pallet::new();
            pallet.observations = input.observations.filter(|o| !o.trim().is_empty());
            draft.add_pallet(pallet)?;
            Ok(())
        })
        .await
    }

    pub async fn remove_pallet(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        index: usize,
    ) -> AppResult<DraftView> {
        self.edit(ctx, id, |draft| draft.remove_pallet(index).map(|_| ()).map_err(Into::into))
            .await
    }

    pub async fn clone_pallet(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        index: usize,
    ) -> AppResult<DraftView> {
        self.edit(ctx, id, |draft| draft.clone_pallet(index).map(|_| ()).map_err(Into::into))
            .await
    }

    pub async fn add_box(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        index: usize,
        input: BoxInput,
    ) -> AppResult<DraftView> {
        let mut new_box = PalletBox::new(input.product, lot_checked(&input.lot)?, input.net_weight);
        new_box.gross_weight = input.gross_weight;

        self.edit(ctx, id, |draft| {
            draft.edit_pallet(index, |p| pallet_stats::add_box(p, new_box))?;
            Ok(())
        })
        .await
    }

    pub async fn add_boxes_evenly(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        index: usize,
        input: SplitInput,
    ) -> AppResult<DraftView> {
        input.validate()?;
        let lot = lot_checked(&input.lot)?;

        self.edit(ctx, id, |draft| {
            draft.edit_pallet(index, |p| {
                pallet_stats::add_boxes_evenly(p, input.product, &lot, input.total_net_weight, input.count)
            })?;
            Ok(())
        })
        .await
    }

    pub async fn duplicate_box(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        index: usize,
        box_id: Uuid,
    ) -> AppResult<DraftView> {
        self.edit(ctx, id, |draft| {
            draft.edit_pallet(index, |p| pallet_stats::duplicate_box(p, box_id))?;
            Ok(())
        })
        .await
    }

    pub async fn edit_box(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        index: usize,
        box_id: Uuid,
        mut edit: BoxEdit,
    ) -> AppResult<DraftView> {
        if let Some(lot) = &edit.lot {
            edit.lot = Some(lot_checked(lot)?);
        }
        self.edit(ctx, id, |draft| {
            draft.edit_pallet(index, |p| pallet_stats::edit_box(p, box_id, edit))?;
            Ok(())
        })
        .await
    }

    pub async fn delete_box(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        index: usize,
        box_id: Uuid,
    ) -> AppResult<DraftView> {
        self.edit(ctx, id, |draft| {
            draft.edit_pallet(index, |p| pallet_stats::delete_box(p, box_id))?;
            Ok(())
        })
        .await
    }

    /// Set the price of a product/lot for every pallet of the draft
    pub async fn set_price(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: PriceInput,
    ) -> AppResult<DraftView> {
        let key = PriceKey::new(input.product_id, lot_checked(&input.lot)?);
        let strict = self.config.strict_price_sync;

        self.edit(ctx, id, |draft| {
            let previous = if strict {
                draft.set_price_checked(key.clone(), input.expected, input.price)?
            } else {
                draft.set_price(key.clone(), input.price)?
            };
            if let Some(previous) = previous.filter(|p| *p != input.price) {
                tracing::debug!(
                    "Draft {}: price for {} overwritten ({} -> {})",
                    id,
                    key,
                    previous,
                    input.price
                );
            }
            Ok(())
        })
        .await
    }

    // ------------------------------------------------------------------
    // Totals and submission
    // ------------------------------------------------------------------

    pub async fn totals(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Totals> {
        let drafts = self.drafts.read().await;
        Ok(owned(&drafts, ctx, id)?.totals()?.for_display())
    }

    /// Validate locally, then create the reception remotely.
    ///
    /// The draft is removed only once the inventory service accepted it.
    pub async fn submit(&self, ctx: &RequestContext, id: Uuid) -> AppResult<SubmitResult> {
        let _ticket = self.in_flight.acquire(InFlight::submit_key(id))?;

        let submission = {
            let drafts = self.drafts.read().await;
            owned(&drafts, ctx, id)?.submit()?
        };

        tracing::info!(
            "Submitting draft {}: {} entries for supplier {}",
            id,
            submission.entry_count(),
            submission.supplier()
        );
        let reception = self
            .api
            .create_reception(ctx, &submission)
            .await
            .map_err(|e| {
                tracing::warn!("Reception submission for draft {} failed: {}", id, e);
                e
            })?;

        self.drafts.write().await.remove(&id);
        tracing::info!("Draft {} created reception {}", id, reception.id);

        Ok(SubmitResult {
            reception,
            entries: submission.entry_count(),
            total_net_weight: submission.total_net_weight(),
        })
    }
}
