//! Reception intake: the two entry modes and their submission
//!
//! A draft is either in automatic mode (itemized lines) or manual mode
//! (pallets of boxes). Leaving a mode that holds data needs an explicit
//! confirmation and discards that mode's data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::{
    AutomaticSubmission, ManualSubmission, Pallet, ReceptionDetail, ReceptionHeader,
    ReceptionSubmission, SubmittedBox, SubmittedDetail, SubmittedPallet,
};
use crate::pricing::{PriceKey, PriceRegistry};
use crate::types::{IdRef, Totals};
use crate::validation::validate_header;
use crate::weight::{summarize_lines, TareCode};

/// Intake workflow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntakeMode {
    /// Line based
    Automatic,
    /// Pallet based
    Manual,
}

impl std::fmt::Display for IntakeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeMode::Automatic => write!(f, "automatic"),
            IntakeMode::Manual => write!(f, "manual"),
        }
    }
}

/// Outcome of asking for a mode change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModeSwitch {
    /// Already in the requested mode
    Unchanged,
    /// Nothing to lose; the mode changed immediately
    Switched,
    /// Data would be discarded; waiting for confirm or cancel
    ConfirmationRequired,
}

/// Reception being entered by one operator
#[derive(Debug, Clone, PartialEq)]
pub struct ReceptionDraft {
    pub header: ReceptionHeader,
    mode: IntakeMode,
    details: Vec<ReceptionDetail>,
    pallets: Vec<Pallet>,
    prices: PriceRegistry,
    pending_switch: Option<IntakeMode>,
    default_tare: TareCode,
}

impl Default for ReceptionDraft {
    fn default() -> Self {
        Self::new(TareCode::default())
    }
}

impl ReceptionDraft {
    /// Automatic mode with exactly one empty line
    pub fn new(default_tare: TareCode) -> Self {
        Self {
            header: ReceptionHeader::default(),
            mode: IntakeMode::Automatic,
            details: vec![ReceptionDetail::empty(default_tare)],
            pallets: Vec::new(),
            prices: PriceRegistry::new(),
            pending_switch: None,
            default_tare,
        }
    }

    pub fn mode(&self) -> IntakeMode {
        self.mode
    }

    pub fn details(&self) -> &[ReceptionDetail] {
        &self.details
    }

    pub fn pallets(&self) -> &[Pallet] {
        &self.pallets
    }

    pub fn prices(&self) -> &PriceRegistry {
        &self.prices
    }

    pub fn pending_switch(&self) -> Option<IntakeMode> {
        self.pending_switch
    }

    /// Whether leaving `mode` would lose anything
    pub fn has_data_in(&self, mode: IntakeMode) -> bool {
        match mode {
            IntakeMode::Automatic => {
                self.details.len() > 1 || self.details.iter().any(ReceptionDetail::has_data)
            }
            IntakeMode::Manual => !self.pallets.is_empty(),
        }
    }

    // ------------------------------------------------------------------
    // Mode switching
    // ------------------------------------------------------------------

    pub fn request_mode(&mut self, target: IntakeMode) -> ModeSwitch {
        if target == self.mode {
            self.pending_switch = None;
            return ModeSwitch::Unchanged;
        }
        if self.has_data_in(self.mode) {
            self.pending_switch = Some(target);
            return ModeSwitch::ConfirmationRequired;
        }
        self.enter(target);
        ModeSwitch::Switched
    }

    /// Discard the data of the current mode and enter the pending one
    pub fn confirm_mode_switch(&mut self) -> CoreResult<IntakeMode> {
        let target = self
            .pending_switch
            .take()
            .ok_or(CoreError::NoPendingModeSwitch)?;
        self.discard(self.mode);
        self.enter(target);
        Ok(target)
    }

    pub fn cancel_mode_switch(&mut self) -> CoreResult<()> {
        self.pending_switch
            .take()
            .map(|_| ())
            .ok_or(CoreError::NoPendingModeSwitch)
    }

    fn discard(&mut self, mode: IntakeMode) {
        match mode {
            IntakeMode::Automatic => {
                self.details = vec![ReceptionDetail::empty(self.default_tare)];
            }
            IntakeMode::Manual => {
                self.pallets.clear();
                self.prices.clear();
            }
        }
    }

    fn enter(&mut self, mode: IntakeMode) {
        self.mode = mode;
        if mode == IntakeMode::Automatic && self.details.is_empty() {
            self.details.push(ReceptionDetail::empty(self.default_tare));
        }
    }

    fn require(&self, expected: IntakeMode) -> CoreResult<()> {
        if self.mode != expected {
            return Err(CoreError::WrongMode { expected });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Automatic mode: lines
    // ------------------------------------------------------------------

    /// Append an empty line, returning its index
    pub fn add_line(&mut self) -> CoreResult<usize> {
        self.require(IntakeMode::Automatic)?;
        self.details.push(ReceptionDetail::empty(self.default_tare));
        Ok(self.details.len() - 1)
    }

    /// Replace a line; rejects lines whose net weight would be negative
    pub fn update_line(&mut self, index: usize, line: ReceptionDetail) -> CoreResult<()> {
        self.require(IntakeMode::Automatic)?;
        line.net_weight()?;
        if let Some(price) = line.price.filter(|p| *p < Decimal::ZERO) {
            return Err(CoreError::InvalidLinePrice { line: index, price });
        }
        let slot = self
            .details
            .get_mut(index)
            .ok_or_else(|| CoreError::NotFound(format!("Line {}", index)))?;
        *slot = line;
        Ok(())
    }

    /// Remove a line; the list never drops below one (empty) line
    pub fn remove_line(&mut self, index: usize) -> CoreResult<()> {
        self.require(IntakeMode::Automatic)?;
        if index >= self.details.len() {
            return Err(CoreError::NotFound(format!("Line {}", index)));
        }
        self.details.remove(index);
        if self.details.is_empty() {
            self.details.push(ReceptionDetail::empty(self.default_tare));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Manual mode: pallets and prices
    // ------------------------------------------------------------------

    /// Append a pallet, returning its index
    pub fn add_pallet(&mut self, pallet: Pallet) -> CoreResult<usize> {
        self.require(IntakeMode::Manual)?;
        self.pallets.push(pallet);
        Ok(self.pallets.len() - 1)
    }

    pub fn pallet(&self, index: usize) -> CoreResult<&Pallet> {
        self.pallets
            .get(index)
            .ok_or_else(|| CoreError::NotFound(format!("Pallet {}", index)))
    }

    pub fn remove_pallet(&mut self, index: usize) -> CoreResult<Pallet> {
        self.require(IntakeMode::Manual)?;
        self.pallet(index)?.ensure_structurally_editable()?;
        Ok(self.pallets.remove(index))
    }

    /// Insert a structural copy right after the pallet, returning its index
    pub fn clone_pallet(&mut self, index: usize) -> CoreResult<usize> {
        self.require(IntakeMode::Manual)?;
        let copy = self.pallet(index)?.clone_structure()?;
        self.pallets.insert(index + 1, copy);
        Ok(index + 1)
    }

    /// Apply a box mutation to one pallet; the draft only changes on success
    pub fn edit_pallet<F>(&mut self, index: usize, mutation: F) -> CoreResult<&Pallet>
    where
        F: FnOnce(Pallet) -> CoreResult<Pallet>,
    {
        self.require(IntakeMode::Manual)?;
        let updated = mutation(self.pallet(index)?.clone())?;
        let slot = &mut self.pallets[index];
        *slot = updated;
        Ok(slot)
    }

    /// Last-write-wins price update shared by all pallets
    pub fn set_price(&mut self, key: PriceKey, price: Decimal) -> CoreResult<Option<Decimal>> {
        self.require(IntakeMode::Manual)?;
        self.prices.update_price(key, price)
    }

    /// Price update rejected when someone else changed the price meanwhile
    pub fn set_price_checked(
        &mut self,
        key: PriceKey,
        expected: Option<Decimal>,
        price: Decimal,
    ) -> CoreResult<Option<Decimal>> {
        self.require(IntakeMode::Manual)?;
        self.prices.compare_and_set(key, expected, price)
    }

    // ------------------------------------------------------------------
    // Totals and submission
    // ------------------------------------------------------------------

    /// Weight and amount of the active mode's data
    pub fn totals(&self) -> CoreResult<Totals> {
        match self.mode {
            IntakeMode::Automatic => Ok(summarize_lines(&self.details)?.totals),
            IntakeMode::Manual => Ok(Totals {
                total_kg: self.pallets.iter().map(Pallet::net_weight).sum(),
                total_amount: self.prices.total_amount(&self.pallets),
            }),
        }
    }

    /// Validate and build the payload for the active mode
    pub fn submit(&self) -> CoreResult<ReceptionSubmission> {
        if let Some(pending) = self.pending_switch {
            return Err(CoreError::ModeSwitchPending(pending));
        }
        let (supplier, date) = validate_header(&self.header)?;
        let supplier = IdRef::new(supplier);
        let notes = self.header.notes.trim().to_string();

        match self.mode {
            IntakeMode::Automatic => Ok(ReceptionSubmission::Automatic(AutomaticSubmission {
                supplier,
                date,
                notes,
                details: self.submitted_details()?,
            })),
            IntakeMode::Manual => {
                let pallets = self.submitted_pallets()?;
                Ok(ReceptionSubmission::Manual(ManualSubmission {
                    supplier,
                    date,
                    notes,
                    prices: self.prices.resolve(&self.pallets),
                    pallets,
                }))
            }
        }
    }

    /// Lines with a product and a positive net weight; others are dropped
    fn submitted_details(&self) -> CoreResult<Vec<SubmittedDetail>> {
        let mut details = Vec::new();
        for line in &self.details {
            let net = line.net_weight()?;
            if let (Some(product), Some(net)) = (&line.product, net) {
                if net > Decimal::ZERO {
                    let lot = line.lot.trim();
                    details.push(SubmittedDetail {
                        product: IdRef::new(product.id),
                        net_weight: net,
                        boxes: line.boxes.unwrap_or(0),
                        price: line.price,
                        lot: (!lot.is_empty()).then(|| lot.to_string()),
                    });
                }
            }
        }
        if details.is_empty() {
            return Err(CoreError::NoValidEntries);
        }
        Ok(details)
    }

    /// Non-empty pallets; every box must have a product
    fn submitted_pallets(&self) -> CoreResult<Vec<SubmittedPallet>> {
        let mut pallets = Vec::new();
        let mut has_weight = false;

        for (pallet_index, pallet) in self.pallets.iter().enumerate() {
            if pallet.boxes().is_empty() {
                continue;
            }
            let mut boxes = Vec::with_capacity(pallet.number_of_boxes());
            for (box_index, b) in pallet.boxes().iter().enumerate() {
                let product = b.product.as_ref().ok_or(CoreError::BoxWithoutProduct {
                    pallet_index,
                    box_index,
                })?;
                boxes.push(SubmittedBox {
                    product: IdRef::new(product.id),
                    lot: b.lot.trim().to_string(),
                    net_weight: b.net_weight,
                    gross_weight: b.gross_weight,
                });
            }
            has_weight |= pallet.net_weight() > Decimal::ZERO;
            pallets.push(SubmittedPallet {
                observations: pallet.observations.clone(),
                boxes,
            });
        }

        if !has_weight {
            return Err(CoreError::NoValidEntries);
        }
        Ok(pallets)
    }
}
