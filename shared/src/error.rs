//! Errors raised by the consolidation core
//!
//! Every variant is a local rejection: the operator corrects the input and
//! retries. None of them involve the network.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::ids::{OrderId, PalletId, PositionId, StoreId};
use crate::pricing::PriceKey;
use crate::reception::IntakeMode;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Unknown tare code: {0}")]
    UnknownTareCode(String),

    #[error("Invalid weight: {0}")]
    InvalidWeight(String),

    #[error("Invalid price for {key}: {price}")]
    InvalidPrice { key: PriceKey, price: Decimal },

    #[error("Line {line} has a negative price: {price}")]
    InvalidLinePrice { line: usize, price: Decimal },

    #[error("A supplier must be selected")]
    MissingSupplier,

    #[error("A reception date must be set")]
    MissingDate,

    #[error("Invalid reception date: {0}")]
    InvalidDate(String),

    #[error("At least one line or pallet needs a product and a positive net weight")]
    NoValidEntries,

    #[error("Box {box_index} of pallet {pallet_index} has no product")]
    BoxWithoutProduct {
        pallet_index: usize,
        box_index: usize,
    },

    #[error("Pallet is read-only: {0}")]
    ReadOnlyPallet(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Price for {key} changed concurrently (expected {expected:?}, found {actual:?})")]
    PriceConflict {
        key: PriceKey,
        expected: Option<Decimal>,
        actual: Option<Decimal>,
    },

    #[error("Pallet {pallet} is already linked to order {order}")]
    AlreadyLinked { pallet: PalletId, order: OrderId },

    #[error("Position {position} does not belong to store {store}")]
    UnknownPosition { store: StoreId, position: PositionId },

    #[error("Pallet {pallet} is not held by store {store}")]
    PalletNotInStore { store: StoreId, pallet: PalletId },

    #[error("A switch to {0} mode is waiting for confirmation")]
    ModeSwitchPending(IntakeMode),

    #[error("No mode switch is waiting for confirmation")]
    NoPendingModeSwitch,

    #[error("Operation requires {expected} mode")]
    WrongMode { expected: IntakeMode },
}

impl CoreError {
    /// Input field the error refers to, when there is one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            CoreError::UnknownTareCode(_) => Some("tare"),
            CoreError::InvalidWeight(_) => Some("netWeight"),
            CoreError::InvalidPrice { .. } | CoreError::InvalidLinePrice { .. } => Some("price"),
            CoreError::MissingSupplier => Some("supplier"),
            CoreError::MissingDate | CoreError::InvalidDate(_) => Some("date"),
            CoreError::BoxWithoutProduct { .. } => Some("product"),
            _ => None,
        }
    }

    /// True for plain input mistakes, false for state/transition rejections
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::UnknownTareCode(_)
                | CoreError::InvalidWeight(_)
                | CoreError::InvalidPrice { .. }
                | CoreError::InvalidLinePrice { .. }
                | CoreError::MissingSupplier
                | CoreError::MissingDate
                | CoreError::InvalidDate(_)
                | CoreError::NoValidEntries
                | CoreError::BoxWithoutProduct { .. }
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
