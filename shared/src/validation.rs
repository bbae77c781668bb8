//! Input validation for reception entry
//!
//! Plain checks return `Result<(), &'static str>` so callers can wrap them in
//! whatever error type their layer uses.

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};
use crate::ids::SupplierId;
use crate::models::ReceptionHeader;

/// Longest lot code accepted on a box or line
pub const MAX_LOT_LENGTH: usize = 50;

/// Longest free-text notes/observations accepted
pub const MAX_NOTES_LENGTH: usize = 1000;

// ============================================================================
// Field checks
// ============================================================================

/// Lot codes are short printable labels
pub fn validate_lot(lot: &str) -> Result<(), &'static str> {
    if lot.chars().count() > MAX_LOT_LENGTH {
        return Err("Lot code is too long");
    }
    if lot.chars().any(char::is_control) {
        return Err("Lot code contains control characters");
    }
    Ok(())
}

pub fn validate_notes(notes: &str) -> Result<(), &'static str> {
    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err("Notes are too long");
    }
    Ok(())
}

/// Reception dates are exchanged as `YYYY-MM-DD`
pub fn parse_reception_date(value: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidDate(value.to_string()))
}

// ============================================================================
// Header
// ============================================================================

/// Supplier first, then date; returns both once present
pub fn validate_header(header: &ReceptionHeader) -> CoreResult<(SupplierId, NaiveDate)> {
    let supplier = header.supplier.ok_or(CoreError::MissingSupplier)?;
    let date = header.date.ok_or(CoreError::MissingDate)?;
    Ok((supplier, date))
}
