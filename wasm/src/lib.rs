//! WebAssembly module for the cold storage inventory editor
//!
//! Provides client-side computation for:
//! - Net weight of reception lines
//! - Line totals
//! - Pallet aggregates and availability
//! - Even weight splits across boxes
//!
//! Decimal values cross the boundary as strings and structured values as
//! JSON, so browser and server round the same way.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{Availability, ReceptionDetail};

fn parse_decimal(value: &str, what: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|e| format!("Invalid {}: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn compute_net_weight(gross: &str, boxes: u32, tare_code: &str) -> Result<String, String> {
    let gross = parse_decimal(gross, "gross weight")?;
    shared::net_weight_for_code(gross, boxes, tare_code)
        .map(|net| net.to_string())
        .map_err(|e| e.to_string())
}

fn compute_line_totals(lines_json: &str) -> Result<String, String> {
    let lines: Vec<ReceptionDetail> =
        serde_json::from_str(lines_json).map_err(|e| format!("Invalid lines JSON: {}", e))?;
    let mut summary = shared::summarize_lines(&lines).map_err(|e| e.to_string())?;
    summary.totals = summary.totals.for_display();
    to_json(&summary)
}

fn compute_pallet(pallet_json: &str) -> Result<Pallet, String> {
    // Deserializing recomputes the aggregates from the boxes
    serde_json::from_str(pallet_json).map_err(|e| format!("Invalid pallet JSON: {}", e))
}

fn js_error(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    js_sys::Error::new(&message).into()
}

fn compute_split(total: &str, count: u32) -> Result<String, String> {
    let total = parse_decimal(total, "total weight")?;
    let parts = shared::split_evenly(total, count).map_err(|e| e.to_string())?;
    to_json(&parts)
}

/// Net weight of a reception line: `gross - boxes × tare`
#[wasm_bindgen]
pub fn net_weight(gross: &str, boxes: u32, tare_code: &str) -> Result<String, JsValue> {
    compute_net_weight(gross, boxes, tare_code).map_err(js_error)
}

/// Per-line net weights and `{ totalKg, totalAmount }` of a line list
#[wasm_bindgen]
pub fn line_totals(lines_json: &str) -> Result<String, JsValue> {
    compute_line_totals(lines_json).map_err(js_error)
}

/// Pallet with box count and net weight recomputed from its boxes
#[wasm_bindgen]
pub fn recalculate_pallet(pallet_json: &str) -> Result<String, JsValue> {
    compute_pallet(pallet_json)
        .and_then(|pallet| to_json(&pallet))
        .map_err(js_error)
}

/// Available box count and net weight of a pallet
#[wasm_bindgen]
pub fn pallet_availability(pallet_json: &str) -> Result<String, JsValue> {
    compute_pallet(pallet_json)
        .and_then(|pallet| to_json(&pallet.availability()))
        .map_err(js_error)
}

/// Box weights for `count` boxes sharing `total`; they sum exactly to it
#[wasm_bindgen]
pub fn split_weight(total: &str, count: u32) -> Result<String, JsValue> {
    compute_split(total, count).map_err(js_error)
}

/// Whether a lot code would be accepted
#[wasm_bindgen]
pub fn is_valid_lot(lot: &str) -> bool {
    validate_lot(lot.trim()).is_ok()
}
