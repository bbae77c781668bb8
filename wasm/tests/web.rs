//! Browser tests for the exported bindings, run with `wasm-pack test --headless`

#![cfg(target_arch = "wasm32")]

use coldstore_wasm::{net_weight, pallet_availability, split_weight};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn net_weight_crosses_the_boundary_as_string() {
    assert_eq!(net_weight("27.50", 2, "3").unwrap(), "21.50");
}

#[wasm_bindgen_test]
fn bad_tare_code_becomes_js_error() {
    let err = net_weight("27.50", 2, "7").unwrap_err();
    assert!(err.is_instance_of::<js_sys::Error>());
}

#[wasm_bindgen_test]
fn availability_skips_unavailable_boxes() {
    let pallet = r#"{"boxes": [
        {"netWeight": "5.0", "isAvailable": false},
        {"netWeight": "3.2"},
        {"netWeight": "1.8"}
    ]}"#;
    let report: serde_json::Value =
        serde_json::from_str(&pallet_availability(pallet).unwrap()).unwrap();
    assert_eq!(report["boxCount"], 2);
    assert_eq!(report["netWeight"], "5.0");
}

#[wasm_bindgen_test]
fn split_weight_rejects_zero_boxes() {
    assert!(split_weight("10", 0).is_err());
}
