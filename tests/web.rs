//! Browser-only checks, run with `wasm-pack test --headless --firefox`
#![cfg(target_arch = "wasm32")]

use site_time_guard::bridge::{from_js, to_js};
use site_time_guard::extract_domain;
use site_time_guard::storage::{StatePatch, StoredState, Usage};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn extract_domain_from_js() {
    assert_eq!(extract_domain("https://m.youtube.com/watch"), "youtube.com");
    assert_eq!(extract_domain("about:blank"), "invalid");
}

#[wasm_bindgen_test]
fn stored_state_crosses_as_plain_objects() {
    let mut state = StoredState::seeded("2024-05-01", &Default::default());
    state.record_minute("2024-05-01", "youtube.com");

    let value = to_js("stored state", &state).unwrap();
    let usage = js_sys::Reflect::get(&value, &JsValue::from_str("usage")).unwrap();
    assert!(!usage.is_instance_of::<js_sys::Map>());

    let back: StoredState = from_js("stored state", value).unwrap();
    assert_eq!(back.used("2024-05-01", "youtube.com"), 1);
}

#[wasm_bindgen_test]
fn empty_patch_fields_are_omitted() {
    let patch = StatePatch {
        usage: Some(Usage::new()),
        ..Default::default()
    };

    let value = to_js("state patch", &patch).unwrap();

    assert!(js_sys::Reflect::has(&value, &JsValue::from_str("usage")).unwrap());
    assert!(!js_sys::Reflect::has(&value, &JsValue::from_str("limits")).unwrap());
}
