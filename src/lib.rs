/// Site Time Guard - Browser Extension for Daily Site Time Limits
/// Built with Rust + WASM + Yew

pub mod background;
pub mod bridge;
pub mod config;
pub mod content;
pub mod domain;
pub mod error;
pub mod operations;
pub mod protocol;
mod runtime;
pub mod storage;
pub mod tab_data;
pub mod ui;

#[cfg(test)]
mod testing;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export domain resolution for JavaScript access
#[wasm_bindgen]
pub fn extract_domain(url: &str) -> String {
    domain::domain_from_url(url).unwrap_or_else(|| "invalid".to_string())
}

// Start the background process (service worker / event page)
#[wasm_bindgen]
pub fn start_background() {
    runtime::start_background(config::Config::default());
}

// Start the content script for the current page
#[wasm_bindgen]
pub fn start_content() {
    runtime::start_content();
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
