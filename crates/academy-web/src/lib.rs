//! Academy Web Frontend
//!
//! Leptos-based WASM sign-up page driven by the checkout coordinator.

mod app;
mod browser;
mod components;
mod presenter;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    leptos::mount::mount_to_body(App);
}
