//! Carbon Market Web Frontend
//!
//! Leptos-based WASM front end: session restore, route guard, wallet
//! top-up and the payment-gateway return page.

mod app;
mod components;
mod pages;
mod state;
mod storage;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
