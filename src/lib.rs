//! Macaron quiz core crate.
//!
//! Multiple-choice quiz rendered on a full-window canvas, fed by a
//! `questions.csv` bank fetched at load time. Correct answers and the result
//! screen trigger confetti and firework effects. `start_quiz()` mounts the
//! whole thing; the parser, particle engine and RNG are plain Rust modules
//! that also compile natively for tests.

use wasm_bindgen::prelude::*;

pub mod csv;
pub mod fx;
pub mod rng;

mod quiz;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Entry point called from the host page once the module is loaded.
#[wasm_bindgen]
pub fn start_quiz() -> Result<(), JsValue> {
    quiz::start()
}
