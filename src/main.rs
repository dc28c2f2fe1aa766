use log::info;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

mod config;
mod dom;
mod error;
mod page;
mod effects {
    pub mod anchors;
    pub mod discussion;
    pub mod scroll;
    pub mod viewers;
}

use error::EffectsError;
use page::PageEffects;

fn start() -> Result<(), EffectsError> {
    let window = dom::window()?;
    let document = dom::document()?;

    if document.ready_state() == "loading" {
        let ready = Closure::once(move || {
            PageEffects::new(window, document).install();
        });
        dom::document()?.add_event_listener_with_callback(
            "DOMContentLoaded",
            ready.as_ref().unchecked_ref(),
        )?;
        ready.forget();
    } else {
        PageEffects::new(window, document).install();
    }
    Ok(())
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting page effects");
    if let Err(e) = start() {
        log::warn!("Page effects disabled: {}", e);
    }
}
