use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{Document, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, Window};

use crate::config::{FadeInConfig, ScrollConfig};
use crate::dom;
use crate::error::{EffectsError, Installed};

const TOP_BAR: &str = ".credibility-bar";
const SCROLLED_CLASS: &str = "scrolled";
const FADE_TARGETS: [&str; 2] = [".discussion-section-fb", ".discussion-section"];
const VISIBLE_CLASS: &str = "visible";

pub fn is_scrolled(offset: f64, threshold: f64) -> bool {
    offset > threshold
}

/// Re-evaluated on every scroll event, in both directions.
pub fn install_top_bar(
    document: &Document,
    window: &Window,
    config: &ScrollConfig,
) -> Result<Installed, EffectsError> {
    let Some(bar) = dom::query(document, TOP_BAR)? else {
        return Ok(Installed::Skipped);
    };

    let threshold = config.top_bar_threshold;
    let update = {
        let window = window.clone();
        move || {
            if let Ok(offset) = window.scroll_y() {
                let _ = bar
                    .class_list()
                    .toggle_with_force(SCROLLED_CLASS, is_scrolled(offset, threshold));
            }
        }
    };

    // Page may be restored mid-scroll
    update();
    dom::listen(window, "scroll", move |_| update())?;

    log::info!("Top bar scroll toggle set at {}px", threshold);
    Ok(Installed::Yes)
}

/// Opens once. Leaving and re-entering the viewport afterwards changes nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FadeGate {
    revealed: bool,
}

impl FadeGate {
    /// Returns true only for the first intersecting notification.
    pub fn reveal(&mut self, intersecting: bool) -> bool {
        if intersecting && !self.revealed {
            self.revealed = true;
            return true;
        }
        false
    }
}

pub fn install_fade_in(document: &Document, config: &FadeInConfig) -> Result<Installed, EffectsError> {
    let mut target = None;
    for selector in FADE_TARGETS {
        target = dom::query(document, selector)?;
        if target.is_some() {
            break;
        }
    }
    let Some(target) = target else {
        return Ok(Installed::Skipped);
    };
    let Some(section) = dom::as_html(&target) else {
        return Ok(Installed::Skipped);
    };

    let transition = format!(
        "opacity {0}s ease-out, transform {0}s ease-out",
        config.duration_secs
    );
    dom::set_styles(&section, &[("transition", transition.as_str())])?;
    if !target.class_list().contains(VISIBLE_CLASS) {
        let offset = format!("translateY({}px)", config.offset_px);
        dom::set_styles(&section, &[("opacity", "0"), ("transform", offset.as_str())])?;
    }

    let mut gate = FadeGate::default();
    let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            if !gate.reveal(entry.is_intersecting()) {
                continue;
            }
            let target = entry.target();
            if let Some(section) = dom::as_html(&target) {
                let _ = dom::set_styles(&section, &[("opacity", "1"), ("transform", "translateY(0)")]);
            }
            observer.unobserve(&target);
            log::debug!("Discussion section faded in");
        }
    }) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let options = IntersectionObserverInit::new();
    options.set_root_margin("0px");
    options.set_threshold(&JsValue::from_f64(config.threshold));
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
    observer.observe(&target);
    callback.forget();

    log::info!("Fade-in armed at {}% visibility", config.threshold * 100.0);
    Ok(Installed::Yes)
}
