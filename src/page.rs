use web_sys::{Document, Window};

use crate::config::PageConfig;
use crate::effects::{anchors, discussion, scroll, viewers};
use crate::error::{EffectsError, Installed};

const LOADED_CLASS: &str = "loaded";

pub struct PageEffects {
    window: Window,
    document: Document,
    config: PageConfig,
}

impl PageEffects {
    pub fn new(window: Window, document: Document) -> Self {
        let config = PageConfig::load(&document);
        Self {
            window,
            document,
            config,
        }
    }

    /// Installs every behavior. One failing never blocks the rest.
    pub fn install(&self) {
        if let Some(body) = self.document.body() {
            let _ = body.class_list().add_1(LOADED_CLASS);
        }

        report(
            "top bar",
            scroll::install_top_bar(&self.document, &self.window, &self.config.scroll),
        );
        report(
            "fade-in",
            scroll::install_fade_in(&self.document, &self.config.fade_in),
        );
        report("discussion", discussion::install(&self.document));
        report(
            "viewer counter",
            viewers::install(&self.document, &self.config.viewers),
        );
        report(
            "anchor scrolling",
            anchors::install(&self.document, &self.config.anchors),
        );
    }
}

fn report(name: &str, result: Result<Installed, EffectsError>) {
    match result {
        Ok(Installed::Yes) => {}
        Ok(Installed::Skipped) => log::debug!("{}: no matching elements, skipped", name),
        Err(e) => log::warn!("{}: failed to install: {}", name, e),
    }
}
