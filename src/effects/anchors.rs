use web_sys::{Document, ScrollBehavior, ScrollIntoViewOptions};

use crate::config::AnchorConfig;
use crate::dom;
use crate::error::{EffectsError, Installed};

const IN_PAGE_LINKS: &str = r##"a[href^="#"]"##;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnchorAction<'a> {
    /// Let the browser navigate as usual.
    PassThrough,
    /// Suppress the jump and smooth-scroll to the element with this id, if any.
    ScrollTo(&'a str),
    /// Suppress the jump, there is nothing to scroll to.
    Suppress,
}

pub fn classify<'a>(href: &'a str, reserved: &[String]) -> AnchorAction<'a> {
    if reserved.iter().any(|r| r == href) {
        return AnchorAction::PassThrough;
    }
    match href.strip_prefix('#') {
        Some("") => AnchorAction::Suppress,
        Some(id) => AnchorAction::ScrollTo(id),
        None => AnchorAction::PassThrough,
    }
}

fn scroll_to(document: &Document, id: &str) {
    let Some(target) = document.get_element_by_id(id) else {
        log::debug!("Anchor target #{} not found", id);
        return;
    };
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    target.scroll_into_view_with_scroll_into_view_options(&options);
}

pub fn install(document: &Document, config: &AnchorConfig) -> Result<Installed, EffectsError> {
    let links = dom::query_all(document, IN_PAGE_LINKS)?;
    if links.is_empty() {
        return Ok(Installed::Skipped);
    }

    let count = links.len();
    for link in links {
        let document = document.clone();
        let reserved = config.reserved.clone();
        let anchor = link.clone();
        dom::listen(&link, "click", move |event| {
            let href = anchor.get_attribute("href").unwrap_or_default();
            match classify(&href, &reserved) {
                AnchorAction::PassThrough => {}
                AnchorAction::Suppress => event.prevent_default(),
                AnchorAction::ScrollTo(id) => {
                    event.prevent_default();
                    scroll_to(&document, id);
                }
            }
        })?;
    }

    log::info!("Smooth scrolling bound to {} anchor links", count);
    Ok(Installed::Yes)
}
