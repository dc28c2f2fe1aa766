use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, Window};

use crate::error::EffectsError;

pub fn window() -> Result<Window, EffectsError> {
    web_sys::window().ok_or(EffectsError::NoGlobal("window"))
}

pub fn document() -> Result<Document, EffectsError> {
    window()?
        .document()
        .ok_or(EffectsError::NoGlobal("document"))
}

pub fn query(document: &Document, selector: &str) -> Result<Option<Element>, EffectsError> {
    Ok(document.query_selector(selector)?)
}

pub fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>, EffectsError> {
    let nodes = document.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

pub fn as_html(element: &Element) -> Option<HtmlElement> {
    element.dyn_ref::<HtmlElement>().cloned()
}

/// Attaches `handler` for the rest of the page session.
pub fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), EffectsError>
where
    F: FnMut(Event) + 'static,
{
    let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

pub fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), EffectsError> {
    let style = element.style();
    for (property, value) in styles {
        style.set_property(property, value)?;
    }
    Ok(())
}
