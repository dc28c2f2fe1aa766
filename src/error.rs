use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum EffectsError {
    #[error("browser global `{0}` is unavailable")]
    NoGlobal(&'static str),
    #[error("JavaScript call failed: {0}")]
    Js(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl From<JsValue> for EffectsError {
    fn from(value: JsValue) -> Self {
        EffectsError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

/// Outcome of installing one behavior on the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Installed {
    Yes,
    /// The behavior's elements are not on this page.
    Skipped,
}
