use log::Level;
use serde::Deserialize;
use web_sys::Document;

use crate::error::EffectsError;

/// Id of the optional `<script type="application/json">` block carrying overrides.
pub const CONFIG_ELEMENT_ID: &str = "page-effects-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose while running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub viewers: ViewerConfig,
    pub scroll: ScrollConfig,
    pub fade_in: FadeInConfig,
    pub anchors: AnchorConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub min_viewers: u32,
    pub max_viewers: u32,
    pub min_delay_ms: u32,
    pub max_delay_ms: u32,
    pub max_step: u32,
    pub boundary_jitter: u32,
    pub label: String,
    /// Fixed RNG seed. When unset a fresh one is drawn from the browser's entropy source.
    pub seed: Option<u64>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_viewers: 572,
            max_viewers: 603,
            min_delay_ms: 6_000,
            max_delay_ms: 12_000,
            max_step: 3,
            boundary_jitter: 2,
            label: "viewers currently inside this private presentation".to_string(),
            seed: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub top_bar_threshold: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self { top_bar_threshold: 100.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FadeInConfig {
    pub threshold: f64,
    pub offset_px: u32,
    pub duration_secs: f64,
}

impl Default for FadeInConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            offset_px: 20,
            duration_secs: 0.6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Fragments that keep the browser's default navigation (e.g. external checkout links).
    pub reserved: Vec<String>,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            reserved: vec!["#checkout".to_string()],
        }
    }
}

impl PageConfig {
    pub fn from_json(raw: &str) -> Result<Self, EffectsError> {
        let config: PageConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EffectsError> {
        let v = &self.viewers;
        if v.min_viewers > v.max_viewers {
            return Err(EffectsError::InvalidConfig(format!(
                "viewers.min_viewers ({}) exceeds viewers.max_viewers ({})",
                v.min_viewers, v.max_viewers
            )));
        }
        if v.min_delay_ms > v.max_delay_ms {
            return Err(EffectsError::InvalidConfig(format!(
                "viewers.min_delay_ms ({}) exceeds viewers.max_delay_ms ({})",
                v.min_delay_ms, v.max_delay_ms
            )));
        }
        if v.max_step == 0 {
            return Err(EffectsError::InvalidConfig(
                "viewers.max_step must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.fade_in.threshold) {
            return Err(EffectsError::InvalidConfig(format!(
                "fade_in.threshold ({}) must be within [0, 1]",
                self.fade_in.threshold
            )));
        }
        Ok(())
    }

    /// Reads overrides from the page, falling back to defaults when the block is
    /// missing or rejected.
    pub fn load(document: &Document) -> Self {
        let raw = match document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|element| element.text_content())
        {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => {
                log::debug!("No #{} block, using default configuration", CONFIG_ELEMENT_ID);
                return Self::default();
            }
        };

        match Self::from_json(&raw) {
            Ok(config) => {
                log::info!("Loaded page configuration overrides");
                config
            }
            Err(e) => {
                log::warn!("Ignoring page configuration: {}", e);
                Self::default()
            }
        }
    }
}
