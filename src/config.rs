//! Engine settings loaded from JSON.
//!
//! Every field is optional; anything left out keeps the engine's current
//! value. Example:
//!
//! ```json
//! {
//!   "alignment": "justify",
//!   "fit": "both",
//!   "min_scale": 0.6,
//!   "style": { "family": "Serif", "size": 11, "color": "#333333" },
//!   "definitions": { "sig": "<i>-- @1;</i>" }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::MarkupEngine;
use crate::error::Result;
use crate::factory::parse_color;
use crate::layout::{Alignment, FitStrategy, VerticalAlignment};

/// Default text style overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    pub family: Option<String>,
    pub size: Option<f32>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub alignment: Option<Alignment>,
    pub vertical: Option<VerticalAlignment>,
    pub fit: Option<FitStrategy>,
    pub tightness: Option<f32>,
    pub min_tightness: Option<f32>,
    pub max_tightness: Option<f32>,
    pub min_scale: Option<f32>,
    pub punctuation: Option<bool>,
    pub autoclose: Option<bool>,
    pub expansion_limit: Option<usize>,
    pub tab_widths: Option<Vec<f32>>,
    pub style: Option<StyleConfig>,
    /// Macro definitions added to the engine's library.
    pub definitions: BTreeMap<String, String>,
    /// Tags that expand to fixed markup.
    pub replacements: BTreeMap<String, String>,
    pub bad_box: Option<bool>,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Applies every field that is set. Stops at the first value the engine
    /// rejects.
    pub fn apply(&self, engine: &mut MarkupEngine) -> Result<()> {
        if let Some(alignment) = self.alignment {
            engine.set_alignment(alignment);
        }
        if let Some(vertical) = self.vertical {
            engine.set_vertical_alignment(vertical);
        }
        if let Some(strategy) = self.fit {
            engine.set_fit_strategy(strategy);
        }
        if let Some(tightness) = self.tightness {
            engine.set_tightness(tightness)?;
        }
        if self.min_tightness.is_some() || self.max_tightness.is_some() {
            let current = engine.fit_settings();
            let min = self.min_tightness.unwrap_or(current.min_tightness);
            let max = self.max_tightness.unwrap_or(current.max_tightness);
            engine.set_tightness_range(min, max)?;
        }
        if let Some(scale) = self.min_scale {
            engine.set_min_scale(scale)?;
        }
        if let Some(enabled) = self.punctuation {
            engine.set_punctuation_replacement(enabled);
        }
        if let Some(enabled) = self.autoclose {
            engine.set_autoclose(enabled);
        }
        if let Some(limit) = self.expansion_limit {
            engine.set_expansion_limit(limit)?;
        }
        if let Some(widths) = &self.tab_widths {
            engine.set_tab_widths(widths.clone());
        }
        if let Some(style) = &self.style {
            let mut default = engine.default_style().clone();
            if let Some(family) = &style.family {
                default.family.clone_from(family);
            }
            if let Some(size) = style.size.filter(|s| *s > 0.0) {
                default.size = size;
            }
            if let Some(color) = &style.color {
                match parse_color(color) {
                    Some(parsed) => default.foreground = parsed,
                    None => tracing::warn!(color = %color, "ignoring unparsable default colour"),
                }
            }
            engine.set_default_style(default);
        }
        for (name, template) in &self.definitions {
            engine.define(name, template.clone());
        }
        for (tag, template) in &self.replacements {
            engine.set_replacement_for_tag(tag, template)?;
        }
        if let Some(enabled) = self.bad_box {
            engine.set_bad_box_diagnostics(enabled);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
