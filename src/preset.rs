//! JSON presets holding coefficients and settings of a synthesizer.
//!
//! The document has the shape
//!
//! ```json
//! {
//!     "source": "fourier_synth",
//!     "version": "0.1.0",
//!     "config": { "fundamental": 220, "gain": 0.5, "harmonics": 8, ... },
//!     "fourierData": { "cos0": 0.0, "cos1": 0.5, "sin1": 0.0, ... }
//! }
//! ```
//!
//! Coefficients are stored normalized to [-1.0, 1.0], i.e. divided by the
//! control range. Reading a preset only accepts documents with a matching
//! source and at least one coefficient. Missing config entries keep the
//! current value of the synthesizer.

use super::Float;
use super::harmonic_table::{HarmonicId, HarmonicKind};
use super::synth_engine::FourierSynth;

use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use std::collections::BTreeMap;

pub const PRESET_SOURCE: &str = env!("CARGO_PKG_NAME");
pub const PRESET_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(thiserror::Error, Debug)]
pub enum PresetError {
    #[error("malformed preset: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("not a preset of this synthesizer (source {0:?})")]
    ForeignSource(String),
    #[error("preset contains no coefficients")]
    Empty,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_adjust: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fundamental: Option<Float>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<Float>,
    #[serde(default, deserialize_with = "deserialize_count", skip_serializing_if = "Option::is_none")]
    pub harmonics: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_dividers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_endpoints: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_graph: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_grid_dots: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_offset: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<Float>,
    #[serde(default, deserialize_with = "deserialize_count", skip_serializing_if = "Option::is_none")]
    pub periods: Option<usize>,
}

// Counts may be given as any number. They are rounded, negative values become
// zero and are then clamped by the setters like every other setting.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
    where D: Deserializer<'de> {
    let value: Option<Float> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| num::clamp(v.round(), 0.0, u32::MAX as Float) as usize))
}

// Write coefficients in table order (cos0, cos1, sin1, cos2, ...), entries
// with an unknown key last.
fn serialize_in_table_order<S>(data: &BTreeMap<String, Float>, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
    let mut entries: Vec<(Option<HarmonicId>, &String, &Float)> = data.iter()
        .map(|(key, value)| (key.parse::<HarmonicId>().ok(), key, value))
        .collect();
    entries.sort_by_key(|(id, _, _)| (id.is_none(), *id));
    serializer.collect_map(entries.into_iter().map(|(_, key, value)| (key, value)))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub config: PresetConfig,
    #[serde(default, serialize_with = "serialize_in_table_order")]
    pub fourier_data: BTreeMap<String, Float>,
}

impl Preset {
    /// Capture the current state of a synthesizer.
    pub fn from_synth(synth: &FourierSynth) -> Preset {
        let table = synth.table();
        let config = synth.config();
        let range = table.control_range();
        let fourier_data = table.ids()
            .filter_map(|id| table.amplitude(id).map(|a| (id.to_string(), a / range)))
            .collect();
        Preset {
            source: PRESET_SOURCE.to_string(),
            version: PRESET_VERSION.to_string(),
            config: PresetConfig {
                auto_adjust: Some(config.auto_adjust),
                fundamental: Some(table.fundamental()),
                gain: Some(config.gain),
                harmonics: Some(table.harmonic_count()),
                hide_dividers: Some(config.display.hide_dividers),
                hide_endpoints: Some(config.display.hide_endpoints),
                hide_graph: Some(config.display.hide_graph),
                hide_grid_dots: Some(config.display.hide_grid_dots),
                hide_offset: Some(config.display.hide_offset),
                line_width: Some(config.display.line_width),
                periods: Some(config.periods),
            },
            fourier_data,
        }
    }

    /// Serialize to pretty printed JSON.
    pub fn to_json(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a preset document.
    pub fn from_json(json: &str) -> Result<Preset, PresetError> {
        let preset: Preset = serde_json::from_str(json)?;
        if preset.source != PRESET_SOURCE {
            warn!("Rejecting preset from source [{}]", preset.source);
            return Err(PresetError::ForeignSource(preset.source));
        }
        if preset.fourier_data.is_empty() {
            warn!("Rejecting preset without coefficients");
            return Err(PresetError::Empty);
        }
        Ok(preset)
    }

    // Coefficient entries with a valid key, unknown keys are skipped.
    fn coefficients(&self) -> impl Iterator<Item = (HarmonicId, Float)> + '_ {
        self.fourier_data.iter().filter_map(|(key, value)| {
            match key.parse::<HarmonicId>() {
                Ok(id) => Some((id, *value)),
                Err(_) => {
                    debug!("Skipping preset entry [{}]", key);
                    None
                }
            }
        })
    }

    /// Apply the preset to a synthesizer.
    ///
    /// The fundamental is applied first, then the harmonic count, then the
    /// coefficients. Without a count in the config, the current count is
    /// kept unless the data holds a higher harmonic. All values go through
    /// the regular setters and are clamped there.
    pub fn apply_to(&self, synth: &mut FourierSynth) {
        let config = &self.config;
        if let Some(fundamental) = config.fundamental {
            synth.set_fundamental(fundamental);
        }
        let highest = self.coefficients().map(|(id, _)| id.index()).max().unwrap_or(0);
        let current = synth.table().harmonic_count();
        let count = synth.set_harmonic_count(config.harmonics.unwrap_or_else(|| highest.max(current)));

        let range = synth.table().control_range();
        for (id, value) in self.coefficients() {
            if id.kind() != HarmonicKind::Dc && id.index() > count {
                debug!("Ignoring {}, only {} harmonics", id, count);
                continue;
            }
            synth.set_amplitude(id, value * range);
        }

        if let Some(gain) = config.gain {
            synth.set_gain(gain);
        }
        if let Some(periods) = config.periods {
            synth.set_periods(periods);
        }
        if let Some(auto_adjust) = config.auto_adjust {
            synth.set_auto_adjust(auto_adjust);
        }
        if let Some(line_width) = config.line_width {
            synth.set_line_width(line_width);
        }
        let display = synth.display_mut();
        display.hide_dividers = config.hide_dividers.unwrap_or(display.hide_dividers);
        display.hide_endpoints = config.hide_endpoints.unwrap_or(display.hide_endpoints);
        display.hide_graph = config.hide_graph.unwrap_or(display.hide_graph);
        display.hide_grid_dots = config.hide_grid_dots.unwrap_or(display.hide_grid_dots);
        display.hide_offset = config.hide_offset.unwrap_or(display.hide_offset);
        info!("Applied preset with {} coefficients, {} harmonics", self.fourier_data.len(), count);
    }
}

impl FourierSynth {
    /// Export the synthesizer state as a JSON preset.
    pub fn export_json(&self) -> Result<String, PresetError> {
        Preset::from_synth(self).to_json()
    }

    /// Load a JSON preset. Rejected documents leave the state unchanged.
    pub fn import_json(&mut self, json: &str) -> Result<(), PresetError> {
        let preset = Preset::from_json(json)?;
        preset.apply_to(self);
        Ok(())
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------
