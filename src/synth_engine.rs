//! Owns the state of one synthesizer instance and ties the parts together.
//!
//! A FourierSynth holds the harmonic table and the render settings. Clients
//! mutate them through the setters and call render() whenever the graph
//! needs to be redrawn. With auto-adjust enabled, render() measures the wave,
//! lets the AutoNormalizer correct gain and DC offset, and samples once more
//! with the corrected values. The second pass is marked as such and never
//! normalizes again, so an update costs at most two sampling passes.

use super::Float;
use super::auto_normalizer::{AutoNormalizer, Correction};
use super::harmonic_table::{ControlRow, HarmonicId, HarmonicTable, Labels};
use super::periodic_wave::PeriodicCoefficients;
use super::synth_config::{DisplayFlags, SynthConfig, LINE_WIDTH_MAX, LINE_WIDTH_MIN};
use super::synth_params::SynthParams;
use super::wave_sampler::{SampledWave, Viewport, WaveSampler};

use log::{debug, trace};

/// Marks whether a sampling pass may still be corrected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    Measure, // First pass of an update, may normalize
    Settle,  // Pass after a correction, never normalizes
}

/// Result of a render call.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub wave: SampledWave,
    pub correction: Option<Correction>, // Correction applied during this render
    pub passes: usize,                  // Number of sampling passes used (1 or 2)
}

pub struct FourierSynth {
    params: SynthParams,
    table: HarmonicTable,
    config: SynthConfig,
    normalizer: AutoNormalizer,
    labels: Labels,
}

impl Default for FourierSynth {
    fn default() -> Self {
        FourierSynth::new(SynthParams::default())
    }
}

impl FourierSynth {
    /// Create a synthesizer with a silent wave.
    ///
    /// ```
    /// use fourier_synth::{FourierSynth, SynthParams};
    ///
    /// let synth = FourierSynth::new(SynthParams::default());
    /// assert_eq!(synth.table().harmonic_count(), 8);
    /// assert_eq!(synth.config().periods, 3);
    /// ```
    pub fn new(params: SynthParams) -> FourierSynth {
        let params = params.sanitized();
        let table = HarmonicTable::new(&params);
        let config = SynthConfig::new(&params);
        let normalizer = AutoNormalizer::new(&params);
        FourierSynth{params, table, config, normalizer, labels: Labels::default()}
    }

    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    pub fn table(&self) -> &HarmonicTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut HarmonicTable {
        &mut self.table
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn set_labels(&mut self, labels: Labels) {
        self.labels = labels;
    }

    /// Read view of all coefficients for the controls.
    pub fn rows(&self) -> Vec<ControlRow> {
        self.table.rows(&self.labels)
    }

    pub fn set_fundamental(&mut self, hz: Float) -> Float {
        self.table.set_fundamental(hz)
    }

    pub fn set_harmonic_count(&mut self, count: usize) -> usize {
        self.table.set_harmonic_count(count)
    }

    pub fn set_max_harmonics(&mut self, max: usize) -> usize {
        self.table.set_max_harmonics(max)
    }

    pub fn set_amplitude(&mut self, id: HarmonicId, value: Float) -> Option<Float> {
        self.table.set_amplitude(id, value)
    }

    /// Set the linear gain, clamped to [0, gain_max]. Non-finite values are
    /// ignored.
    pub fn set_gain(&mut self, gain: Float) -> Float {
        if gain.is_finite() {
            self.config.gain = self.params.clamp_gain(gain);
        }
        self.config.gain
    }

    /// Set the gain from a control position in [0.0, 1.0], using the gain
    /// curve of the params.
    pub fn set_gain_position(&mut self, position: Float) -> Float {
        if !position.is_finite() {
            return self.config.gain;
        }
        let gain = self.params.gain_for_position(position);
        self.set_gain(gain)
    }

    pub fn gain_position(&self) -> Float {
        self.params.position_for_gain(self.config.gain)
    }

    pub fn set_periods(&mut self, periods: usize) -> usize {
        self.config.periods = self.params.clamp_periods(periods);
        self.config.periods
    }

    pub fn set_auto_adjust(&mut self, enabled: bool) {
        self.config.auto_adjust = enabled;
    }

    pub fn set_line_width(&mut self, width: Float) -> Float {
        if width.is_finite() {
            self.config.display.line_width = num::clamp(width, LINE_WIDTH_MIN, LINE_WIDTH_MAX);
        }
        self.config.display.line_width
    }

    pub fn display_mut(&mut self) -> &mut DisplayFlags {
        &mut self.config.display
    }

    pub fn reset_one(&mut self, id: HarmonicId) {
        self.table.reset_one(id);
    }

    /// Zero all coefficients and restore the default gain.
    pub fn reset_all(&mut self) {
        self.table.reset_all();
        self.config.gain = self.params.default_gain;
    }

    /// Coefficients for a periodic wave oscillator.
    pub fn coefficients(&self) -> PeriodicCoefficients {
        PeriodicCoefficients::from_table(&self.table)
    }

    /// Sample the wave for the given viewport.
    ///
    /// With auto-adjust enabled, the gain and DC offset are corrected and
    /// the wave is sampled a second time if anything changed.
    ///
    /// ```
    /// use fourier_synth::{FourierSynth, HarmonicId, Viewport};
    ///
    /// let mut synth = FourierSynth::default();
    /// synth.set_amplitude(HarmonicId::cos(1).unwrap(), 25.0);
    /// synth.set_auto_adjust(true);
    ///
    /// let frame = synth.render(&Viewport::new(600, 200.0));
    /// assert_eq!(frame.passes, 2);
    /// assert_eq!(synth.config().gain, 1.0);
    /// ```
    pub fn render(&mut self, viewport: &Viewport) -> Frame {
        self.render_pass(viewport, Pass::Measure)
    }

    /// Sample the wave, normalizing only if pass is Pass::Measure.
    pub fn render_pass(&mut self, viewport: &Viewport, pass: Pass) -> Frame {
        let wave = WaveSampler::sample(&self.table, &self.config, viewport);
        if !self.config.auto_adjust || pass == Pass::Settle {
            return Frame{wave, correction: None, passes: 1};
        }

        let correction = match self.normalizer.normalize(wave.peak_positive,
                                                         wave.peak_negative,
                                                         wave.scale_y,
                                                         viewport.height,
                                                         self.config.gain,
                                                         self.table.dc()) {
            Some(c) => c,
            None => return Frame{wave, correction: None, passes: 1},
        };

        if !self.apply(&correction) {
            trace!("Correction {:?} changes nothing", correction);
            return Frame{wave, correction: Some(correction), passes: 1};
        }
        let settled = self.render_pass(viewport, Pass::Settle);
        Frame{wave: settled.wave, correction: Some(correction), passes: 2}
    }

    // Apply a correction, returning true if gain or DC changed.
    fn apply(&mut self, correction: &Correction) -> bool {
        let old_gain = self.config.gain;
        let old_dc = self.table.dc();
        if let Some(gain) = correction.gain {
            self.set_gain(gain);
        }
        self.table.set_dc(correction.dc);
        let changed = self.config.gain != old_gain || self.table.dc() != old_dc;
        if changed {
            debug!("Auto-adjust: gain {} -> {}, dc {} -> {}",
                old_gain, self.config.gain, old_dc, self.table.dc());
        }
        changed
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------
