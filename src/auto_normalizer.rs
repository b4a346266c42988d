//! Automatic gain and DC offset correction.
//!
//! After a wave has been sampled, its peak envelope tells how far it extends
//! above and below the center line. The normalizer picks a gain that makes
//! the peak-to-peak excursion fill the graph height (capped at the maximum
//! gain) and a DC offset that moves the midline of the wave onto the center
//! of the graph.
//!
//! A single correction is enough: the excursion scales linearly with gain, so
//! sampling again with the corrected gain gives a peak-to-peak of exactly the
//! height, and a second call reports no further gain change.

use super::Float;
use super::synth_params::SynthParams;

use log::trace;

// Gains closer than this (relative) are treated as equal.
const GAIN_TOLERANCE: Float = 1.0e-9;

/// Correction computed from a peak envelope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Correction {
    pub gain: Option<Float>, // New gain, None if the current one fits
    pub dc: Float,           // New DC amplitude in control units
}

#[derive(Clone, Debug, PartialEq)]
pub struct AutoNormalizer {
    control_range: Float,
    gain_max: Float,
    default_gain: Float,
}

impl AutoNormalizer {
    pub fn new(params: &SynthParams) -> AutoNormalizer {
        let params = params.sanitized();
        AutoNormalizer {
            control_range: params.control_range,
            gain_max: params.gain_max,
            default_gain: params.default_gain,
        }
    }

    fn same_gain(a: Float, b: Float) -> bool {
        (a - b).abs() <= GAIN_TOLERANCE * a.abs().max(b.abs())
    }

    // Round to one decimal digit, without producing negative zero.
    fn round_offset(offset: Float) -> Float {
        let rounded = (offset * 10.0).round() / 10.0;
        if rounded == 0.0 {
            0.0
        } else {
            rounded
        }
    }

    /// Compute gain and DC correction for a sampled wave.
    ///
    /// peak_positive and peak_negative are the unscaled envelope of the
    /// sampler, scale_y the display scale it used. Returns None if there is
    /// nothing to normalize against (height of zero).
    ///
    /// A flat wave resets the DC offset to zero and the gain to its default.
    ///
    /// ```
    /// use fourier_synth::{AutoNormalizer, SynthParams};
    ///
    /// let normalizer = AutoNormalizer::new(&SynthParams::default());
    ///
    /// // Wave spans 100 of 400 px at gain 0.25: gain 1.0 makes it fit
    /// let correction = normalizer.normalize(50.0, -50.0, 1.0, 400.0, 0.25, 0.0).unwrap();
    /// assert_eq!(correction.gain, Some(1.0));
    /// assert_eq!(correction.dc, 0.0);
    /// ```
    pub fn normalize(&self,
                     peak_positive: Float,
                     peak_negative: Float,
                     scale_y: Float,
                     height: Float,
                     current_gain: Float,
                     current_dc: Float) -> Option<Correction> {
        if height == 0.0 {
            return None;
        }
        let peak_to_peak = scale_y * (peak_positive - peak_negative);
        let asymmetry = scale_y * (peak_positive + peak_negative);

        if peak_to_peak == 0.0 {
            trace!("Flat wave, resetting gain and offset (was {} / {})", current_gain, current_dc);
            return Some(Correction{gain: Some(self.default_gain), dc: 0.0});
        }

        let mut gain = None;
        if peak_to_peak != height {
            let candidate = (current_gain * height / peak_to_peak).min(self.gain_max);
            if !AutoNormalizer::same_gain(candidate, current_gain) {
                gain = Some(candidate);
            }
        }

        let mut offset = self.control_range * (asymmetry / height);
        if let Some(new_gain) = gain {
            // The asymmetry grows with the gain of the next pass
            offset *= new_gain / current_gain;
        }
        let dc = AutoNormalizer::round_offset(offset);

        trace!("Normalized: peak-to-peak {}, asymmetry {} -> gain {:?}, dc {}",
            peak_to_peak, asymmetry, gain, dc);
        Some(Correction{gain, dc})
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------
