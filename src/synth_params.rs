//! Parameters distinguishing the different flavours of the synthesizer.
//!
//! All variants share the same sampling and normalization code. What differs
//! between them is collected here: the control range of the amplitude
//! sliders, the gain ceiling and its control curve, the number of periods
//! that can be shown and the ceiling on the number of harmonics.

use super::Float;

/// Absolute ceiling for the configurable harmonics limit.
pub const HARMONICS_LIMIT: usize = 1000;

/// Maps the position of a gain control (0.0 - 1.0) to a linear gain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GainCurve {
    /// Position is the gain fraction itself.
    Linear,

    /// Position sweeps from floor_db (exclusive) up to 0 dB. Position 0.0
    /// is silence.
    Decibel { floor_db: Float },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SynthParams {
    pub control_range: Float,     // Amplitude bound of a single coefficient, +/-
    pub gain_max: Float,          // Upper bound of the linear gain
    pub default_gain: Float,      // Gain after reset or on silence
    pub gain_curve: GainCurve,
    pub min_periods: usize,
    pub max_periods: usize,
    pub max_harmonics: usize,     // Ceiling on harmonic count, independent of frequency
    pub default_fundamental: Float,
    pub default_harmonics: usize,
}

impl Default for SynthParams {
    fn default() -> Self {
        SynthParams {
            control_range: 100.0,
            gain_max: 1.0,
            default_gain: SynthParams::db_to_gain(-6.0),
            gain_curve: GainCurve::Linear,
            min_periods: 1,
            max_periods: 5,
            max_harmonics: 100,
            default_fundamental: 220.0,
            default_harmonics: 8,
        }
    }
}

impl SynthParams {
    /// Parameters of the variant that displays up to ten periods.
    ///
    /// ```
    /// use fourier_synth::SynthParams;
    ///
    /// let params = SynthParams::wide();
    /// assert_eq!(params.max_periods, 10);
    /// ```
    pub fn wide() -> Self {
        SynthParams {
            max_periods: 10,
            ..SynthParams::default()
        }
    }

    /// Copy with all bounds in order.
    ///
    /// Non-finite or non-positive ranges fall back to the defaults, a
    /// max_periods below min_periods is raised to it and the default gain is
    /// clamped to the gain range.
    ///
    /// ```
    /// use fourier_synth::SynthParams;
    ///
    /// let params = SynthParams { min_periods: 6, ..SynthParams::default() }.sanitized();
    /// assert_eq!(params.max_periods, 6);
    /// ```
    pub fn sanitized(&self) -> SynthParams {
        let defaults = SynthParams::default();
        let control_range = if self.control_range.is_finite() && self.control_range > 0.0 {
            self.control_range
        } else {
            defaults.control_range
        };
        let gain_max = if self.gain_max.is_finite() && self.gain_max >= 0.0 {
            self.gain_max
        } else {
            defaults.gain_max
        };
        let default_gain = if self.default_gain.is_finite() {
            num::clamp(self.default_gain, 0.0, gain_max)
        } else {
            defaults.default_gain.min(gain_max)
        };
        let default_fundamental = if self.default_fundamental.is_finite() {
            self.default_fundamental
        } else {
            defaults.default_fundamental
        };
        SynthParams {
            control_range,
            gain_max,
            default_gain,
            gain_curve: self.gain_curve,
            min_periods: self.min_periods,
            max_periods: self.max_periods.max(self.min_periods),
            max_harmonics: self.max_harmonics,
            default_fundamental,
            default_harmonics: self.default_harmonics,
        }
    }

    /// Convert a level in dB to a linear gain factor.
    pub fn db_to_gain(db: Float) -> Float {
        let ten: Float = 10.0;
        ten.powf(db / 20.0)
    }

    /// Level of a linear gain in dB, as shown next to the gain control.
    ///
    /// A gain of zero gives negative infinity.
    pub fn gain_db(gain: Float) -> Float {
        20.0 * gain.log10()
    }

    pub fn clamp_gain(&self, gain: Float) -> Float {
        num::clamp(gain, 0.0, self.gain_max)
    }

    pub fn clamp_periods(&self, periods: usize) -> usize {
        num::clamp(periods, self.min_periods, self.max_periods)
    }

    pub fn clamp_amplitude(&self, value: Float) -> Float {
        num::clamp(value, -self.control_range, self.control_range)
    }

    /// Linear gain for a control position in the range [0.0, 1.0].
    pub fn gain_for_position(&self, position: Float) -> Float {
        let position = num::clamp(position, 0.0, 1.0);
        match self.gain_curve {
            GainCurve::Linear => position * self.gain_max,
            GainCurve::Decibel { floor_db } => {
                if position == 0.0 {
                    0.0
                } else {
                    SynthParams::db_to_gain(floor_db * (1.0 - position)) * self.gain_max
                }
            }
        }
    }

    /// Control position for a linear gain, inverse of gain_for_position.
    pub fn position_for_gain(&self, gain: Float) -> Float {
        if self.gain_max <= 0.0 {
            return 0.0;
        }
        let ratio = self.clamp_gain(gain) / self.gain_max;
        match self.gain_curve {
            GainCurve::Linear => ratio,
            GainCurve::Decibel { floor_db } => {
                if ratio == 0.0 {
                    return 0.0;
                }
                let db = SynthParams::gain_db(ratio);
                num::clamp(1.0 - db / floor_db, 0.0, 1.0)
            }
        }
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------
