//! Evaluates the Fourier series of a harmonic table across a graph.
//!
//! The graph is `width` pixels wide and shows `periods` cycles of the
//! fundamental, so one cycle spans `width / periods` pixels. For every pixel
//! column x in 0..=width the sum of all cosine and sine terms is evaluated at
//! the phase of x within its cycle.
//!
//! The y axis of the graph points down, so the sum is negated: a positive
//! coefficient moves the wave towards the top of the graph. The peak envelope
//! is tracked on the negated, unscaled sum, before gain, DC offset and
//! display scaling are applied. The DC term is not part of the sum, it only
//! moves the center line.
//!
//! Sampling is a pure function of its inputs and has no internal state.

use super::{Float, PI};
use super::harmonic_table::HarmonicTable;
use super::synth_config::SynthConfig;

use log::trace;

/// Size of the area the wave is drawn into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: usize,
    pub height: Float,
    pub clip_to_stroke: bool, // Keep values a half line width inside the graph
}

impl Viewport {
    pub fn new(width: usize, height: Float) -> Viewport {
        Viewport{width, height, clip_to_stroke: true}
    }

    pub fn half_height(&self) -> Float {
        self.height / 2.0
    }
}

/// Result of a sampling pass.
#[derive(Clone, Debug, PartialEq)]
pub struct SampledWave {
    pub values: Vec<Float>,   // Display y for x in 0..=width
    pub peak_positive: Float, // Largest unscaled sum, >= 0
    pub peak_negative: Float, // Smallest unscaled sum, <= 0
    pub origin_value: Float,  // Display y at x = 0, for the endpoint markers
    pub center: Float,        // Display y of the DC line
    pub scale_y: Float,       // Display units per control unit
    pub wavelength: Float,    // Width of one period in pixels
    pub periods: usize,
}

impl SampledWave {
    /// X positions of the period boundaries, including both ends.
    ///
    /// ```
    /// use fourier_synth::{HarmonicTable, SynthConfig, SynthParams, Viewport, WaveSampler};
    ///
    /// let params = SynthParams::default();
    /// let table = HarmonicTable::new(&params);
    /// let config = SynthConfig::new(&params); // 3 periods
    /// let wave = WaveSampler::sample(&table, &config, &Viewport::new(900, 400.0));
    /// let endpoints: Vec<f64> = wave.endpoints().collect();
    /// assert_eq!(endpoints, vec![0.0, 300.0, 600.0, 900.0]);
    /// ```
    pub fn endpoints(&self) -> impl Iterator<Item = Float> + '_ {
        (0..=self.periods).map(move |p| p as Float * self.wavelength)
    }

    /// Peak-to-peak excursion in display units.
    pub fn peak_to_peak(&self) -> Float {
        self.scale_y * (self.peak_positive - self.peak_negative)
    }

    /// Offset of the wave midline from the center line, in display units.
    pub fn asymmetry(&self) -> Float {
        self.scale_y * (self.peak_positive + self.peak_negative)
    }
}

pub struct WaveSampler {
}

impl WaveSampler {

    /// Scale from control units to display units.
    ///
    /// At full gain a single harmonic at full control range spans the whole
    /// height of the graph.
    pub fn scale_y(gain: Float, half_height: Float, control_range: Float) -> Float {
        gain * (half_height / control_range)
    }

    /// Display y of the DC line.
    ///
    /// The DC term is not scaled by gain, so a DC value of +/-control_range
    /// puts the center line at the top or bottom edge.
    pub fn center(dc: Float, half_height: Float, control_range: Float) -> Float {
        half_height - half_height * dc / control_range
    }

    /// Sum of all harmonics at the given phase (radians), negated for the
    /// downward y axis.
    pub fn evaluate(table: &HarmonicTable, phase: Float) -> Float {
        let mut y = 0.0;
        for (i, h) in table.harmonics().iter().enumerate() {
            let harmonic_phase = (i + 1) as Float * phase;
            y -= h.cos * harmonic_phase.cos();
            y -= h.sin * harmonic_phase.sin();
        }
        y
    }

    /// Sample the wave described by table and config across the viewport.
    ///
    /// ```
    /// use fourier_synth::{HarmonicId, HarmonicTable, SynthConfig, SynthParams, Viewport, WaveSampler};
    ///
    /// let params = SynthParams::default();
    /// let mut table = HarmonicTable::new(&params);
    /// table.set_amplitude(HarmonicId::cos(1).unwrap(), 50.0);
    /// let config = SynthConfig::new(&params);
    ///
    /// let wave = WaveSampler::sample(&table, &config, &Viewport::new(900, 400.0));
    /// assert_eq!(wave.values.len(), 901);
    /// assert_eq!(wave.peak_negative, -50.0);
    /// ```
    pub fn sample(table: &HarmonicTable, config: &SynthConfig, viewport: &Viewport) -> SampledWave {
        let width = viewport.width;
        let height = viewport.height;
        let half_height = viewport.half_height();
        let control_range = table.control_range();
        let periods = config.periods.max(1);

        let wavelength = width as Float / periods as Float;
        let time_base = wavelength / (2.0 * PI);
        let scale_y = WaveSampler::scale_y(config.gain, half_height, control_range);
        let center = WaveSampler::center(table.dc(), half_height, control_range);

        let stroke = config.stroke_margin();
        let (low, high) = if viewport.clip_to_stroke && height > stroke * 2.0 {
            (stroke, height - stroke)
        } else {
            (Float::NEG_INFINITY, Float::INFINITY)
        };

        let mut peak_positive: Float = 0.0;
        let mut peak_negative: Float = 0.0;
        let mut values = Vec::with_capacity(width + 1);
        for x in 0..=width {
            let phase = if time_base > 0.0 {
                (x as Float % wavelength) / time_base
            } else {
                0.0
            };
            let y = WaveSampler::evaluate(table, phase);

            peak_positive = peak_positive.max(y);
            peak_negative = peak_negative.min(y);

            let display_y = center + scale_y * y;
            values.push(num::clamp(display_y, low, high));
        }
        let origin_value = values[0];

        trace!("Sampled {} harmonics over {} px: peaks {} / {}",
            table.harmonic_count(), width, peak_positive, peak_negative);

        SampledWave {
            values,
            peak_positive,
            peak_negative,
            origin_value,
            center,
            scale_y,
            wavelength,
            periods,
        }
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harmonic_table::HarmonicId;
    use crate::synth_params::SynthParams;

    fn is_close_to(actual: Float, expected: Float, delta: Float, index: usize) -> bool {
        let diff = actual - expected;
        if diff > delta || diff < -delta {
            println!("{}: Expected {}, actual {}, delta {}", index, expected, actual, delta);
            false
        } else {
            true
        }
    }

    struct TestContext {
        params: SynthParams,
        table: HarmonicTable,
        config: SynthConfig,
    }

    impl TestContext {
        fn new() -> Self {
            let params = SynthParams::default();
            let table = HarmonicTable::new(&params);
            let config = SynthConfig::new(&params);
            TestContext{params, table, config}
        }

        fn set(&mut self, id: Option<HarmonicId>, value: Float) {
            self.table.set_amplitude(id.unwrap(), value);
        }
    }

    #[test]
    fn cosine_scenario_matches_expected_shape() {
        // 220 Hz, 8 harmonics, 3 periods over 900 px, gain 0.5, cos1 = 50
        let mut context = TestContext::new();
        context.set(HarmonicId::cos(1), 50.0);
        context.config.gain = 0.5;
        let viewport = Viewport{width: 900, height: 400.0, clip_to_stroke: false};
        let wave = WaveSampler::sample(&context.table, &context.config, &viewport);

        assert_eq!(wave.values.len(), 901);
        assert_eq!(wave.wavelength, 300.0);
        assert_eq!(wave.endpoints().collect::<Vec<_>>(), vec![0.0, 300.0, 600.0, 900.0]);

        // Scale is 0.5 * 200 / 100 = 1, amplitude 50 -> 50 px
        assert_eq!(wave.scale_y, 1.0);
        assert_eq!(wave.center, 200.0);
        assert!(is_close_to(wave.peak_negative, -50.0, 1e-9, 0));
        assert!(is_close_to(wave.peak_positive, 50.0, 1e-9, 150));
        assert!(is_close_to(wave.peak_to_peak(), 100.0, 1e-9, 0));
        assert!(is_close_to(wave.asymmetry(), 0.0, 1e-9, 0));

        // Downward axis: cycle starts at the top, bottom half way through
        for &x in [0, 300, 600, 900].iter() {
            assert!(is_close_to(wave.values[x], 150.0, 1e-9, x));
        }
        for &x in [150, 450, 750].iter() {
            assert!(is_close_to(wave.values[x], 250.0, 1e-9, x));
        }
        for &x in [75, 225, 375].iter() {
            assert!(is_close_to(wave.values[x], 200.0, 1e-9, x));
        }
        assert_eq!(wave.origin_value, wave.values[0]);
    }

    #[test]
    fn sine_term_is_inverted_for_display() {
        let mut context = TestContext::new();
        context.set(HarmonicId::sin(1), 100.0);
        context.config.gain = 1.0;
        context.config.periods = 1;
        let viewport = Viewport{width: 400, height: 200.0, clip_to_stroke: false};
        let wave = WaveSampler::sample(&context.table, &context.config, &viewport);
        // Quarter period: sin = 1, drawn at the top edge
        assert!(is_close_to(wave.values[100], 0.0, 1e-9, 100));
        assert!(is_close_to(wave.values[300], 200.0, 1e-9, 300));
    }

    #[test]
    fn dc_only_wave_is_flat() {
        let mut context = TestContext::new();
        context.table.set_dc(40.0);
        context.config.gain = 0.7;
        let viewport = Viewport{width: 640, height: 300.0, clip_to_stroke: true};
        let wave = WaveSampler::sample(&context.table, &context.config, &viewport);
        let center = WaveSampler::center(40.0, 150.0, context.params.control_range);
        assert_eq!(center, 90.0);
        assert!(wave.values.iter().all(|&v| v == center));
        assert_eq!(wave.peak_positive, 0.0);
        assert_eq!(wave.peak_negative, 0.0);
        assert_eq!(wave.peak_to_peak(), 0.0);
    }

    #[test]
    fn zero_gain_keeps_center_defined() {
        let mut context = TestContext::new();
        context.table.set_dc(-50.0);
        context.set(HarmonicId::cos(2), 80.0);
        context.config.gain = 0.0;
        let wave = WaveSampler::sample(&context.table, &context.config, &Viewport::new(100, 100.0));
        assert!(wave.values.iter().all(|&v| v == 75.0));
        assert!(wave.peak_positive > 0.0);
    }

    #[test]
    fn sampling_is_deterministic() {
        let mut context = TestContext::new();
        for i in 1..=8 {
            context.set(HarmonicId::cos(i), 100.0 / i as Float);
            context.set(HarmonicId::sin(i), -37.0 / (i * i) as Float);
        }
        context.table.set_dc(12.3);
        let viewport = Viewport::new(1234, 321.0);
        let first = WaveSampler::sample(&context.table, &context.config, &viewport);
        let second = WaveSampler::sample(&context.table, &context.config, &viewport);
        assert_eq!(first, second);
        let bits_a: Vec<u64> = first.values.iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u64> = second.values.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn values_are_clipped_to_stroke() {
        let mut context = TestContext::new();
        context.set(HarmonicId::cos(1), 100.0);
        context.set(HarmonicId::cos(3), 100.0);
        context.config.gain = 1.0;
        context.config.display.line_width = 4.0;
        let wave = WaveSampler::sample(&context.table, &context.config, &Viewport::new(300, 200.0));
        assert!(wave.values.iter().all(|&v| v >= 2.0 && v <= 198.0));
        assert_eq!(wave.values[0], 2.0);
        // The envelope ignores clipping
        assert!(is_close_to(wave.peak_negative, -200.0, 1e-9, 0));
    }

    #[test]
    fn zero_width_gives_single_sample() {
        let mut context = TestContext::new();
        context.set(HarmonicId::cos(1), 10.0);
        let wave = WaveSampler::sample(&context.table, &context.config, &Viewport::new(0, 100.0));
        assert_eq!(wave.values.len(), 1);
        assert!(wave.values[0].is_finite());
        assert_eq!(wave.peak_negative, -10.0);
    }
}
