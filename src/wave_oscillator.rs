//! A simple oscillator playing a periodic wave.
//!
//! Generates samples only, getting them to an audio device is up to the
//! caller. The output is `gain * wave + offset`, with the DC offset added
//! after the gain like a separate constant source.

use super::Float;
use super::periodic_wave::PeriodicWaveRef;

pub struct WaveOsc {
    pub sample_rate: Float,
    pub gain: Float,
    last_update: i64, // Time of last sample generation
    last_sample: Float,
    last_pos: Float,
    wave: PeriodicWaveRef,
}

impl WaveOsc {

    /// Create a new oscillator for the given wave.
    ///
    /// ```
    /// use fourier_synth::{FourierSynth, HarmonicId, PeriodicWave, WaveOsc};
    ///
    /// let mut synth = FourierSynth::default();
    /// synth.set_amplitude(HarmonicId::sin(1).unwrap(), 80.0);
    /// let wave = PeriodicWave::new(&synth.coefficients(), 2048).unwrap();
    /// let mut osc = WaveOsc::new(44100.0, synth.config().gain, wave);
    /// let sample = osc.get_sample(220.0, 1, false);
    /// ```
    pub fn new(sample_rate: Float, gain: Float, wave: PeriodicWaveRef) -> WaveOsc {
        WaveOsc{sample_rate,
                gain,
                last_update: 0,
                last_sample: 0.0,
                last_pos: 0.0,
                wave}
    }

    /// Replace the wave, keeping the current phase.
    pub fn set_wave(&mut self, wave: PeriodicWaveRef) {
        let ratio = wave.num_samples as Float / self.wave.num_samples as Float;
        self.last_pos *= ratio;
        self.wave = wave;
    }

    /// Get the next sample for the given frequency and sample clock.
    ///
    /// Frequency is given in Hz, sample_clock is the number of ticks of the
    /// sample rate since the oscillator started. Asking twice for the same
    /// clock returns the same sample.
    pub fn get_sample(&mut self, frequency: Float, sample_clock: i64, reset: bool) -> Float {
        if reset {
            self.reset(sample_clock - 1);
        }
        if sample_clock == self.last_update {
            return self.last_sample;
        }

        let num_samples = self.wave.num_samples as Float;
        let dt = (sample_clock - self.last_update) as Float;
        let freq_speed = frequency * (num_samples / self.sample_rate);
        self.last_pos = (self.last_pos + freq_speed * dt) % num_samples;
        if self.last_pos < 0.0 {
            self.last_pos += num_samples;
        }

        let result = self.wave.value_at(self.last_pos) * self.gain + self.wave.offset;
        self.last_update = sample_clock;
        self.last_sample = result;
        result
    }

    fn reset(&mut self, sample_clock: i64) {
        self.last_pos = 0.0;
        self.last_update = sample_clock;
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::periodic_wave::{PeriodicCoefficients, PeriodicWave};

    fn is_close_to(actual: Float, expected: Float, delta: Float, index: usize) -> bool {
        let diff = actual - expected;
        if diff > delta || diff < -delta {
            println!("{}: Expected {}, actual {}, delta {}", index, expected, actual, delta);
            false
        } else {
            true
        }
    }

    fn square_ish() -> PeriodicWaveRef {
        let coeffs = PeriodicCoefficients {
            cos: vec![0.25, 0.0, 0.0, 0.0],
            sin: vec![0.0, 1.0, 0.0, 1.0 / 3.0],
        };
        PeriodicWave::new(&coeffs, 1024).unwrap()
    }

    #[test]
    fn output_repeats_every_period() {
        // 100 samples per period
        let mut osc = WaveOsc::new(44100.0, 0.5, square_ish());
        let first: Vec<Float> = (1..=100).map(|i| osc.get_sample(441.0, i, false)).collect();
        let second: Vec<Float> = (101..=200).map(|i| osc.get_sample(441.0, i, false)).collect();
        for (i, (a, b)) in first.iter().zip(second.iter()).enumerate() {
            assert!(is_close_to(*a, *b, 1e-6, i));
        }
    }

    #[test]
    fn offset_is_added_after_gain() {
        let mut osc = WaveOsc::new(1000.0, 0.0, square_ish());
        for i in 1..50 {
            assert_eq!(osc.get_sample(10.0, i, false), 0.25);
        }
    }

    #[test]
    fn same_clock_returns_cached_sample() {
        let mut osc = WaveOsc::new(48000.0, 1.0, square_ish());
        let a = osc.get_sample(300.0, 5, false);
        let b = osc.get_sample(300.0, 5, false);
        assert_eq!(a, b);
    }

    #[test]
    fn reset_restarts_the_cycle() {
        let mut osc = WaveOsc::new(48000.0, 1.0, square_ish());
        let start = osc.get_sample(300.0, 1, false);
        for i in 2..77 {
            osc.get_sample(300.0, i, false);
        }
        assert_eq!(osc.get_sample(300.0, 77, true), start);
    }

    #[test]
    fn set_wave_keeps_phase() {
        let coeffs = PeriodicCoefficients{cos: vec![0.0, 1.0], sin: vec![0.0, 0.0]};
        let mut osc = WaveOsc::new(1000.0, 1.0, PeriodicWave::new(&coeffs, 64).unwrap());
        // Quarter period: cosine crosses zero
        let a = osc.get_sample(250.0, 1, false);
        assert!(is_close_to(a, 0.0, 1e-9, 1));
        osc.set_wave(PeriodicWave::new(&coeffs, 256).unwrap());
        // Half period on the finer table
        let b = osc.get_sample(250.0, 2, false);
        assert!(is_close_to(b, -1.0, 1e-9, 2));
    }
}
