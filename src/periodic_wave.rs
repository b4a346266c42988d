//! Coefficient export and single-cycle tables for audio playback.
//!
//! An oscillator playing the composed wave works on normalized coefficients:
//! two arrays indexed by harmonic, holding cosine and sine amplitudes
//! divided by the control range. Index 0 of the cosine array carries the DC
//! term, index 0 of the sine array is always 0.
//!
//! A PeriodicWave turns these coefficients into one cycle of samples by
//! running an inverse FFT. Like the audio primitive it stands in for, it
//! ignores the DC term and does not normalize the result, so the table keeps
//! the levels set by the user. The DC offset is added by the oscillator.

use super::Float;
use super::harmonic_table::HarmonicTable;

use log::debug;
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;

use std::fmt;
use std::sync::Arc;

/// Normalized coefficients, both arrays of length H + 1.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicCoefficients {
    pub cos: Vec<Float>,
    pub sin: Vec<Float>,
}

impl PeriodicCoefficients {
    /// Export the coefficients of a table, scaled to [-1.0, 1.0].
    ///
    /// ```
    /// use fourier_synth::{HarmonicId, HarmonicTable, PeriodicCoefficients, SynthParams};
    ///
    /// let mut table = HarmonicTable::new(&SynthParams::default());
    /// table.set_dc(-20.0);
    /// table.set_amplitude(HarmonicId::sin(2).unwrap(), 50.0);
    ///
    /// let coeffs = PeriodicCoefficients::from_table(&table);
    /// assert_eq!(coeffs.cos.len(), 9);
    /// assert_eq!(coeffs.cos[0], -0.2);
    /// assert_eq!(coeffs.sin[2], 0.5);
    /// ```
    pub fn from_table(table: &HarmonicTable) -> PeriodicCoefficients {
        let range = table.control_range();
        let count = table.harmonic_count() + 1;
        let mut cos = Vec::with_capacity(count);
        let mut sin = Vec::with_capacity(count);
        cos.push(table.dc() / range);
        sin.push(0.0);
        for h in table.harmonics() {
            cos.push(h.cos / range);
            sin.push(h.sin / range);
        }
        PeriodicCoefficients{cos, sin}
    }

    pub fn num_harmonics(&self) -> usize {
        self.cos.len().saturating_sub(1)
    }

    /// The DC term, scaled to [-1.0, 1.0].
    pub fn offset(&self) -> Float {
        self.cos.first().cloned().unwrap_or(0.0)
    }
}

// Public error types

#[derive(Debug)]
pub struct MismatchedCoefficients;
impl fmt::Display for MismatchedCoefficients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cosine and sine arrays differ in length")
    }
}
impl std::error::Error for MismatchedCoefficients { }

/// One cycle of a wave, sampled at num_samples positions.
///
/// The table holds num_samples + 1 values, the last one duplicating the
/// first for interpolation without index wrapping.
#[derive(Debug)]
pub struct PeriodicWave {
    pub num_samples: usize,
    pub num_values: usize,
    pub offset: Float, // DC term, not part of the table
    pub table: Vec<Float>,
}

pub type PeriodicWaveRef = Arc<PeriodicWave>;

impl PeriodicWave {
    /// Build a single-cycle table from normalized coefficients.
    ///
    /// Harmonics that don't fit below the Nyquist limit of the table (index
    /// num_samples / 2 and above) are left out.
    ///
    /// ```
    /// use fourier_synth::{PeriodicCoefficients, PeriodicWave};
    ///
    /// let coeffs = PeriodicCoefficients{cos: vec![0.0, 1.0], sin: vec![0.0, 0.0]};
    /// let wave = PeriodicWave::new(&coeffs, 2048).unwrap();
    /// assert_eq!(wave.table.len(), 2049);
    /// assert!((wave.table[0] - 1.0).abs() < 1e-9);
    /// ```
    pub fn new(coefficients: &PeriodicCoefficients, num_samples: usize) -> Result<PeriodicWaveRef, MismatchedCoefficients> {
        if coefficients.cos.len() != coefficients.sin.len() {
            return Err(MismatchedCoefficients);
        }
        let num_samples = num_samples.max(1);
        let num_values = num_samples + 1;
        let mut table = vec!(0.0; num_values);
        PeriodicWave::run_inv_fft(&mut table[..num_samples], coefficients);
        table[num_samples] = table[0]; // Add extra sample for easy interpolation
        debug!("New PeriodicWave: {} harmonics, {} samples",
            coefficients.num_harmonics(), num_samples);
        Ok(Arc::new(PeriodicWave {
            num_samples,
            num_values,
            offset: coefficients.offset(),
            table,
        }))
    }

    // Place the harmonics as conjugate pairs into the spectrum, so that the
    // inverse transform is real:
    // X[k] = (a - ib) / 2, X[N - k] = (a + ib) / 2
    fn run_inv_fft(table: &mut [Float], coefficients: &PeriodicCoefficients) {
        let num_samples = table.len();
        let mut buffer: Vec<Complex<Float>> = vec![Complex::zero(); num_samples];
        let last_harmonic = (num_samples.saturating_sub(1) / 2).min(coefficients.num_harmonics());
        for k in 1..=last_harmonic {
            let a = coefficients.cos[k] / 2.0;
            let b = coefficients.sin[k] / 2.0;
            buffer[k] = Complex::new(a, -b);
            buffer[num_samples - k] = Complex::new(a, b);
        }
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_inverse(num_samples);
        fft.process(&mut buffer);
        for (sample, value) in table.iter_mut().zip(buffer.iter()) {
            *sample = value.re;
        }
    }

    /// Value at the given position (0.0 - num_samples), interpolated
    /// linearly between neighboring samples.
    pub fn value_at(&self, position: Float) -> Float {
        let max = self.num_samples as Float;
        let position = num::clamp(position, 0.0, max);
        let lower = (position as usize).min(self.num_samples - 1);
        let frac = position - lower as Float;
        let a = self.table[lower];
        let b = self.table[lower + 1];
        a + (b - a) * frac
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------
