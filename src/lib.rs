//! Fourier synthesis of periodic waveforms.
//!
//! A waveform is composed from a DC term plus cosine and sine amplitudes for
//! a number of harmonics of a fundamental frequency. The crate samples such a
//! waveform across a graph, optionally normalizes gain and DC offset so the
//! wave fills the graph, and exports the coefficients for periodic wave
//! oscillators.
//!
//! ```
//! use fourier_synth::{FourierSynth, HarmonicId, Viewport};
//!
//! let mut synth = FourierSynth::default();
//! synth.set_amplitude(HarmonicId::cos(1).unwrap(), 50.0);
//! synth.set_amplitude(HarmonicId::sin(3).unwrap(), 20.0);
//!
//! let frame = synth.render(&Viewport::new(900, 300.0));
//! assert_eq!(frame.wave.values.len(), 901);
//! ```

mod auto_normalizer;
mod harmonic_table;
mod periodic_wave;
mod preset;
mod resize_debouncer;
mod synth_config;
mod synth_engine;
mod synth_params;
mod wave_oscillator;
mod wave_sampler;

pub use auto_normalizer::{AutoNormalizer, Correction};
pub use harmonic_table::{ControlRow, HarmonicId, HarmonicKind, HarmonicPair, HarmonicTable, InvalidHarmonicId, Labels};
pub use periodic_wave::{MismatchedCoefficients, PeriodicCoefficients, PeriodicWave, PeriodicWaveRef};
pub use preset::{Preset, PresetConfig, PresetError, PRESET_SOURCE, PRESET_VERSION};
pub use resize_debouncer::{ResizeDebouncer, RESIZE_QUIET_PERIOD};
pub use synth_config::{DisplayFlags, SynthConfig, LINE_WIDTH_MAX, LINE_WIDTH_MIN};
pub use synth_engine::{FourierSynth, Frame, Pass};
pub use synth_params::{GainCurve, SynthParams, HARMONICS_LIMIT};
pub use wave_oscillator::WaveOsc;
pub use wave_sampler::{SampledWave, Viewport, WaveSampler};

pub type Float = f64;

pub const PI: Float = std::f64::consts::PI;

/// Lowest fundamental frequency in Hz.
pub const FREQUENCY_MIN: Float = 20.0;
/// Highest frequency in Hz any harmonic may reach.
pub const FREQUENCY_MAX: Float = 20000.0;
