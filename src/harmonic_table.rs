//! The set of Fourier coefficients making up a waveform.
//!
//! A table holds one DC term plus a cosine and a sine amplitude for every
//! harmonic from 1 up to the current harmonic count. Amplitudes are control
//! values in the range [-control_range, control_range], usually +/-100.
//!
//! The table also owns the fundamental frequency, since the two are coupled:
//! the highest harmonic must never exceed FREQUENCY_MAX, so the product of
//! harmonic count and fundamental is kept at or below it by every setter.

use super::Float;
use super::{FREQUENCY_MAX, FREQUENCY_MIN};
use super::synth_params::{SynthParams, HARMONICS_LIMIT};

use log::{debug, trace};

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HarmonicKind {
    Dc,
    Cosine,
    Sine,
}

/// Identifies a single coefficient in the table.
///
/// The DC term always has index 0, cosine and sine terms have an index of 1
/// or higher. The textual form matches the keys of the preset format:
/// "cos0" for DC, "cos3", "sin7" etc. for harmonics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HarmonicId {
    index: usize,
    kind: HarmonicKind,
}

impl HarmonicId {
    /// Create an ID, returning None for combinations that don't exist.
    ///
    /// A cosine with index 0 is the DC term.
    ///
    /// ```
    /// use fourier_synth::{HarmonicId, HarmonicKind};
    ///
    /// assert_eq!(HarmonicId::new(0, HarmonicKind::Cosine), Some(HarmonicId::dc()));
    /// assert_eq!(HarmonicId::new(0, HarmonicKind::Sine), None);
    /// assert_eq!(HarmonicId::new(2, HarmonicKind::Dc), None);
    /// ```
    pub fn new(index: usize, kind: HarmonicKind) -> Option<HarmonicId> {
        match (index, kind) {
            (0, HarmonicKind::Dc) | (0, HarmonicKind::Cosine) => Some(HarmonicId::dc()),
            (0, HarmonicKind::Sine) => None,
            (_, HarmonicKind::Dc) => None,
            (i, k) => Some(HarmonicId{index: i, kind: k}),
        }
    }

    pub fn dc() -> HarmonicId {
        HarmonicId{index: 0, kind: HarmonicKind::Dc}
    }

    pub fn cos(index: usize) -> Option<HarmonicId> {
        HarmonicId::new(index, HarmonicKind::Cosine)
    }

    pub fn sin(index: usize) -> Option<HarmonicId> {
        HarmonicId::new(index, HarmonicKind::Sine)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> HarmonicKind {
        self.kind
    }
}

impl fmt::Display for HarmonicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            HarmonicKind::Dc | HarmonicKind::Cosine => write!(f, "cos{}", self.index),
            HarmonicKind::Sine => write!(f, "sin{}", self.index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidHarmonicId;
impl fmt::Display for InvalidHarmonicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Not a harmonic key")
    }
}
impl std::error::Error for InvalidHarmonicId { }

impl FromStr for HarmonicId {
    type Err = InvalidHarmonicId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, digits) = if let Some(rest) = s.strip_prefix("cos") {
            (HarmonicKind::Cosine, rest)
        } else if let Some(rest) = s.strip_prefix("sin") {
            (HarmonicKind::Sine, rest)
        } else {
            return Err(InvalidHarmonicId);
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidHarmonicId);
        }
        let index = digits.parse::<usize>().map_err(|_| InvalidHarmonicId)?;
        HarmonicId::new(index, kind).ok_or(InvalidHarmonicId)
    }
}

/// Cosine and sine amplitude of one harmonic.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HarmonicPair {
    pub cos: Float,
    pub sin: Float,
}

/// Labels used for the rows of a control view.
#[derive(Clone, Debug, PartialEq)]
pub struct Labels {
    pub dc: String,
    pub cos_prefix: String,
    pub sin_prefix: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            dc: "DC".to_string(),
            cos_prefix: "A".to_string(),
            sin_prefix: "B".to_string(),
        }
    }
}

/// One entry of the read view handed to the controls.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlRow {
    pub id: HarmonicId,
    pub label: String,
    pub amplitude: Float,
    pub frequency: Float, // Frequency of the harmonic in Hz, 0 for DC
}

#[derive(Clone, Debug)]
pub struct HarmonicTable {
    control_range: Float,
    max_harmonics: usize,
    fundamental: Float,
    dc: Float,
    harmonics: Vec<HarmonicPair>, // Index 0 holds harmonic 1
}

impl HarmonicTable {
    /// Create a table with all amplitudes zero.
    ///
    /// Fundamental and harmonic count are taken from the params defaults and
    /// clamped like any later update.
    ///
    /// ```
    /// use fourier_synth::{HarmonicTable, SynthParams};
    ///
    /// let table = HarmonicTable::new(&SynthParams::default());
    /// assert_eq!(table.harmonic_count(), 8);
    /// assert_eq!(table.fundamental(), 220.0);
    /// ```
    pub fn new(params: &SynthParams) -> HarmonicTable {
        let params = params.sanitized();
        let mut table = HarmonicTable {
            control_range: params.control_range,
            max_harmonics: num::clamp(params.max_harmonics, 1, HARMONICS_LIMIT),
            fundamental: num::clamp(params.default_fundamental, FREQUENCY_MIN, FREQUENCY_MAX),
            dc: 0.0,
            harmonics: vec!(),
        };
        table.set_harmonic_count(params.default_harmonics);
        table
    }

    pub fn control_range(&self) -> Float {
        self.control_range
    }

    pub fn fundamental(&self) -> Float {
        self.fundamental
    }

    pub fn harmonic_count(&self) -> usize {
        self.harmonics.len()
    }

    pub fn max_harmonics(&self) -> usize {
        self.max_harmonics
    }

    pub fn dc(&self) -> Float {
        self.dc
    }

    /// Cosine and sine amplitudes for harmonics 1..=H, in order.
    pub fn harmonics(&self) -> &[HarmonicPair] {
        &self.harmonics
    }

    /// Highest harmonic count allowed for the current fundamental.
    pub fn harmonic_limit(&self) -> usize {
        HarmonicTable::limit_for(self.fundamental, self.max_harmonics)
    }

    fn limit_for(fundamental: Float, max_harmonics: usize) -> usize {
        let by_freq = (FREQUENCY_MAX / fundamental).floor() as usize;
        by_freq.min(max_harmonics).max(1)
    }

    /// Change the number of harmonics.
    ///
    /// The count is clamped to [1, min(FREQUENCY_MAX / fundamental,
    /// max_harmonics)]. Removed harmonics lose their amplitudes, added ones
    /// start at zero. Returns the count actually used.
    ///
    /// ```
    /// use fourier_synth::{HarmonicTable, SynthParams};
    ///
    /// let mut table = HarmonicTable::new(&SynthParams::default());
    /// table.set_fundamental(5000.0);
    /// assert_eq!(table.set_harmonic_count(10), 4); // 4 * 5000 Hz = 20 kHz
    /// ```
    pub fn set_harmonic_count(&mut self, count: usize) -> usize {
        let count = num::clamp(count, 1, self.harmonic_limit());
        let old_count = self.harmonics.len();
        if count != old_count {
            debug!("Harmonic count {} -> {}", old_count, count);
            self.harmonics.resize(count, HarmonicPair::default());
        }
        count
    }

    /// Change the fundamental frequency.
    ///
    /// The frequency is clamped to [FREQUENCY_MIN, FREQUENCY_MAX]. Harmonics
    /// that would end up above FREQUENCY_MAX are removed. Non-finite input is
    /// ignored. Returns the frequency in use afterwards.
    pub fn set_fundamental(&mut self, hz: Float) -> Float {
        if !hz.is_finite() {
            trace!("Ignoring fundamental {}", hz);
            return self.fundamental;
        }
        self.fundamental = num::clamp(hz, FREQUENCY_MIN, FREQUENCY_MAX);
        let limit = self.harmonic_limit();
        if limit < self.harmonics.len() {
            debug!("Fundamental {} Hz allows only {} harmonics", self.fundamental, limit);
            self.set_harmonic_count(limit);
        }
        self.fundamental
    }

    /// Change the ceiling on the number of harmonics (1 - 1000).
    ///
    /// Shrinks the table if it currently holds more harmonics.
    pub fn set_max_harmonics(&mut self, max: usize) -> usize {
        self.max_harmonics = num::clamp(max, 1, HARMONICS_LIMIT);
        if self.max_harmonics < self.harmonics.len() {
            self.set_harmonic_count(self.max_harmonics);
        }
        self.max_harmonics
    }

    /// Get the amplitude of a coefficient.
    ///
    /// Returns None if the harmonic is not part of the table.
    pub fn amplitude(&self, id: HarmonicId) -> Option<Float> {
        match id.kind() {
            HarmonicKind::Dc => Some(self.dc),
            HarmonicKind::Cosine => self.harmonics.get(id.index() - 1).map(|h| h.cos),
            HarmonicKind::Sine => self.harmonics.get(id.index() - 1).map(|h| h.sin),
        }
    }

    fn amplitude_mut(&mut self, id: HarmonicId) -> Option<&mut Float> {
        match id.kind() {
            HarmonicKind::Dc => Some(&mut self.dc),
            HarmonicKind::Cosine => self.harmonics.get_mut(id.index() - 1).map(|h| &mut h.cos),
            HarmonicKind::Sine => self.harmonics.get_mut(id.index() - 1).map(|h| &mut h.sin),
        }
    }

    /// Set the amplitude of a coefficient.
    ///
    /// The value is clamped to the control range. NaN or infinite values are
    /// rejected and leave the amplitude unchanged. Returns the amplitude
    /// stored afterwards, or None if the harmonic is not part of the table.
    ///
    /// ```
    /// use fourier_synth::{HarmonicId, HarmonicTable, SynthParams};
    ///
    /// let mut table = HarmonicTable::new(&SynthParams::default());
    /// let id = HarmonicId::cos(1).unwrap();
    /// assert_eq!(table.set_amplitude(id, 250.0), Some(100.0));
    /// assert_eq!(table.set_amplitude(id, f64::NAN), Some(100.0));
    /// ```
    pub fn set_amplitude(&mut self, id: HarmonicId, value: Float) -> Option<Float> {
        let range = self.control_range;
        let amplitude = self.amplitude_mut(id)?;
        if value.is_finite() {
            *amplitude = num::clamp(value, -range, range);
        }
        Some(*amplitude)
    }

    /// Set the DC term, clamped to the control range.
    pub fn set_dc(&mut self, value: Float) -> Float {
        let id = HarmonicId::dc();
        self.set_amplitude(id, value).unwrap_or(self.dc)
    }

    /// Zero a single coefficient.
    pub fn reset_one(&mut self, id: HarmonicId) {
        if let Some(amplitude) = self.amplitude_mut(id) {
            *amplitude = 0.0;
        }
    }

    /// Zero all coefficients, including DC.
    pub fn reset_all(&mut self) {
        self.dc = 0.0;
        for h in self.harmonics.iter_mut() {
            *h = HarmonicPair::default();
        }
    }

    /// True if every coefficient, including DC, is zero.
    pub fn is_silent(&self) -> bool {
        self.dc == 0.0 && self.harmonics.iter().all(|h| h.cos == 0.0 && h.sin == 0.0)
    }

    /// All coefficient IDs in display order: DC first, then cos/sin pairs.
    pub fn ids(&self) -> impl Iterator<Item = HarmonicId> + '_ {
        let pairs = (1..=self.harmonics.len()).flat_map(|i| {
            vec!(HarmonicId{index: i, kind: HarmonicKind::Cosine},
                 HarmonicId{index: i, kind: HarmonicKind::Sine})
        });
        std::iter::once(HarmonicId::dc()).chain(pairs)
    }

    /// Read view of the table for the control rows.
    pub fn rows(&self, labels: &Labels) -> Vec<ControlRow> {
        self.ids().map(|id| {
            let label = match id.kind() {
                HarmonicKind::Dc => labels.dc.clone(),
                HarmonicKind::Cosine => format!("{}{}", labels.cos_prefix, id.index()),
                HarmonicKind::Sine => format!("{}{}", labels.sin_prefix, id.index()),
            };
            ControlRow {
                id,
                label,
                amplitude: self.amplitude(id).unwrap_or(0.0),
                frequency: id.index() as Float * self.fundamental,
            }
        }).collect()
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn new_table() -> HarmonicTable {
        HarmonicTable::new(&SynthParams::default())
    }

    #[test]
    fn new_table_has_default_shape() {
        let table = new_table();
        assert_eq!(table.harmonic_count(), 8);
        assert_eq!(table.ids().count(), 17); // DC + 8 * (cos, sin)
        assert!(table.is_silent());
    }

    #[test]
    fn harmonic_count_is_bounded() {
        let mut table = new_table();
        assert_eq!(table.set_harmonic_count(0), 1);
        assert_eq!(table.set_harmonic_count(5000), 90); // floor(20000 / 220)
        table.set_max_harmonics(50);
        assert_eq!(table.harmonic_count(), 50);
        assert_eq!(table.set_harmonic_count(60), 50);
    }

    #[test]
    fn shrinking_drops_amplitudes_and_growing_adds_zeros() {
        let mut table = new_table();
        table.set_amplitude(HarmonicId::sin(8).unwrap(), 42.0);
        table.set_harmonic_count(4);
        assert_eq!(table.amplitude(HarmonicId::sin(8).unwrap()), None);
        table.set_harmonic_count(8);
        assert_eq!(table.amplitude(HarmonicId::sin(8).unwrap()), Some(0.0));
    }

    #[test]
    fn fundamental_shrinks_harmonics() {
        let mut table = new_table();
        table.set_harmonic_count(20);
        assert_eq!(table.set_fundamental(3000.0), 3000.0);
        assert_eq!(table.harmonic_count(), 6);
        assert_eq!(table.set_fundamental(1.0), FREQUENCY_MIN);
        assert_eq!(table.set_fundamental(1.0e6), FREQUENCY_MAX);
        assert_eq!(table.harmonic_count(), 1);
        assert_eq!(table.set_fundamental(Float::NAN), FREQUENCY_MAX);
    }

    #[test]
    fn harmonics_times_fundamental_never_exceeds_max() {
        let mut table = new_table();
        let freqs = [20.0, 33.3, 220.0, 999.9, 4000.0, 7001.0, 19999.0, 20000.0];
        let counts = [1, 3, 8, 27, 100, 1000];
        for &f in freqs.iter() {
            for &h in counts.iter() {
                table.set_max_harmonics(1000);
                table.set_harmonic_count(h);
                table.set_fundamental(f);
                assert!(table.harmonic_count() as Float * table.fundamental() <= FREQUENCY_MAX);
                table.set_harmonic_count(h);
                assert!(table.harmonic_count() as Float * table.fundamental() <= FREQUENCY_MAX);
            }
        }
    }

    #[test]
    fn amplitude_clamping_is_idempotent() {
        let mut table = new_table();
        let id = HarmonicId::cos(3).unwrap();
        for &v in [-1000.0, -100.0, -12.3, 0.0, 55.5, 100.0, 1.0e9].iter() {
            let stored = table.set_amplitude(id, v).unwrap();
            assert!(stored >= -100.0 && stored <= 100.0);
            assert_eq!(table.set_amplitude(id, stored), Some(stored));
        }
    }

    #[test]
    fn invalid_values_are_ignored() {
        let mut table = new_table();
        let id = HarmonicId::sin(2).unwrap();
        table.set_amplitude(id, 12.5);
        assert_eq!(table.set_amplitude(id, Float::NAN), Some(12.5));
        assert_eq!(table.set_amplitude(id, Float::INFINITY), Some(12.5));
        assert_eq!(table.set_amplitude(HarmonicId::sin(9).unwrap(), 1.0), None);
    }

    #[test]
    fn reset_clears_values() {
        let mut table = new_table();
        table.set_dc(10.0);
        table.set_amplitude(HarmonicId::cos(1).unwrap(), 20.0);
        table.set_amplitude(HarmonicId::sin(1).unwrap(), 30.0);
        table.reset_one(HarmonicId::cos(1).unwrap());
        assert_eq!(table.amplitude(HarmonicId::cos(1).unwrap()), Some(0.0));
        assert_eq!(table.amplitude(HarmonicId::sin(1).unwrap()), Some(30.0));
        table.reset_all();
        assert!(table.is_silent());
    }

    #[test]
    fn ids_parse_from_preset_keys() {
        assert_eq!("cos0".parse::<HarmonicId>(), Ok(HarmonicId::dc()));
        assert_eq!("sin12".parse::<HarmonicId>(), Ok(HarmonicId::sin(12).unwrap()));
        assert_eq!(HarmonicId::cos(7).unwrap().to_string(), "cos7");
        assert!("sin0".parse::<HarmonicId>().is_err());
        assert!("cos".parse::<HarmonicId>().is_err());
        assert!("cos+1".parse::<HarmonicId>().is_err());
        assert!("gain".parse::<HarmonicId>().is_err());
    }

    #[test]
    fn rows_carry_labels_and_frequencies() {
        let mut table = new_table();
        table.set_harmonic_count(2);
        table.set_amplitude(HarmonicId::sin(2).unwrap(), -5.0);
        let rows = table.rows(&Labels::default());
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["DC", "A1", "B1", "A2", "B2"]);
        assert_eq!(rows[4].amplitude, -5.0);
        assert_eq!(rows[4].frequency, 440.0);
    }
}
