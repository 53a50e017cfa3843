//! Basis Normalization and Linear Combination
//!
//! A basis set holds one reference signal per species, scaled to "one unit"
//! of that species. Any mixture is then a concentration-weighted sum of the
//! basis entries:
//!
//! ```text
//! basis_m  = signal_m / ref(signal_m)          ref = peak or area
//! real_m   = basis_m · c_m
//! composite = Σ_m real_m
//! fitted    = Σ_m basis_m · c_m                (== composite)
//! ```
//!
//! `fitted` reproduces `composite` exactly; both are kept because a
//! presentation reveals them at different times.
//!
//! The same arithmetic serves complex FIDs (time-domain fitting) and real
//! magnitude spectra (frequency-domain fitting) through [`BasisSample`].

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul};

use crate::axis::FrequencyAxis;
use crate::quantify::trapezoid;
use crate::types::{FidSample, MrsError, MrsResult, Sample};

/// Sample types a basis set can be built from
pub trait BasisSample:
    Copy + Default + Add<Output = Self> + Mul<f64, Output = Self> + Div<f64, Output = Self> + Send + Sync
{
    /// Magnitude used for peak normalization
    fn magnitude(self) -> f64;

    /// Real value plotted for this sample
    fn display_value(self) -> f64;
}

impl BasisSample for Sample {
    #[inline]
    fn magnitude(self) -> f64 {
        self.abs()
    }

    #[inline]
    fn display_value(self) -> f64 {
        self
    }
}

impl BasisSample for FidSample {
    #[inline]
    fn magnitude(self) -> f64 {
        self.norm()
    }

    #[inline]
    fn display_value(self) -> f64 {
        self.re
    }
}

/// How one unit of a species is defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Largest magnitude equals 1
    #[default]
    Peak,
    /// Area under the spectrum equals 1 (frequency domain only)
    Area,
}

/// What to do with a species whose signal is identically zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Fail at setup
    #[default]
    Reject,
    /// Use an all-zero basis
    Zero,
}

/// Scale factor that turns `signal` into one unit
///
/// `Area` needs the frequency axis the signal is sampled on.
pub fn reference_value<T: BasisSample>(
    signal: &[T],
    normalization: Normalization,
    axis: Option<&FrequencyAxis>,
) -> MrsResult<f64> {
    match normalization {
        Normalization::Peak => Ok(signal.iter().map(|s| s.magnitude()).fold(0.0_f64, f64::max)),
        Normalization::Area => {
            let axis = axis.ok_or_else(|| {
                MrsError::UnsupportedNormalization(
                    "area normalization requires a frequency-domain signal".to_string(),
                )
            })?;
            let magnitudes: Vec<f64> = signal.iter().map(|s| s.magnitude()).collect();
            trapezoid(&magnitudes, axis.as_slice())
        }
    }
}

/// Signal of one species before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesSignal<T> {
    pub name: String,
    pub concentration: f64,
    pub note: Option<String>,
    pub signal: Vec<T>,
}

/// One species' entry in a basis set
#[derive(Debug, Clone, PartialEq)]
pub struct BasisEntry<T> {
    pub name: String,
    pub concentration: f64,
    pub note: Option<String>,
    /// Unit-normalized reference signal
    pub basis: Vec<T>,
    /// `basis · concentration`
    pub real: Vec<T>,
    /// Divisor applied to the raw signal (peak or area); 0 when degenerate
    pub reference: f64,
}

impl<T: BasisSample> BasisEntry<T> {
    pub fn is_degenerate(&self) -> bool {
        self.reference == 0.0
    }
}

/// Normalized basis entries plus their recombinations
#[derive(Debug, Clone, PartialEq)]
pub struct BasisSet<T> {
    entries: Vec<BasisEntry<T>>,
    composite: Vec<T>,
    fitted: Vec<T>,
}

impl<T: BasisSample> BasisSet<T> {
    /// Normalize every species and form the weighted sums
    ///
    /// All signals must share one length. Species order is kept.
    pub fn build(
        signals: Vec<SpeciesSignal<T>>,
        normalization: Normalization,
        policy: DegeneratePolicy,
        axis: Option<&FrequencyAxis>,
    ) -> MrsResult<Self> {
        let first = signals.first().ok_or(MrsError::EmptySpecies)?;
        let len = first.signal.len();

        let mut entries = Vec::with_capacity(signals.len());
        for species in signals {
            if species.signal.len() != len {
                return Err(MrsError::LengthMismatch {
                    expected: len,
                    actual: species.signal.len(),
                });
            }

            let reference = reference_value(&species.signal, normalization, axis)?;
            let basis = if reference > 0.0 && reference.is_finite() {
                species.signal.iter().map(|&s| s / reference).collect()
            } else {
                match policy {
                    DegeneratePolicy::Reject => {
                        return Err(MrsError::DegenerateSpecies(species.name));
                    }
                    DegeneratePolicy::Zero => {
                        tracing::warn!(
                            species = %species.name,
                            "species has no signal, using an all-zero basis"
                        );
                        vec![T::default(); len]
                    }
                }
            };
            let reference = if reference > 0.0 && reference.is_finite() {
                reference
            } else {
                0.0
            };

            let real = basis.iter().map(|&b| b * species.concentration).collect();
            tracing::debug!(
                species = %species.name,
                reference,
                concentration = species.concentration,
                "normalized basis entry"
            );

            entries.push(BasisEntry {
                name: species.name,
                concentration: species.concentration,
                note: species.note,
                basis,
                real,
                reference,
            });
        }

        let composite = Self::sum(entries.iter().map(|e| e.real.as_slice()), len);
        let fitted = Self::weighted_sum(&entries, len);

        Ok(Self {
            entries,
            composite,
            fitted,
        })
    }

    fn sum<'a>(signals: impl Iterator<Item = &'a [T]>, len: usize) -> Vec<T>
    where
        T: 'a,
    {
        let mut total = vec![T::default(); len];
        for signal in signals {
            for (acc, &s) in total.iter_mut().zip(signal.iter()) {
                *acc = *acc + s;
            }
        }
        total
    }

    fn weighted_sum(entries: &[BasisEntry<T>], len: usize) -> Vec<T> {
        let mut total = vec![T::default(); len];
        for entry in entries {
            for (acc, &b) in total.iter_mut().zip(entry.basis.iter()) {
                *acc = *acc + b * entry.concentration;
            }
        }
        total
    }

    pub fn entries(&self) -> &[BasisEntry<T>] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&BasisEntry<T>> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Σ real signals
    pub fn composite(&self) -> &[T] {
        &self.composite
    }

    /// Σ basis · concentration
    pub fn fitted(&self) -> &[T] {
        &self.fitted
    }

    /// Real-valued view for plotting against `x`
    pub fn display(&self, x: &[f64]) -> DisplaySet {
        let project = |v: &[T]| v.iter().map(|s| s.display_value()).collect::<Vec<f64>>();
        DisplaySet {
            x: x.to_vec(),
            species: self
                .entries
                .iter()
                .map(|e| DisplaySpecies {
                    name: e.name.clone(),
                    concentration: e.concentration,
                    note: e.note.clone(),
                    real: project(&e.real),
                    basis: project(&e.basis),
                })
                .collect(),
            composite: project(&self.composite),
            fitted: project(&self.fitted),
        }
    }
}

/// One species of a [`DisplaySet`]
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySpecies {
    pub name: String,
    pub concentration: f64,
    pub note: Option<String>,
    pub real: Vec<f64>,
    pub basis: Vec<f64>,
}

impl DisplaySpecies {
    /// `basis · concentration · s` as plotted values
    pub fn scaled_basis(&self, s: f64) -> Vec<f64> {
        self.basis.iter().map(|&b| b * self.concentration * s).collect()
    }
}

/// Plot-ready projection of a basis set onto one axis
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySet {
    pub x: Vec<f64>,
    pub species: Vec<DisplaySpecies>,
    pub composite: Vec<f64>,
    pub fitted: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Acquisition;
    use crate::types::Complex;
    use approx::assert_relative_eq;

    fn species<T>(name: &str, conc: f64, signal: Vec<T>) -> SpeciesSignal<T> {
        SpeciesSignal {
            name: name.to_string(),
            concentration: conc,
            note: None,
            signal,
        }
    }

    #[test]
    fn test_peak_normalized_complex() {
        let signals = vec![
            species("A", 5.0, vec![Complex::new(3.0, 4.0), Complex::new(1.0, 0.0)]),
            species("B", 10.0, vec![Complex::new(0.0, 2.0), Complex::new(-1.0, 0.0)]),
        ];
        let set = BasisSet::build(signals, Normalization::Peak, DegeneratePolicy::Reject, None).unwrap();

        for entry in set.entries() {
            let peak = entry.basis.iter().map(|s| s.norm()).fold(0.0, f64::max);
            assert_relative_eq!(peak, 1.0, epsilon = 1e-12);
        }
        assert_relative_eq!(set.entry("A").unwrap().reference, 5.0);

        // composite = 5·(0.6+0.8i) + 10·(0+1i) at sample 0
        assert_relative_eq!(set.composite()[0].re, 3.0, epsilon = 1e-12);
        assert_relative_eq!(set.composite()[0].im, 14.0, epsilon = 1e-12);
        assert_eq!(set.composite(), set.fitted());
    }

    #[test]
    fn test_degenerate_policies() {
        let make = || {
            vec![
                species("A", 1.0, vec![1.0, 2.0]),
                species("Silent", 3.0, vec![0.0, 0.0]),
            ]
        };

        let err = BasisSet::build(make(), Normalization::Peak, DegeneratePolicy::Reject, None).unwrap_err();
        assert_eq!(err, MrsError::DegenerateSpecies("Silent".to_string()));

        let set = BasisSet::build(make(), Normalization::Peak, DegeneratePolicy::Zero, None).unwrap();
        let silent = set.entry("Silent").unwrap();
        assert!(silent.is_degenerate());
        assert!(silent.basis.iter().all(|&v| v == 0.0));
        assert!(set.composite().iter().all(|v| v.is_finite()));
        assert_eq!(set.composite(), &[0.5, 1.0]);
    }

    #[test]
    fn test_length_mismatch() {
        let signals = vec![species("A", 1.0, vec![1.0, 2.0]), species("B", 1.0, vec![1.0])];
        assert_eq!(
            BasisSet::build(signals, Normalization::Peak, DegeneratePolicy::Reject, None).unwrap_err(),
            MrsError::LengthMismatch { expected: 2, actual: 1 }
        );
    }

    #[test]
    fn test_area_normalization() {
        let acq = Acquisition::new(8.0, 8).unwrap();
        let axis = acq.frequency_axis();
        let spectrum = vec![0.0, 0.0, 1.0, 4.0, 2.0, 0.0, 0.0, 0.0];
        let set = BasisSet::build(
            vec![species("A", 2.0, spectrum)],
            Normalization::Area,
            DegeneratePolicy::Reject,
            Some(&axis),
        )
        .unwrap();

        let area = trapezoid(&set.entries()[0].basis, axis.as_slice()).unwrap();
        assert_relative_eq!(area, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_area_needs_axis() {
        let result = BasisSet::build(
            vec![species("A", 1.0, vec![Complex::new(1.0, 0.0)])],
            Normalization::Area,
            DegeneratePolicy::Reject,
            None,
        );
        assert!(matches!(result, Err(MrsError::UnsupportedNormalization(_))));
    }

    #[test]
    fn test_display_projection() {
        let signals = vec![species("A", 2.0, vec![Complex::new(0.0, 1.0), Complex::new(0.5, 0.5)])];
        let set = BasisSet::build(signals, Normalization::Peak, DegeneratePolicy::Reject, None).unwrap();
        let display = set.display(&[0.0, 0.5]);
        assert_eq!(display.x, vec![0.0, 0.5]);
        assert_eq!(display.species[0].basis, vec![0.0, 0.5]);
        assert_eq!(display.species[0].real, vec![0.0, 1.0]);
        assert_eq!(display.species[0].scaled_basis(0.5), vec![0.0, 0.5]);
        assert_eq!(display.composite, display.fitted);
    }

    #[test]
    fn test_empty_set_rejected() {
        let result: MrsResult<BasisSet<f64>> =
            BasisSet::build(vec![], Normalization::Peak, DegeneratePolicy::Reject, None);
        assert_eq!(result.unwrap_err(), MrsError::EmptySpecies);
    }
}
