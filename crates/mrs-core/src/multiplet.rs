//! Multiplet Synthesis
//!
//! A multiplet is a group of resonances split symmetrically around a center
//! frequency by scalar coupling. With `n` lines and coupling constant `J`,
//! line `i` sits at
//!
//! ```text
//! f_i = center + (i - (n-1)/2) · J
//! ```
//!
//! so a doublet straddles the center at ±J/2, a triplet sits at -J, 0, +J and
//! so on. The relative line intensities follow the splitting pattern
//! (Pascal's triangle for first-order coupling to equivalent spins):
//!
//! ```text
//!  singlet      1          |
//!  doublet     1 1        | |
//!  triplet    1 2 1      | | |        (height ∝ amplitude)
//!  quartet   1 3 3 1    || || ||
//! ```
//!
//! The undamped FID is the superposition of one phasor per line:
//!
//! ```text
//! s(t) = Σ_i a_i · exp(i·2π·f_i·t)
//! ```
//!
//! No decay and no normalization happen here; see [`crate::relaxation`].

use serde::{Deserialize, Serialize};

use crate::axis::TimeAxis;
use crate::types::{complex_ops, Complex, FidBuffer, MrsError, MrsResult};

/// Coupling constant used when a pattern does not specify one
pub const DEFAULT_COUPLING_HZ: f64 = 7.0;

fn default_coupling() -> f64 {
    DEFAULT_COUPLING_HZ
}

/// Declarative description of one multiplet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MultipletDescriptor {
    /// Lines inferred from a center, a relative-intensity pattern and `J`
    Pattern {
        /// Center frequency offset in Hz
        center: f64,
        /// Relative line amplitudes, low frequency first
        pattern: Vec<f64>,
        /// Line spacing in Hz
        #[serde(default = "default_coupling")]
        coupling: f64,
    },
    /// Lines given directly as frequency/amplitude pairs
    Explicit {
        frequencies: Vec<f64>,
        amplitudes: Vec<f64>,
    },
}

impl MultipletDescriptor {
    /// A single line of unit amplitude
    pub fn singlet(center: f64) -> Self {
        Self::Pattern {
            center,
            pattern: vec![1.0],
            coupling: DEFAULT_COUPLING_HZ,
        }
    }

    pub fn pattern(center: f64, pattern: Vec<f64>, coupling: f64) -> Self {
        Self::Pattern {
            center,
            pattern,
            coupling,
        }
    }

    /// Explicit lines; fails when the two sequences differ in length
    pub fn explicit(frequencies: Vec<f64>, amplitudes: Vec<f64>) -> MrsResult<Self> {
        let descriptor = Self::Explicit {
            frequencies,
            amplitudes,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Check line counts and that every number is finite
    pub fn validate(&self) -> MrsResult<()> {
        match self {
            Self::Pattern {
                center,
                pattern,
                coupling,
            } => {
                check_finite("center", std::slice::from_ref(center))?;
                check_finite("coupling", std::slice::from_ref(coupling))?;
                check_finite("pattern", pattern)
            }
            Self::Explicit {
                frequencies,
                amplitudes,
            } => {
                if frequencies.len() != amplitudes.len() {
                    return Err(MrsError::DescriptorMismatch {
                        frequencies: frequencies.len(),
                        amplitudes: amplitudes.len(),
                    });
                }
                check_finite("frequencies", frequencies)?;
                check_finite("amplitudes", amplitudes)
            }
        }
    }

    /// Number of lines
    pub fn line_count(&self) -> usize {
        match self {
            Self::Pattern { pattern, .. } => pattern.len(),
            Self::Explicit { frequencies, .. } => frequencies.len(),
        }
    }

    /// `(frequency, amplitude)` of every line
    pub fn lines(&self) -> MrsResult<Vec<(f64, f64)>> {
        self.validate()?;
        let lines = match self {
            Self::Pattern {
                center,
                pattern,
                coupling,
            } => {
                let mid = (pattern.len() as f64 - 1.0) / 2.0;
                pattern
                    .iter()
                    .enumerate()
                    .map(|(i, &a)| (center + (i as f64 - mid) * coupling, a))
                    .collect()
            }
            Self::Explicit {
                frequencies,
                amplitudes,
            } => frequencies
                .iter()
                .copied()
                .zip(amplitudes.iter().copied())
                .collect(),
        };
        Ok(lines)
    }

    /// Conventional name for the splitting ("singlet", "doublet", ...)
    pub fn multiplicity(&self) -> &'static str {
        match self.line_count() {
            0 => "empty",
            1 => "singlet",
            2 => "doublet",
            3 => "triplet",
            4 => "quartet",
            5 => "quintet",
            _ => "multiplet",
        }
    }

    /// Undamped FID of this multiplet on `axis`
    ///
    /// An empty pattern yields the all-zero signal.
    pub fn synthesize(&self, axis: &TimeAxis) -> MrsResult<FidBuffer> {
        let lines = self.lines()?;
        let mut signal = vec![Complex::new(0.0, 0.0); axis.len()];
        for (frequency, amplitude) in lines {
            for (sample, t) in signal.iter_mut().zip(axis.iter()) {
                *sample += complex_ops::cis(frequency, t) * amplitude;
            }
        }
        Ok(signal)
    }
}

fn check_finite(field: &'static str, values: &[f64]) -> MrsResult<()> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(MrsError::NonFiniteDescriptor { field, value }),
        None => Ok(()),
    }
}

/// Elementwise sum of equally long signals
///
/// An empty slice of signals sums to zeros of length `len`.
pub fn sum_signals(signals: &[FidBuffer], len: usize) -> MrsResult<FidBuffer> {
    let mut total = vec![Complex::new(0.0, 0.0); len];
    for signal in signals {
        if signal.len() != len {
            return Err(MrsError::LengthMismatch {
                expected: len,
                actual: signal.len(),
            });
        }
        for (acc, &s) in total.iter_mut().zip(signal.iter()) {
            *acc += s;
        }
    }
    Ok(total)
}
