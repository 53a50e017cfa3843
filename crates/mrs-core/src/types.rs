//! Core types for MRS signal synthesis
//!
//! This module defines the fundamental types shared by every stage of the
//! pipeline, most importantly the complex samples a free induction decay
//! (FID) is made of.
//!
//! ## Understanding FID Samples
//!
//! A quadrature receiver records the transverse magnetization as a complex
//! number per sample:
//! - **Real part**: the component in phase with the receiver reference
//! - **Imaginary part**: the component 90° out of phase
//!
//! A single resonance at offset `f` Hz therefore appears as a rotating phasor
//! `exp(i·2π·f·t)` whose length shrinks with the T2 envelope:
//!
//! ```text
//!   Re{FID}
//!     ^
//!  1.0|\  /\
//!     | \/  \  /\
//!     |      \/  \/\/\/~~~~~~~~
//!     +---------------------------> t
//! ```

use num_complex::Complex64;

/// Type alias for complex numbers using f64 precision
pub type Complex = Complex64;

/// A single complex FID sample
pub type FidSample = Complex64;

/// A real-valued sample (spectral magnitude, plotted trace value)
pub type Sample = f64;

/// A buffer of FID samples
pub type FidBuffer = Vec<FidSample>;

/// Result type for synthesis and fitting operations
pub type MrsResult<T> = Result<T, MrsError>;

/// Errors that can occur while configuring or evaluating a run
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MrsError {
    #[error("Invalid relaxation time T2 = {0} s. Must be finite and > 0")]
    InvalidRelaxationTime(f64),

    #[error("Invalid sample rate: {0} Hz. Must be finite and > 0")]
    InvalidSampleRate(f64),

    #[error("Invalid sample count: {0}. Must be > 0")]
    InvalidSampleCount(usize),

    #[error("Descriptor mismatch: {frequencies} frequencies but {amplitudes} amplitudes")]
    DescriptorMismatch { frequencies: usize, amplitudes: usize },

    #[error("Non-finite multiplet {field}: {value}")]
    NonFiniteDescriptor { field: &'static str, value: f64 },

    #[error("Signal length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("At least one species is required")]
    EmptySpecies,

    #[error("Duplicate species name: {0}")]
    DuplicateSpecies(String),

    #[error("Invalid concentration for species {name}: {value}. Must be finite and > 0")]
    InvalidConcentration { name: String, value: f64 },

    #[error("Species {0} has no signal; its basis cannot be normalized")]
    DegenerateSpecies(String),

    #[error("Invalid frequency span: {0} Hz. Must be finite and > 0")]
    InvalidFrequencySpan(f64),

    #[error("Unsupported normalization: {0}")]
    UnsupportedNormalization(String),

    #[error("Unknown molecule case {0}; expected 1-3")]
    UnknownCase(u8),

    #[error("Frame count must be > 0")]
    InvalidFrameCount,

    #[error("Frame index {frame} out of range for {total} frames")]
    FrameOutOfRange { frame: usize, total: usize },
}

/// Helper functions for working with complex samples
pub mod complex_ops {
    use super::*;
    use std::f64::consts::PI;

    /// Unit phasor `exp(i·2π·f·t)`
    #[inline]
    pub fn cis(frequency: f64, t: f64) -> Complex {
        let phase = 2.0 * PI * frequency * t;
        Complex::new(phase.cos(), phase.sin())
    }

    /// Largest sample magnitude, 0.0 for an empty buffer
    pub fn peak_magnitude(samples: &[FidSample]) -> f64 {
        samples.iter().map(|s| s.norm()).fold(0.0_f64, f64::max)
    }

    /// Real part of every sample, the quantity a time-domain plot shows
    pub fn real_part(samples: &[FidSample]) -> Vec<Sample> {
        samples.iter().map(|s| s.re).collect()
    }

    /// Multiply every sample by a real scale factor
    pub fn scaled(samples: &[FidSample], scale: f64) -> FidBuffer {
        samples.iter().map(|&s| s * scale).collect()
    }
}
