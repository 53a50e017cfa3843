//! FFT Utilities for MRS Spectra
//!
//! The spectrum of an FID is the discrete Fourier transform of its samples,
//! shifted so that zero frequency sits in the middle of the array and
//! reduced to magnitudes for display:
//!
//! ```text
//! FID (time) ──► DFT ──► fft_shift ──► |·| ──► magnitude spectrum
//!
//!   bins after DFT:    0  1  2 … N/2-1 | -N/2 … -1
//!   bins after shift: -N/2 … -1 | 0  1  2 … N/2-1
//! ```
//!
//! A decaying line at offset `f` Hz becomes a Lorentzian-like peak centered
//! on the bin nearest `f`, with width governed by T2:
//!
//! ```text
//!   |S(f)|
//!     │          ╱╲
//!     │         ╱  ╲
//!     │       _╱    ╲_
//!     │____.-'        '-.____
//!     └───────────┬──────────── f
//!                 f0
//! ```

use rustfft::{num_complex::Complex64, Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;

use crate::axis::FrequencyAxis;
use crate::types::{FidSample, MrsError, MrsResult, Sample};

/// Forward FFT processor for a fixed transform size
///
/// Cloning shares the planned transform and only copies the scratch buffer.
#[derive(Clone)]
pub struct FftProcessor {
    /// FFT size
    size: usize,
    /// Forward FFT instance
    fft_forward: Arc<dyn Fft<f64>>,
    /// Scratch buffer for FFT operations
    scratch: Vec<Complex64>,
}

impl fmt::Debug for FftProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftProcessor")
            .field("size", &self.size)
            .finish()
    }
}

impl FftProcessor {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft_forward = planner.plan_fft_forward(size);
        let scratch = vec![Complex64::new(0.0, 0.0); fft_forward.get_inplace_scratch_len()];

        Self {
            size,
            fft_forward,
            scratch,
        }
    }

    /// Get the FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Compute the forward FFT, zero-padding (or truncating) to the FFT size
    pub fn fft(&mut self, input: &[FidSample]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input.iter().take(self.size).copied().collect();
        buffer.resize(self.size, Complex64::new(0.0, 0.0));
        self.fft_forward.process_with_scratch(&mut buffer, &mut self.scratch);
        buffer
    }

    /// Find the largest value of a real spectrum
    ///
    /// Returns (bin_index, value); (0, 0.0) for an empty spectrum.
    pub fn find_peak(spectrum: &[Sample]) -> (usize, f64) {
        let mut max_idx = 0;
        let mut max_val = 0.0;

        for (i, &value) in spectrum.iter().enumerate() {
            if value > max_val {
                max_val = value;
                max_idx = i;
            }
        }

        (max_idx, max_val)
    }

    /// Compute magnitude spectrum
    pub fn magnitude_spectrum(spectrum: &[Complex64]) -> Vec<f64> {
        spectrum.iter().map(|c| c.norm()).collect()
    }

    /// FFT shift - move zero frequency to center
    ///
    /// Splits at `(n + 1) / 2`, so odd lengths put DC at index `n / 2`.
    pub fn fft_shift<T: Clone>(spectrum: &[T]) -> Vec<T> {
        let n = spectrum.len();
        let mid = (n + 1) / 2;
        let mut shifted = Vec::with_capacity(n);
        shifted.extend_from_slice(&spectrum[mid..]);
        shifted.extend_from_slice(&spectrum[..mid]);
        shifted
    }
}

/// A spectral peak located on the frequency axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    pub index: usize,
    pub frequency: f64,
    pub magnitude: f64,
}

/// Turns length-N FIDs into shifted magnitude spectra on a fixed axis
#[derive(Debug, Clone)]
pub struct SpectralTransformer {
    processor: FftProcessor,
    axis: FrequencyAxis,
}

impl SpectralTransformer {
    pub fn new(axis: FrequencyAxis) -> Self {
        Self {
            processor: FftProcessor::new(axis.len()),
            axis,
        }
    }

    pub fn axis(&self) -> &FrequencyAxis {
        &self.axis
    }

    pub fn size(&self) -> usize {
        self.processor.size()
    }

    /// `|fft_shift(DFT(signal))|`; the signal must match the axis length
    pub fn magnitude_spectrum(&mut self, signal: &[FidSample]) -> MrsResult<Vec<Sample>> {
        if signal.len() != self.size() {
            return Err(MrsError::LengthMismatch {
                expected: self.size(),
                actual: signal.len(),
            });
        }
        let spectrum = self.processor.fft(signal);
        Ok(FftProcessor::magnitude_spectrum(&FftProcessor::fft_shift(&spectrum)))
    }

    /// Spectrum of the first `keep` samples, zero-padded back to full length
    pub fn truncated_spectrum(&mut self, signal: &[FidSample], keep: usize) -> MrsResult<Vec<Sample>> {
        if signal.len() != self.size() {
            return Err(MrsError::LengthMismatch {
                expected: self.size(),
                actual: signal.len(),
            });
        }
        let keep = keep.min(signal.len());
        let spectrum = self.processor.fft(&signal[..keep]);
        Ok(FftProcessor::magnitude_spectrum(&FftProcessor::fft_shift(&spectrum)))
    }

    /// Transform several signals with the same plan
    pub fn magnitude_spectra(&mut self, signals: &[&[FidSample]]) -> MrsResult<Vec<Vec<Sample>>> {
        signals
            .iter()
            .map(|s| self.magnitude_spectrum(s))
            .collect()
    }

    /// Largest bin of `spectrum` mapped onto the frequency axis
    pub fn peak(&self, spectrum: &[Sample]) -> Option<SpectralPeak> {
        if spectrum.is_empty() || spectrum.len() != self.axis.len() {
            return None;
        }
        let (index, magnitude) = FftProcessor::find_peak(spectrum);
        Some(SpectralPeak {
            index,
            frequency: self.axis.as_slice()[index],
            magnitude,
        })
    }
}
