//! Time and frequency axes
//!
//! Every signal of a run is sampled on one shared [`TimeAxis`] and every
//! spectrum is paired index-for-index with one shared [`FrequencyAxis`].
//! Both are built once from the [`Acquisition`] parameters and never change.
//!
//! ```text
//! time:       t_k = k / BW                     k = 0 .. N-1
//! frequency:  f_j = (j - floor(N/2)) · BW / N  j = 0 .. N-1   (shifted DFT bins)
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{MrsError, MrsResult};

/// Sampling parameters of the simulated acquisition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Acquisition {
    /// Spectral bandwidth (= sample rate) in Hz
    pub sample_rate: f64,
    /// Number of complex points per FID
    pub sample_count: usize,
}

impl Default for Acquisition {
    fn default() -> Self {
        Self {
            sample_rate: 2000.0,
            sample_count: 2048,
        }
    }
}

impl Acquisition {
    /// Create validated acquisition parameters
    pub fn new(sample_rate: f64, sample_count: usize) -> MrsResult<Self> {
        let acq = Self {
            sample_rate,
            sample_count,
        };
        acq.validate()?;
        Ok(acq)
    }

    pub fn validate(&self) -> MrsResult<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(MrsError::InvalidSampleRate(self.sample_rate));
        }
        if self.sample_count == 0 {
            return Err(MrsError::InvalidSampleCount(self.sample_count));
        }
        Ok(())
    }

    /// Sample interval (dwell time) in seconds
    pub fn dwell_time(&self) -> f64 {
        1.0 / self.sample_rate
    }

    /// Total acquisition time in seconds
    pub fn acquisition_time(&self) -> f64 {
        self.sample_count as f64 / self.sample_rate
    }

    /// Frequency resolution of the DFT in Hz
    pub fn frequency_resolution(&self) -> f64 {
        self.sample_rate / self.sample_count as f64
    }

    pub fn time_axis(&self) -> TimeAxis {
        TimeAxis::new(self.sample_rate, self.sample_count)
    }

    /// Shifted DFT bin centers spanning `[-BW/2, BW/2)`
    pub fn frequency_axis(&self) -> FrequencyAxis {
        FrequencyAxis::from_bins(self.sample_rate, self.sample_count)
    }
}

/// Sample instants of an FID
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    sample_rate: f64,
    times: Vec<f64>,
}

impl TimeAxis {
    pub fn new(sample_rate: f64, sample_count: usize) -> Self {
        let times = (0..sample_count)
            .map(|k| k as f64 / sample_rate)
            .collect();
        Self { sample_rate, times }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.times
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.times.iter().copied()
    }
}

/// How a [`FrequencyAxis`] was laid out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyLayout {
    /// Centers of the shifted DFT bins
    Bins,
    /// Evenly spaced points from `-span` to `+span` inclusive
    Span(f64),
}

/// Frequency labels of a shifted spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyAxis {
    layout: FrequencyLayout,
    values: Vec<f64>,
}

impl FrequencyAxis {
    /// Bin centers matching [`crate::fft_utils::FftProcessor::fft_shift`]
    pub fn from_bins(sample_rate: f64, sample_count: usize) -> Self {
        let resolution = sample_rate / sample_count as f64;
        let half = (sample_count / 2) as f64;
        let values = (0..sample_count)
            .map(|j| (j as f64 - half) * resolution)
            .collect();
        Self {
            layout: FrequencyLayout::Bins,
            values,
        }
    }

    /// Explicit symmetric range `linspace(-span, span, n)`
    pub fn symmetric(span: f64, sample_count: usize) -> Self {
        let values = match sample_count {
            0 => Vec::new(),
            1 => vec![-span],
            _ => {
                let step = 2.0 * span / (sample_count - 1) as f64;
                (0..sample_count).map(|i| -span + i as f64 * step).collect()
            }
        };
        Self {
            layout: FrequencyLayout::Span(span),
            values,
        }
    }

    pub fn from_layout(layout: FrequencyLayout, acquisition: &Acquisition) -> Self {
        match layout {
            FrequencyLayout::Bins => acquisition.frequency_axis(),
            FrequencyLayout::Span(span) => Self::symmetric(span, acquisition.sample_count),
        }
    }

    pub fn layout(&self) -> FrequencyLayout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Index of the axis point closest to `frequency`
    pub fn nearest_index(&self, frequency: f64) -> usize {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (i, &f) in self.values.iter().enumerate() {
            let dist = (f - frequency).abs();
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best
    }
}
