//! Quantification helpers
//!
//! Two classic ways of reading concentration off an MR signal:
//!
//! - **Initial amplitude**: the FID at `t = 0` is the coherent sum of every
//!   line, so `|S(0)|` is proportional to the number of contributing nuclei.
//! - **Spectral area**: by Parseval, the area under a peak is likewise
//!   proportional to concentration and independent of its line width.

use crate::axis::FrequencyAxis;
use crate::types::{FidSample, MrsError, MrsResult, Sample};

/// Trapezoid-rule integral of `y` over the sample points `x`
pub fn trapezoid(y: &[Sample], x: &[f64]) -> MrsResult<f64> {
    if y.len() != x.len() {
        return Err(MrsError::LengthMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    Ok(y.windows(2)
        .zip(x.windows(2))
        .map(|(yy, xx)| 0.5 * (yy[0] + yy[1]) * (xx[1] - xx[0]))
        .sum())
}

/// Area under a magnitude spectrum
pub fn spectral_area(spectrum: &[Sample], axis: &FrequencyAxis) -> MrsResult<f64> {
    trapezoid(spectrum, axis.as_slice())
}

/// `|S(0)|`, or 0.0 for an empty signal
pub fn initial_amplitude(fid: &[FidSample]) -> f64 {
    fid.first().map(|s| s.norm()).unwrap_or(0.0)
}

/// Share of the total initial amplitude carried by one component
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeShare {
    pub label: String,
    pub amplitude: f64,
    /// Percentage of `|S_total(0)|`; 0 when the total is zero
    pub percent: f64,
}

/// Initial amplitudes of the total and of each labelled part
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeBreakdown {
    pub total: f64,
    pub shares: Vec<AmplitudeShare>,
}

impl AmplitudeBreakdown {
    /// Break down `total` into `parts`
    pub fn compute(total: &[FidSample], parts: &[(String, &[FidSample])]) -> Self {
        let total_amp = initial_amplitude(total);
        let shares = parts
            .iter()
            .map(|(label, fid)| {
                let amplitude = initial_amplitude(fid);
                let percent = if total_amp > 0.0 {
                    100.0 * amplitude / total_amp
                } else {
                    0.0
                };
                AmplitudeShare {
                    label: label.clone(),
                    amplitude,
                    percent,
                }
            })
            .collect();
        Self {
            total: total_amp,
            shares,
        }
    }
}
