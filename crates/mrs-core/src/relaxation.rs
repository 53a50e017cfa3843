//! Transverse Relaxation
//!
//! After excitation the transverse magnetization dephases and the FID decays
//! with time constant T2:
//!
//! ```text
//! envelope(t) = exp(-t / T2)
//!
//!  1.0 |*
//!      | *
//!      |   *
//!  0.37|- - - *            (t = T2)
//!      |          *  *
//!      +-----------------------> t
//! ```
//!
//! Every species of a run shares the same T2.

use crate::axis::TimeAxis;
use crate::types::{FidBuffer, FidSample, MrsError, MrsResult};

/// Exponential decay envelope with a single time constant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxationModel {
    t2: f64,
}

impl RelaxationModel {
    /// Create a model; T2 must be finite and strictly positive
    pub fn new(t2: f64) -> MrsResult<Self> {
        if !t2.is_finite() || t2 <= 0.0 {
            return Err(MrsError::InvalidRelaxationTime(t2));
        }
        Ok(Self { t2 })
    }

    /// T2 in seconds
    pub fn t2(&self) -> f64 {
        self.t2
    }

    /// Envelope value at time `t`
    #[inline]
    pub fn envelope_at(&self, t: f64) -> f64 {
        (-t / self.t2).exp()
    }

    /// Multiply `signal` by the envelope, returning the decayed copy
    pub fn apply(&self, signal: &[FidSample], axis: &TimeAxis) -> MrsResult<FidBuffer> {
        if signal.len() != axis.len() {
            return Err(MrsError::LengthMismatch {
                expected: axis.len(),
                actual: signal.len(),
            });
        }
        Ok(signal
            .iter()
            .zip(axis.iter())
            .map(|(&s, t)| s * self.envelope_at(t))
            .collect())
    }

    /// Decay `signal` in place
    pub fn apply_inplace(&self, signal: &mut [FidSample], axis: &TimeAxis) -> MrsResult<()> {
        if signal.len() != axis.len() {
            return Err(MrsError::LengthMismatch {
                expected: axis.len(),
                actual: signal.len(),
            });
        }
        for (s, t) in signal.iter_mut().zip(axis.iter()) {
            *s *= self.envelope_at(t);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Acquisition;
    use crate::types::Complex;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_non_positive_t2() {
        assert_eq!(
            RelaxationModel::new(0.0),
            Err(MrsError::InvalidRelaxationTime(0.0))
        );
        assert!(RelaxationModel::new(-0.1).is_err());
        assert!(RelaxationModel::new(f64::INFINITY).is_err());
        assert!(RelaxationModel::new(0.18).is_ok());
    }

    #[test]
    fn test_envelope_at_t2() {
        let model = RelaxationModel::new(0.25).unwrap();
        assert_relative_eq!(model.envelope_at(0.0), 1.0);
        assert_relative_eq!(model.envelope_at(0.25), (-1.0_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_apply_decays_monotonically() {
        let axis = Acquisition::new(2000.0, 128).unwrap().time_axis();
        let model = RelaxationModel::new(0.05).unwrap();
        let flat = vec![Complex::new(1.0, 0.0); axis.len()];
        let decayed = model.apply(&flat, &axis).unwrap();
        assert_relative_eq!(decayed[0].re, 1.0);
        for pair in decayed.windows(2) {
            assert!(pair[1].norm() < pair[0].norm());
        }

        let mut inplace = flat.clone();
        model.apply_inplace(&mut inplace, &axis).unwrap();
        assert_eq!(inplace, decayed);
    }

    #[test]
    fn test_apply_length_mismatch() {
        let axis = Acquisition::new(2000.0, 16).unwrap().time_axis();
        let model = RelaxationModel::new(0.1).unwrap();
        let short = vec![Complex::new(1.0, 0.0); 8];
        assert_eq!(
            model.apply(&short, &axis),
            Err(MrsError::LengthMismatch { expected: 16, actual: 8 })
        );
    }
}
