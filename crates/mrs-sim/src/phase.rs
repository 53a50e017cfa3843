//! Phase sequencing for the basis-fitting animation
//!
//! A run is split into five ordered phases by progress `p = frame / total`:
//!
//! ```text
//! 0.00        0.30      0.45        0.65              0.90       1.00
//!  |  reveal   |   sum   |   basis   |      scale      |    fit    |
//! ```
//!
//! Intervals are half-open `[lo, hi)` and the last phase absorbs everything
//! from its start onward. The mapping is a pure function of progress, so any
//! frame can be evaluated in any order.

use serde::{Deserialize, Serialize};

use mrs_core::{MrsError, MrsResult};

/// Default phase boundaries
pub const DEFAULT_BOUNDARIES: [f64; 4] = [0.30, 0.45, 0.65, 0.90];

/// Animation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Species signals appear one after another
    RevealComponents,
    /// Individual signals give way to their sum
    ShowSum,
    /// Unit bases drawn over the sum
    ShowBasis,
    /// Bases grow towards their concentrations
    ScaleBasis,
    /// Fitted signal drawn over the composite
    ShowFit,
}

impl Phase {
    /// All phases in order
    pub const ALL: [Phase; 5] = [
        Phase::RevealComponents,
        Phase::ShowSum,
        Phase::ShowBasis,
        Phase::ScaleBasis,
        Phase::ShowFit,
    ];

    pub fn index(&self) -> usize {
        match self {
            Phase::RevealComponents => 0,
            Phase::ShowSum => 1,
            Phase::ShowBasis => 2,
            Phase::ScaleBasis => 3,
            Phase::ShowFit => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::RevealComponents => "reveal_components",
            Phase::ShowSum => "show_sum",
            Phase::ShowBasis => "show_basis",
            Phase::ScaleBasis => "scale_basis",
            Phase::ShowFit => "show_fit",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Progress thresholds at which each phase after the first begins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSchedule {
    boundaries: [f64; 4],
}

impl Default for PhaseSchedule {
    fn default() -> Self {
        Self {
            boundaries: DEFAULT_BOUNDARIES,
        }
    }
}

impl PhaseSchedule {
    pub fn boundaries(&self) -> &[f64; 4] {
        &self.boundaries
    }

    /// Progress at which `phase` begins
    pub fn start(&self, phase: Phase) -> f64 {
        match phase.index() {
            0 => 0.0,
            i => self.boundaries[i - 1],
        }
    }

    /// Progress at which `phase` ends; 1.0 for the absorbing last phase
    pub fn end(&self, phase: Phase) -> f64 {
        self.boundaries.get(phase.index()).copied().unwrap_or(1.0)
    }

    pub fn phase_of(&self, progress: f64) -> Phase {
        let [b_sum, b_basis, b_scale, b_fit] = self.boundaries;
        if progress < b_sum {
            Phase::RevealComponents
        } else if progress < b_basis {
            Phase::ShowSum
        } else if progress < b_scale {
            Phase::ShowBasis
        } else if progress < b_fit {
            Phase::ScaleBasis
        } else {
            Phase::ShowFit
        }
    }
}

/// What a phase needs besides its identity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhaseDetail {
    /// Number of leading species visible
    Reveal { count: usize },
    Sum,
    Basis,
    /// Basis scale factor in `[0, 1)`
    Scale { s: f64 },
    Fit,
}

/// Phase evaluation at one progress value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseState {
    pub progress: f64,
    pub phase: Phase,
    pub detail: PhaseDetail,
}

/// Maps frame indices to phases for a fixed frame count and species count
#[derive(Debug, Clone)]
pub struct PhaseSequencer {
    schedule: PhaseSchedule,
    total_frames: usize,
    species_count: usize,
}

impl PhaseSequencer {
    pub fn new(total_frames: usize, species_count: usize) -> MrsResult<Self> {
        if total_frames == 0 {
            return Err(MrsError::InvalidFrameCount);
        }
        if species_count == 0 {
            return Err(MrsError::EmptySpecies);
        }
        Ok(Self {
            schedule: PhaseSchedule::default(),
            total_frames,
            species_count,
        })
    }

    pub fn schedule(&self) -> &PhaseSchedule {
        &self.schedule
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn species_count(&self) -> usize {
        self.species_count
    }

    /// `frame / total_frames`, rejecting frames past the end
    pub fn progress(&self, frame: usize) -> MrsResult<f64> {
        frame_progress(frame, self.total_frames)
    }

    /// Phase state of a frame
    pub fn state(&self, frame: usize) -> MrsResult<PhaseState> {
        let progress = self.progress(frame)?;
        Ok(self.state_at_progress(progress))
    }

    /// Phase state at an arbitrary progress value
    pub fn state_at_progress(&self, progress: f64) -> PhaseState {
        let phase = self.schedule.phase_of(progress);
        let detail = match phase {
            Phase::RevealComponents => PhaseDetail::Reveal {
                count: self.reveal_count(progress),
            },
            Phase::ShowSum => PhaseDetail::Sum,
            Phase::ShowBasis => PhaseDetail::Basis,
            Phase::ScaleBasis => PhaseDetail::Scale {
                s: self.scale_factor(progress),
            },
            Phase::ShowFit => PhaseDetail::Fit,
        };
        PhaseState {
            progress,
            phase,
            detail,
        }
    }

    /// Visible species while revealing: `min(floor(p / p_sum · n) + 1, n)`
    pub fn reveal_count(&self, progress: f64) -> usize {
        let end = self.schedule.end(Phase::RevealComponents);
        let shown = (progress.max(0.0) / end * self.species_count as f64).floor() as usize + 1;
        shown.min(self.species_count)
    }

    /// Linear ramp across the scaling phase, clamped to `[0, 1]`
    pub fn scale_factor(&self, progress: f64) -> f64 {
        let start = self.schedule.start(Phase::ScaleBasis);
        let end = self.schedule.end(Phase::ScaleBasis);
        ((progress - start) / (end - start)).clamp(0.0, 1.0)
    }

    /// Frame ranges `[first, last]` of every phase that owns at least one frame
    pub fn frame_ranges(&self) -> Vec<(Phase, usize, usize)> {
        let mut ranges: Vec<(Phase, usize, usize)> = Vec::new();
        for frame in 0..self.total_frames {
            let phase = self.schedule.phase_of(frame as f64 / self.total_frames as f64);
            match ranges.last_mut() {
                Some((current, _, last)) if *current == phase => *last = frame,
                _ => ranges.push((phase, frame, frame)),
            }
        }
        ranges
    }
}

/// Progress of `frame` within `total` frames
pub fn frame_progress(frame: usize, total: usize) -> MrsResult<f64> {
    if total == 0 {
        return Err(MrsError::InvalidFrameCount);
    }
    if frame >= total {
        return Err(MrsError::FrameOutOfRange { frame, total });
    }
    Ok(frame as f64 / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_phase_boundaries_at_100_frames() {
        let seq = PhaseSequencer::new(100, 4).unwrap();
        assert_eq!(seq.state(29).unwrap().phase, Phase::RevealComponents);
        assert_eq!(seq.state(30).unwrap().phase, Phase::ShowSum);
        assert_eq!(seq.state(44).unwrap().phase, Phase::ShowSum);
        assert_eq!(seq.state(45).unwrap().phase, Phase::ShowBasis);
        assert_eq!(seq.state(65).unwrap().phase, Phase::ScaleBasis);
        assert_eq!(seq.state(90).unwrap().phase, Phase::ShowFit);
        assert_eq!(seq.state(99).unwrap().phase, Phase::ShowFit);

        match seq.state(89).unwrap().detail {
            PhaseDetail::Scale { s } => assert_relative_eq!(s, 0.96, epsilon = 1e-9),
            other => panic!("unexpected detail {:?}", other),
        }
    }

    #[test]
    fn test_reveal_count_monotonic() {
        let seq = PhaseSequencer::new(100, 4).unwrap();
        let counts: Vec<usize> = (0..30)
            .map(|f| match seq.state(f).unwrap().detail {
                PhaseDetail::Reveal { count } => count,
                other => panic!("frame {} not revealing: {:?}", f, other),
            })
            .collect();

        assert_eq!(counts[0], 1);
        assert_eq!(counts[29], 4);
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));
        for n in 1..=4 {
            assert!(counts.contains(&n));
        }
    }

    #[test]
    fn test_reveal_count_capped() {
        let seq = PhaseSequencer::new(10, 1).unwrap();
        assert_eq!(seq.reveal_count(0.0), 1);
        assert_eq!(seq.reveal_count(0.29), 1);
    }

    #[test]
    fn test_out_of_range_frames() {
        let seq = PhaseSequencer::new(100, 4).unwrap();
        assert_eq!(
            seq.state(100).unwrap_err(),
            MrsError::FrameOutOfRange { frame: 100, total: 100 }
        );
        assert_eq!(PhaseSequencer::new(0, 4).unwrap_err(), MrsError::InvalidFrameCount);
        assert_eq!(PhaseSequencer::new(10, 0).unwrap_err(), MrsError::EmptySpecies);
    }

    #[test]
    fn test_order_independent() {
        let seq = PhaseSequencer::new(450, 4).unwrap();
        let forward: Vec<PhaseState> = (0..450).map(|f| seq.state(f).unwrap()).collect();
        for f in (0..450).rev() {
            assert_eq!(seq.state(f).unwrap(), forward[f]);
        }
    }

    #[test]
    fn test_phase_order() {
        let seq = PhaseSequencer::new(450, 4).unwrap();
        let indices: Vec<usize> = (0..450).map(|f| seq.state(f).unwrap().phase.index()).collect();
        assert!(indices.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_frame_ranges() {
        let seq = PhaseSequencer::new(100, 4).unwrap();
        let ranges = seq.frame_ranges();
        assert_eq!(
            ranges,
            vec![
                (Phase::RevealComponents, 0, 29),
                (Phase::ShowSum, 30, 44),
                (Phase::ShowBasis, 45, 64),
                (Phase::ScaleBasis, 65, 89),
                (Phase::ShowFit, 90, 99),
            ]
        );
    }

    #[test]
    fn test_short_run_skips_phases() {
        // Two frames: p = 0.0 and 0.5
        let seq = PhaseSequencer::new(2, 4).unwrap();
        assert_eq!(
            seq.frame_ranges(),
            vec![(Phase::RevealComponents, 0, 0), (Phase::ShowBasis, 1, 1)]
        );
        assert_eq!(seq.state(1).unwrap().phase, Phase::ShowBasis);
    }

    #[test]
    fn test_schedule_edges() {
        let schedule = PhaseSchedule::default();
        assert_eq!(schedule.boundaries(), &DEFAULT_BOUNDARIES);
        assert_eq!(schedule.phase_of(0.8999), Phase::ScaleBasis);
        assert_eq!(schedule.phase_of(0.9), Phase::ShowFit);
        assert_eq!(schedule.end(Phase::ShowFit), 1.0);
        assert_eq!(schedule.start(Phase::RevealComponents), 0.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Phase::ScaleBasis.to_string(), "scale_basis");
    }
}
