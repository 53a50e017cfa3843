//! Spin precession after a 90° RF pulse (Bloch view)
//!
//! `n` spins start along B0. At the RF frame they are tipped into the
//! transverse plane; afterwards spin `i` advances by `0.3 + offset_i` radians
//! per frame while its length decays with a T2 measured in frames. The
//! recorded FID is the net `Mx`, drawn once the echo time has passed.
//!
//! Every frame is evaluated from closed-form expressions, so rendering frame
//! `f` never depends on having rendered frames before it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

use mrs_core::{MrsConfig, MrsResult, RelaxationModel};

use super::{Scenario, ScenarioInfo};
use crate::phase::frame_progress;
use crate::scene::{Arrow, FrameState, Label, LabelAnchor, Trace, TraceRole, Vector3};

/// Phase advance of every spin per frame after the pulse, radians
pub const BASE_ADVANCE: f64 = 0.3;
/// Largest per-spin frequency offset, radians per frame
pub const MAX_OFFSET: f64 = 0.1;

pub const FID_TRACE: &str = "fid";
pub const NET_ARROW: &str = "net";
pub const TITLE_TARGET: &str = "fid_title";

/// Spin ensemble precessing after an RF pulse
#[derive(Debug, Clone)]
pub struct SpinPrecessionScenario {
    initial_phases: Vec<f64>,
    offsets: Vec<f64>,
    decay: RelaxationModel,
    fps: f64,
    total_frames: usize,
    rf_frame: usize,
    echo_frame: usize,
}

/// `n` evenly spaced values over `[start, end]`
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

impl SpinPrecessionScenario {
    pub fn from_config(config: &MrsConfig) -> MrsResult<Self> {
        let spins = config.scenario.spins;
        let mut rng = StdRng::seed_from_u64(config.scenario.seed);
        let initial_phases = (0..spins).map(|_| rng.gen::<f64>() * 2.0 * PI).collect();

        Ok(Self::new(
            initial_phases,
            RelaxationModel::new(config.scenario.spin_t2_frames)?,
            config.animation.fps as f64,
            config.animation.total_frames(),
        ))
    }

    /// RF pulse at 20 % and echo at 35 % of the run
    pub fn new(
        initial_phases: Vec<f64>,
        decay: RelaxationModel,
        fps: f64,
        total_frames: usize,
    ) -> Self {
        let offsets = linspace(-MAX_OFFSET, MAX_OFFSET, initial_phases.len());
        Self {
            initial_phases,
            offsets,
            decay,
            fps,
            total_frames,
            rf_frame: total_frames / 5,
            echo_frame: total_frames * 7 / 20,
        }
    }

    pub fn rf_frame(&self) -> usize {
        self.rf_frame
    }

    pub fn echo_frame(&self) -> usize {
        self.echo_frame
    }

    pub fn spin_count(&self) -> usize {
        self.initial_phases.len()
    }

    /// Magnetization of every spin at `frame`
    pub fn magnetization(&self, frame: usize) -> Vec<Vector3> {
        if frame < self.rf_frame {
            return vec![Vector3::new(0.0, 0.0, 1.0); self.spin_count()];
        }
        if frame == self.rf_frame {
            return vec![Vector3::new(1.0, 0.0, 0.0); self.spin_count()];
        }

        let k = (frame - self.rf_frame) as f64;
        let amplitude = self.decay.envelope_at(k);
        self.initial_phases
            .iter()
            .zip(&self.offsets)
            .map(|(&phase0, &offset)| {
                let phase = phase0 + k * (BASE_ADVANCE + offset);
                Vector3::new(amplitude * phase.cos(), amplitude * phase.sin(), 0.0)
            })
            .collect()
    }

    /// Recorded signal at `frame`: net `Mx` after the pulse, 0 until then
    pub fn fid_sample(&self, frame: usize) -> f64 {
        if frame <= self.rf_frame {
            return 0.0;
        }
        self.magnetization(frame).iter().map(|m| m.x).sum()
    }

    /// FID samples of frames `0..=frame`
    pub fn fid_history(&self, frame: usize) -> Vec<f64> {
        (0..=frame).map(|f| self.fid_sample(f)).collect()
    }
}

impl Scenario for SpinPrecessionScenario {
    fn info(&self) -> ScenarioInfo {
        ScenarioInfo {
            name: "spin_precession",
            title: "Spin precession (Bloch view)".to_string(),
            x_label: "Time (s)",
            y_label: "Σ Mx",
        }
    }

    fn total_frames(&self) -> usize {
        self.total_frames
    }

    fn render_state(&self, frame: usize) -> MrsResult<FrameState> {
        let progress = frame_progress(frame, self.total_frames)?;
        let spins = self.magnetization(frame);

        let mut state = FrameState::new(frame, progress, None);

        let n = spins.len().max(1) as f64;
        let net = spins.iter().fold(Vector3::new(0.0, 0.0, 0.0), |acc, m| {
            Vector3::new(acc.x + m.x, acc.y + m.y, acc.z + m.z)
        });
        state.arrows.push(Arrow {
            name: "B0".to_string(),
            vector: Vector3::new(0.0, 0.0, 1.0),
        });
        state.arrows.extend(spins.iter().enumerate().map(|(i, &vector)| Arrow {
            name: format!("spin {}", i),
            vector,
        }));
        state.arrows.push(Arrow {
            name: NET_ARROW.to_string(),
            vector: Vector3::new(net.x / n, net.y / n, net.z / n),
        });

        if frame > self.echo_frame {
            let history = self.fid_history(frame);
            let x = (0..history.len()).map(|f| f as f64 / self.fps).collect();
            state
                .traces
                .push(Trace::new(FID_TRACE, TraceRole::Auxiliary, x, history));
            state
                .labels
                .push(Label::new(TITLE_TARGET, "FID recording", LabelAnchor::Panel));
        } else {
            state
                .labels
                .push(Label::new(TITLE_TARGET, "Waiting for TE", LabelAnchor::Panel));
        }

        Ok(state)
    }
}
