//! FID amplitude and spectral area versus proton count
//!
//! A single 100 Hz line is scaled by `1 + 4·p`. Both the FID amplitude and
//! the area under its magnitude spectrum grow linearly with that scale.

use mrs_core::quantify::spectral_area;
use mrs_core::types::complex_ops;
use mrs_core::{
    FidBuffer, FrequencyAxis, MoleculeAssembler, MrsConfig, MrsResult, MultipletDescriptor,
    SpeciesEntry, SpectralTransformer, TimeAxis,
};

use super::{Scenario, ScenarioInfo};
use crate::phase::frame_progress;
use crate::scene::{FrameState, Label, LabelAnchor, Trace, TraceRole};

/// Resonance frequency of the scaled line, Hz
pub const LINE_FREQUENCY_HZ: f64 = 100.0;

pub const FID_TRACE: &str = "fid";
pub const SPECTRUM_TRACE: &str = "spectrum";
pub const PANEL_TARGET: &str = "panel";

/// Proton count at progress `p`
pub fn proton_scale(progress: f64) -> f64 {
    1.0 + 4.0 * progress
}

/// Proton-count scaling animation
#[derive(Debug, Clone)]
pub struct ProtonScalingScenario {
    time_axis: TimeAxis,
    frequency_axis: FrequencyAxis,
    fid: FidBuffer,
    spectrum: Vec<f64>,
    total_frames: usize,
}

impl ProtonScalingScenario {
    pub fn from_config(config: &MrsConfig) -> MrsResult<Self> {
        let assembler =
            MoleculeAssembler::new(config.acquisition.time_axis(), config.relaxation_model()?);
        let fid = assembler.assemble(&SpeciesEntry::new(
            "protons",
            vec![MultipletDescriptor::singlet(LINE_FREQUENCY_HZ)],
            1.0,
        ))?;

        let mut transformer = SpectralTransformer::new(FrequencyAxis::from_layout(
            config.fit.frequency_layout,
            &config.acquisition,
        ));
        let spectrum = transformer.magnitude_spectrum(&fid)?;

        Ok(Self {
            time_axis: assembler.axis().clone(),
            frequency_axis: transformer.axis().clone(),
            fid,
            spectrum,
            total_frames: config.animation.total_frames(),
        })
    }

    /// Area under the spectrum of the FID scaled by `scale`
    pub fn area_at(&self, scale: f64) -> MrsResult<f64> {
        let scaled: Vec<f64> = self.spectrum.iter().map(|&v| v * scale).collect();
        spectral_area(&scaled, &self.frequency_axis)
    }

    fn panel_text(scale: f64, area: f64) -> String {
        format!(
            "Number of protons: {:.1}\n\nFID amplitude ∝ protons\nSpectral area ∝ protons\n\nArea = {:.0}\nConcentration ∝ area",
            scale, area
        )
    }
}

impl Scenario for ProtonScalingScenario {
    fn info(&self) -> ScenarioInfo {
        ScenarioInfo {
            name: "proton_scaling",
            title: "FID amplitude ∝ number of protons".to_string(),
            x_label: "Time (s) / Frequency (Hz)",
            y_label: "Re{FID} / |Spectrum|",
        }
    }

    fn total_frames(&self) -> usize {
        self.total_frames
    }

    fn render_state(&self, frame: usize) -> MrsResult<FrameState> {
        let progress = frame_progress(frame, self.total_frames)?;
        let scale = proton_scale(progress);
        let spectrum: Vec<f64> = self.spectrum.iter().map(|&v| v * scale).collect();
        let area = spectral_area(&spectrum, &self.frequency_axis)?;

        let mut state = FrameState::new(frame, progress, None);
        state.traces.push(Trace::new(
            FID_TRACE,
            TraceRole::Auxiliary,
            self.time_axis.as_slice().to_vec(),
            complex_ops::real_part(&complex_ops::scaled(&self.fid, scale)),
        ));
        state.traces.push(Trace::new(
            SPECTRUM_TRACE,
            TraceRole::Auxiliary,
            self.frequency_axis.as_slice().to_vec(),
            spectrum,
        ));
        state.labels.push(Label::new(
            PANEL_TARGET,
            Self::panel_text(scale, area),
            LabelAnchor::Panel,
        ));
        Ok(state)
    }
}
