//! Spectrum build-up from a progressively acquired FID
//!
//! Frame `f` has acquired the first `floor(f / frames · N)` samples. The top
//! panel shows that truncated FID; the bottom panel shows the spectrum of the
//! same samples zero-padded back to `N`, so lines sharpen as acquisition
//! proceeds.

use mrs_core::multiplet::DEFAULT_COUPLING_HZ;
use mrs_core::types::complex_ops;
use mrs_core::{
    FidBuffer, FidSample, FrequencyAxis, MoleculeAssembler, MrsConfig, MrsError, MrsResult,
    MultipletDescriptor, SpeciesEntry, SpectralTransformer, TimeAxis,
};

use super::{acquired_samples, Scenario, ScenarioInfo};
use crate::phase::frame_progress;
use crate::scene::{FrameState, Label, LabelAnchor, Trace, TraceRole};

/// Trace name of the acquired part of the FID
pub const FID_TRACE: &str = "fid";
/// Trace name of the spectrum of the acquired samples
pub const SPECTRUM_TRACE: &str = "spectrum";

/// Molecule preset for the build-up animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoleculeCase {
    /// Singlet at 80 Hz and doublet at 200 Hz
    SingletDoublet,
    /// Singlet at 80 Hz, doublet at 180 Hz and triplet at 300 Hz
    SingletDoubletTriplet,
    /// 1:3:3:1 quartet at 250 Hz
    Quartet,
}

impl MoleculeCase {
    pub fn from_case(case: u8) -> MrsResult<Self> {
        match case {
            1 => Ok(MoleculeCase::SingletDoublet),
            2 => Ok(MoleculeCase::SingletDoubletTriplet),
            3 => Ok(MoleculeCase::Quartet),
            other => Err(MrsError::UnknownCase(other)),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MoleculeCase::SingletDoublet => "singlet + doublet",
            MoleculeCase::SingletDoubletTriplet => "singlet + doublet + triplet",
            MoleculeCase::Quartet => "complex quartet",
        }
    }

    pub fn components(&self) -> Vec<MultipletDescriptor> {
        let j = DEFAULT_COUPLING_HZ;
        match self {
            MoleculeCase::SingletDoublet => vec![
                MultipletDescriptor::singlet(80.0),
                MultipletDescriptor::pattern(200.0, vec![1.0, 1.0], j),
            ],
            MoleculeCase::SingletDoubletTriplet => vec![
                MultipletDescriptor::singlet(80.0),
                MultipletDescriptor::pattern(180.0, vec![1.0, 1.0], j),
                MultipletDescriptor::pattern(300.0, vec![1.0, 2.0, 1.0], j),
            ],
            MoleculeCase::Quartet => vec![MultipletDescriptor::pattern(
                250.0,
                vec![1.0, 3.0, 3.0, 1.0],
                j,
            )],
        }
    }
}

/// FID-to-spectrum build-up animation
#[derive(Debug, Clone)]
pub struct SpectrumBuildupScenario {
    case: MoleculeCase,
    time_axis: TimeAxis,
    /// Planned once; frames work on clones
    transformer: SpectralTransformer,
    fid: FidBuffer,
    total_frames: usize,
}

impl SpectrumBuildupScenario {
    pub fn from_config(config: &MrsConfig) -> MrsResult<Self> {
        let case = MoleculeCase::from_case(config.scenario.case)?;
        let assembler =
            MoleculeAssembler::new(config.acquisition.time_axis(), config.relaxation_model()?);
        let fid = assembler.assemble(&SpeciesEntry::new(case.title(), case.components(), 1.0))?;
        let frequency_axis =
            FrequencyAxis::from_layout(config.fit.frequency_layout, &config.acquisition);

        Ok(Self {
            case,
            time_axis: assembler.axis().clone(),
            transformer: SpectralTransformer::new(frequency_axis),
            fid,
            total_frames: config.animation.total_frames(),
        })
    }

    pub fn case(&self) -> MoleculeCase {
        self.case
    }

    pub fn fid(&self) -> &[FidSample] {
        &self.fid
    }

    /// Spectrum of the fully acquired FID
    pub fn full_spectrum(&self) -> MrsResult<Vec<f64>> {
        self.transformer.clone().magnitude_spectrum(&self.fid)
    }
}

impl Scenario for SpectrumBuildupScenario {
    fn info(&self) -> ScenarioInfo {
        ScenarioInfo {
            name: "spectrum_buildup",
            title: format!("Spectrum building ({})", self.case.title()),
            x_label: "Time (s) / Frequency (Hz)",
            y_label: "Re{FID} / |Spectrum|",
        }
    }

    fn total_frames(&self) -> usize {
        self.total_frames
    }

    fn render_state(&self, frame: usize) -> MrsResult<FrameState> {
        let progress = frame_progress(frame, self.total_frames)?;
        let idx = acquired_samples(frame, self.total_frames, self.fid.len());

        let spectrum = self.transformer.clone().truncated_spectrum(&self.fid, idx)?;

        let mut state = FrameState::new(frame, progress, None);
        state.traces.push(Trace::new(
            FID_TRACE,
            TraceRole::Auxiliary,
            self.time_axis.as_slice()[..idx].to_vec(),
            complex_ops::real_part(&self.fid[..idx]),
        ));
        state.traces.push(Trace::new(
            SPECTRUM_TRACE,
            TraceRole::Auxiliary,
            self.transformer.axis().as_slice().to_vec(),
            spectrum,
        ));
        state.labels.push(Label::new(
            SPECTRUM_TRACE,
            format!("Spectrum building ({})", self.case.title()),
            LabelAnchor::Panel,
        ));
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mrs_core::ScenarioKind;

    fn scenario(case: u8) -> SpectrumBuildupScenario {
        let mut config = MrsConfig::for_scenario(ScenarioKind::SpectrumBuildup);
        config.scenario.case = case;
        SpectrumBuildupScenario::from_config(&config).unwrap()
    }

    #[test]
    fn test_truncation_grows() {
        let sc = scenario(1);
        assert_eq!(sc.total_frames(), 300);

        let first = sc.render_state(0).unwrap();
        assert!(first.trace(FID_TRACE).unwrap().is_empty());
        // Nothing acquired yet: flat zero spectrum
        assert!(first.trace(SPECTRUM_TRACE).unwrap().y.iter().all(|&v| v == 0.0));

        let half = sc.render_state(150).unwrap();
        assert_eq!(half.trace(FID_TRACE).unwrap().len(), 1024);
        assert_eq!(half.trace(SPECTRUM_TRACE).unwrap().len(), 2048);
    }

    #[test]
    fn test_spectrum_sharpens_towards_full() {
        let sc = scenario(3);
        let full = sc.full_spectrum().unwrap();
        let full_peak = full.iter().cloned().fold(0.0, f64::max);

        let early = sc.render_state(30).unwrap();
        let late = sc.render_state(299).unwrap();
        let peak = |s: &FrameState| s.trace(SPECTRUM_TRACE).unwrap().peak().unwrap().1;

        assert!(peak(&early) < peak(&late));
        assert!(peak(&early) < full_peak);
    }

    #[test]
    fn test_frames_match_freshly_planned_transform() {
        let config = MrsConfig::for_scenario(ScenarioKind::SpectrumBuildup);
        let sc = SpectrumBuildupScenario::from_config(&config).unwrap();
        let axis = FrequencyAxis::from_layout(config.fit.frequency_layout, &config.acquisition);

        for frame in [299, 7, 150, 7] {
            let idx = acquired_samples(frame, sc.total_frames(), sc.fid().len());
            let expected = SpectralTransformer::new(axis.clone())
                .truncated_spectrum(sc.fid(), idx)
                .unwrap();
            let state = sc.render_state(frame).unwrap();
            assert_eq!(state.trace(SPECTRUM_TRACE).unwrap().y, expected);
            assert_eq!(state.trace(SPECTRUM_TRACE).unwrap().x, axis.as_slice());
        }
    }

    #[test]
    fn test_case_presets() {
        assert_eq!(scenario(2).case(), MoleculeCase::SingletDoubletTriplet);
        assert_relative_eq!(scenario(2).fid()[0].re, 7.0, epsilon = 1e-12);
        assert_eq!(scenario(3).info().title, "Spectrum building (complex quartet)");
        assert!(MoleculeCase::from_case(4).is_err());
    }
}
