//! Concentration read from the initial FID amplitude
//!
//! Every line of a species contributes its full amplitude at `t = 0`, so
//! `|S(0)|` is proportional to concentration. The total FID and each of its
//! parts are drawn progressively while a side panel lists `|S(0)|` and each
//! part's share of it.

use mrs_core::multiplet::{sum_signals, DEFAULT_COUPLING_HZ};
use mrs_core::quantify::AmplitudeBreakdown;
use mrs_core::types::complex_ops;
use mrs_core::{
    FidBuffer, FidSample, MoleculeAssembler, MrsConfig, MrsError, MrsResult, MultipletDescriptor,
    SpeciesEntry, TimeAxis,
};

use super::{acquired_samples, Scenario, ScenarioInfo};
use crate::phase::frame_progress;
use crate::scene::{FrameState, Label, LabelAnchor, Trace, TraceRole};

/// Trace name of the summed FID
pub const TOTAL_TRACE: &str = "Total FID";
/// Label target of the quantification panel
pub const PANEL_TARGET: &str = "panel";

/// Case 1: singlet; case 2: adds a doublet; case 3: adds a quartet
fn case_parts(case: u8) -> MrsResult<Vec<(&'static str, MultipletDescriptor)>> {
    if !(1..=3).contains(&case) {
        return Err(MrsError::UnknownCase(case));
    }
    let j = DEFAULT_COUPLING_HZ;
    let parts = vec![
        ("Singlet", MultipletDescriptor::singlet(80.0)),
        ("Doublet", MultipletDescriptor::pattern(200.0, vec![1.0, 1.0], j)),
        (
            "Multiplet",
            MultipletDescriptor::pattern(320.0, vec![1.0, 3.0, 3.0, 1.0], j),
        ),
    ];
    Ok(parts.into_iter().take(case as usize).collect())
}

/// Initial-amplitude quantification animation
#[derive(Debug, Clone)]
pub struct ConcentrationScenario {
    time_axis: TimeAxis,
    parts: Vec<(String, FidBuffer)>,
    total: FidBuffer,
    breakdown: AmplitudeBreakdown,
    total_frames: usize,
}

impl ConcentrationScenario {
    pub fn from_config(config: &MrsConfig) -> MrsResult<Self> {
        let assembler =
            MoleculeAssembler::new(config.acquisition.time_axis(), config.relaxation_model()?);

        let parts = case_parts(config.scenario.case)?
            .into_iter()
            .map(|(name, descriptor)| {
                let fid = assembler.assemble(&SpeciesEntry::new(name, vec![descriptor], 1.0))?;
                Ok((name.to_string(), fid))
            })
            .collect::<MrsResult<Vec<_>>>()?;

        let fids: Vec<FidBuffer> = parts.iter().map(|(_, fid)| fid.clone()).collect();
        let total = sum_signals(&fids, assembler.axis().len())?;

        let labelled: Vec<(String, &[FidSample])> = parts
            .iter()
            .map(|(name, fid)| (name.clone(), fid.as_slice()))
            .collect();
        let breakdown = AmplitudeBreakdown::compute(&total, &labelled);

        Ok(Self {
            time_axis: assembler.axis().clone(),
            parts,
            total,
            breakdown,
            total_frames: config.animation.total_frames(),
        })
    }

    pub fn breakdown(&self) -> &AmplitudeBreakdown {
        &self.breakdown
    }

    /// Text of the side panel
    pub fn panel_text(&self) -> String {
        let mut text = String::from("Concentration from FID\n");
        text.push_str("---------------------------\n");
        text.push_str("C ∝ S(0)\n\n");
        text.push_str(&format!("Total amplitude:\n{:.2}\n\n", self.breakdown.total));
        for share in &self.breakdown.shares {
            text.push_str(&format!("{}: {:.1}%\n", share.label, share.percent));
        }
        text
    }
}

impl Scenario for ConcentrationScenario {
    fn info(&self) -> ScenarioInfo {
        ScenarioInfo {
            name: "concentration",
            title: "FID: concentration from initial amplitude".to_string(),
            x_label: "Time (s)",
            y_label: "Signal",
        }
    }

    fn total_frames(&self) -> usize {
        self.total_frames
    }

    fn render_state(&self, frame: usize) -> MrsResult<FrameState> {
        let progress = frame_progress(frame, self.total_frames)?;
        let idx = acquired_samples(frame, self.total_frames, self.total.len());
        let t = &self.time_axis.as_slice()[..idx];

        let mut state = FrameState::new(frame, progress, None);
        state.traces.push(Trace::new(
            TOTAL_TRACE,
            TraceRole::Composite,
            t.to_vec(),
            complex_ops::real_part(&self.total[..idx]),
        ));
        for (name, fid) in &self.parts {
            state.traces.push(Trace::new(
                name.as_str(),
                TraceRole::Component,
                t.to_vec(),
                complex_ops::real_part(&fid[..idx]),
            ));
        }
        state
            .labels
            .push(Label::new(PANEL_TARGET, self.panel_text(), LabelAnchor::Panel));
        Ok(state)
    }
}
