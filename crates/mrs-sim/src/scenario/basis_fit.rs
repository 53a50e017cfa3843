//! Basis fitting, in the time or the frequency domain
//!
//! | phase   | traces                                   | labels             |
//! |---------|------------------------------------------|--------------------|
//! | reveal  | first *k* species signals                | name and C         |
//! | sum     | composite                                | none               |
//! | basis   | composite, unit bases                    | `1 AU`             |
//! | scale   | composite, `basis · C · s`               | `C AU`             |
//! | fit     | composite, `basis · C`, fitted           | `C AU`             |

use mrs_core::{BasisFit, DisplaySet, DisplaySpecies, MrsConfig, MrsResult, SignalDomain};

use super::{Scenario, ScenarioInfo};
use crate::phase::{Phase, PhaseDetail, PhaseSequencer};
use crate::scene::{FrameState, Label, LabelAnchor, Trace, TraceRole};

/// Trace name of the summed species signals
pub const COMPOSITE_TRACE: &str = "composite";
/// Trace name of the recombined bases
pub const FITTED_TRACE: &str = "fitted";

/// Trace name of a species' basis curve
pub fn basis_trace_name(species: &str) -> String {
    format!("{} basis", species)
}

/// Phase-sequenced basis-fitting animation
#[derive(Debug, Clone)]
pub struct BasisFitScenario {
    domain: SignalDomain,
    display: DisplaySet,
    sequencer: PhaseSequencer,
}

impl BasisFitScenario {
    pub fn from_config(config: &MrsConfig) -> MrsResult<Self> {
        let fit = BasisFit::compute(
            &config.acquisition,
            config.relaxation_model()?,
            &config.fit,
            &config.species,
        )?;
        Self::new(&fit, config.animation.total_frames())
    }

    pub fn new(fit: &BasisFit, total_frames: usize) -> MrsResult<Self> {
        Ok(Self {
            domain: fit.domain(),
            display: fit.display(),
            sequencer: PhaseSequencer::new(total_frames, fit.species_count())?,
        })
    }

    pub fn domain(&self) -> SignalDomain {
        self.domain
    }

    pub fn display(&self) -> &DisplaySet {
        &self.display
    }

    pub fn sequencer(&self) -> &PhaseSequencer {
        &self.sequencer
    }

    fn trace(&self, name: impl Into<String>, role: TraceRole, y: Vec<f64>) -> Trace {
        Trace::new(name, role, self.display.x.clone(), y)
    }

    fn component_label(&self, row: usize, species: &DisplaySpecies, trace: &Trace) -> Label {
        match self.domain {
            SignalDomain::Time => Label::new(
                &species.name,
                format!("{}  C={}", species.name, species.concentration),
                LabelAnchor::Stacked { row },
            ),
            SignalDomain::Frequency => {
                let mut text = format!("Molecule {}\nC={}", species.name, species.concentration);
                if let Some(note) = &species.note {
                    text.push_str(&format!("\n({})", note));
                }
                Label::above_peak(&species.name, text, trace)
            }
        }
    }

    fn basis_label(&self, row: usize, text: String, trace: &Trace) -> Label {
        match self.domain {
            SignalDomain::Time => Label::new(&trace.name, text, LabelAnchor::Stacked { row }),
            SignalDomain::Frequency => Label::above_peak(&trace.name, text, trace),
        }
    }

    /// Basis curves scaled by `concentration · s`, or at unit scale when `s` is `None`
    fn push_bases(&self, state: &mut FrameState, s: Option<f64>) {
        for (row, species) in self.display.species.iter().enumerate() {
            let (y, text) = match s {
                None => (species.basis.clone(), "1 AU".to_string()),
                Some(s) => (
                    species.scaled_basis(s),
                    format!("{:.1} AU", species.concentration),
                ),
            };
            let trace = self.trace(basis_trace_name(&species.name), TraceRole::Basis, y);
            state.labels.push(self.basis_label(row, text, &trace));
            state.traces.push(trace);
        }
    }
}

impl Scenario for BasisFitScenario {
    fn info(&self) -> ScenarioInfo {
        match self.domain {
            SignalDomain::Time => ScenarioInfo {
                name: "basis_fit",
                title: "Time-domain FID basis fitting".to_string(),
                x_label: "Time (s)",
                y_label: "Re{FID}",
            },
            SignalDomain::Frequency => ScenarioInfo {
                name: "basis_fit",
                title: "Frequency-domain basis fitting".to_string(),
                x_label: "Frequency (Hz)",
                y_label: "|Spectrum|",
            },
        }
    }

    fn total_frames(&self) -> usize {
        self.sequencer.total_frames()
    }

    fn phase_ranges(&self) -> Vec<(Phase, usize, usize)> {
        self.sequencer.frame_ranges()
    }

    fn render_state(&self, frame: usize) -> MrsResult<FrameState> {
        let phase = self.sequencer.state(frame)?;
        let mut state = FrameState::new(frame, phase.progress, Some(phase.phase));

        match phase.detail {
            PhaseDetail::Reveal { count } => {
                for (row, species) in self.display.species.iter().take(count).enumerate() {
                    let trace = self.trace(&species.name, TraceRole::Component, species.real.clone());
                    state.labels.push(self.component_label(row, species, &trace));
                    state.traces.push(trace);
                }
            }
            PhaseDetail::Sum => {
                state.traces.push(self.trace(
                    COMPOSITE_TRACE,
                    TraceRole::Composite,
                    self.display.composite.clone(),
                ));
            }
            PhaseDetail::Basis => {
                state.traces.push(self.trace(
                    COMPOSITE_TRACE,
                    TraceRole::Composite,
                    self.display.composite.clone(),
                ));
                self.push_bases(&mut state, None);
            }
            PhaseDetail::Scale { s } => {
                state.traces.push(self.trace(
                    COMPOSITE_TRACE,
                    TraceRole::Composite,
                    self.display.composite.clone(),
                ));
                self.push_bases(&mut state, Some(s));
            }
            PhaseDetail::Fit => {
                state.traces.push(self.trace(
                    COMPOSITE_TRACE,
                    TraceRole::Composite,
                    self.display.composite.clone(),
                ));
                self.push_bases(&mut state, Some(1.0));
                state.traces.push(self.trace(
                    FITTED_TRACE,
                    TraceRole::Fit,
                    self.display.fitted.clone(),
                ));
            }
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scenario(config: MrsConfig, frames: usize) -> BasisFitScenario {
        let mut config = config;
        config.animation.frames = Some(frames);
        BasisFitScenario::from_config(&config).unwrap()
    }

    #[test]
    fn test_reveal_traces_and_labels() {
        let sc = scenario(MrsConfig::time_domain_demo(), 100);

        let first = sc.render_state(0).unwrap();
        assert_eq!(first.phase, Some(Phase::RevealComponents));
        assert_eq!(first.traces.len(), 1);
        assert_eq!(first.labels[0].text, "A  C=5");
        assert_eq!(first.labels[0].anchor, LabelAnchor::Stacked { row: 0 });

        let last = sc.render_state(29).unwrap();
        let names: Vec<&str> = last.traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
        assert_eq!(last.labels[3].text, "D  C=12");
    }

    #[test]
    fn test_sum_hides_components() {
        let sc = scenario(MrsConfig::time_domain_demo(), 100);
        let state = sc.render_state(30).unwrap();
        assert_eq!(state.traces.len(), 1);
        assert_eq!(state.traces[0].role, TraceRole::Composite);
        assert!(state.labels.is_empty());
        // Sum of Re{FID} at t = 0 is Σ C
        assert_relative_eq!(state.traces[0].y[0], 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_basis_and_scale_phases() {
        let sc = scenario(MrsConfig::time_domain_demo(), 100);

        let basis = sc.render_state(45).unwrap();
        assert_eq!(basis.traces_with_role(TraceRole::Basis).count(), 4);
        assert!(basis.labels.iter().all(|l| l.text == "1 AU"));

        let scale = sc.render_state(89).unwrap();
        let d = scale.trace("D basis").unwrap();
        assert_relative_eq!(d.y[0], 12.0 * 0.96, epsilon = 1e-9);
        assert_eq!(scale.label_for("D basis").unwrap().text, "12.0 AU");
        assert_eq!(scale.label_for("C basis").unwrap().text, "3.0 AU");
    }

    #[test]
    fn test_fit_matches_composite() {
        let sc = scenario(MrsConfig::time_domain_demo(), 100);
        let state = sc.render_state(95).unwrap();
        assert_eq!(state.phase, Some(Phase::ShowFit));

        let composite = state.trace(COMPOSITE_TRACE).unwrap();
        let fitted = state.trace(FITTED_TRACE).unwrap();
        assert_eq!(composite.y, fitted.y);
        assert_eq!(state.traces_with_role(TraceRole::Basis).count(), 4);

        // Nothing evolves once fitted
        let later = sc.render_state(99).unwrap();
        assert_eq!(later.traces, state.traces);
        assert_eq!(later.labels, state.labels);
    }

    #[test]
    fn test_frequency_labels_above_peaks() {
        let sc = scenario(MrsConfig::frequency_domain_demo(), 100);
        let state = sc.render_state(29).unwrap();

        let b = state.label_for("B").unwrap();
        assert_eq!(b.text, "Molecule B\nC=10\n(S7 + D3)");
        assert_eq!(state.label_for("A").unwrap().text, "Molecule A\nC=5");

        let a_trace = state.trace("A").unwrap();
        let (px, py) = a_trace.peak().unwrap();
        assert!((px - 80.0).abs() <= 1.0);
        match state.label_for("A").unwrap().anchor {
            LabelAnchor::Point { x, y } => {
                assert_eq!(x, px);
                assert_relative_eq!(y, py * 1.05, epsilon = 1e-9);
            }
            other => panic!("unexpected anchor {:?}", other),
        }
    }

    #[test]
    fn test_render_is_pure() {
        let sc = scenario(MrsConfig::frequency_domain_demo(), 60);
        let a = sc.render_state(40).unwrap();
        let _ = sc.render_state(5).unwrap();
        assert_eq!(sc.render_state(40).unwrap(), a);
        assert!(sc.render_state(60).is_err());
    }
}
