//! Animation scenarios
//!
//! Each scenario precomputes its signals once from an [`MrsConfig`] and then
//! answers [`Scenario::render_state`] for any frame, in any order. The
//! basis-fitting scenario is phase-sequenced; the others illustrate how an
//! FID becomes a spectrum and how signal size tracks concentration.

pub mod basis_fit;
pub mod bloch;
pub mod buildup;
pub mod concentration;
pub mod proton;

pub use basis_fit::BasisFitScenario;
pub use bloch::SpinPrecessionScenario;
pub use buildup::{MoleculeCase, SpectrumBuildupScenario};
pub use concentration::ConcentrationScenario;
pub use proton::ProtonScalingScenario;

use mrs_core::{ConfigError, MrsConfig, MrsResult, ScenarioKind};

use crate::phase::Phase;
use crate::scene::FrameState;

/// Static description of a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioInfo {
    /// Machine name, matches the configuration `kind`
    pub name: &'static str,
    /// Plot title
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

/// A frame-addressable animation
pub trait Scenario: Send + Sync {
    fn info(&self) -> ScenarioInfo;

    fn total_frames(&self) -> usize;

    /// Build the complete state of `frame`
    ///
    /// Frames outside `0..total_frames()` are rejected.
    fn render_state(&self, frame: usize) -> MrsResult<FrameState>;

    /// `(phase, first, last)` frame spans; empty when the scenario has no phases
    fn phase_ranges(&self) -> Vec<(Phase, usize, usize)> {
        Vec::new()
    }
}

/// Build the scenario a validated configuration asks for
pub fn build_scenario(config: &MrsConfig) -> Result<Box<dyn Scenario>, ConfigError> {
    config.validate()?;

    let scenario: Box<dyn Scenario> = match config.scenario.kind {
        ScenarioKind::BasisFit => Box::new(BasisFitScenario::from_config(config)?),
        ScenarioKind::SpectrumBuildup => Box::new(SpectrumBuildupScenario::from_config(config)?),
        ScenarioKind::Concentration => Box::new(ConcentrationScenario::from_config(config)?),
        ScenarioKind::ProtonScaling => Box::new(ProtonScalingScenario::from_config(config)?),
        ScenarioKind::SpinPrecession => Box::new(SpinPrecessionScenario::from_config(config)?),
    };

    tracing::info!(
        scenario = scenario.info().name,
        frames = scenario.total_frames(),
        "scenario built"
    );
    Ok(scenario)
}

/// Number of leading samples acquired by `frame`: `floor(frame / total · n)`
pub(crate) fn acquired_samples(frame: usize, total: usize, n: usize) -> usize {
    if total == 0 {
        0
    } else {
        (frame * n / total).min(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_every_kind() {
        for kind in [
            ScenarioKind::BasisFit,
            ScenarioKind::SpectrumBuildup,
            ScenarioKind::Concentration,
            ScenarioKind::ProtonScaling,
            ScenarioKind::SpinPrecession,
        ] {
            let mut config = MrsConfig::for_scenario(kind);
            config.animation.frames = Some(20);
            let scenario = build_scenario(&config).unwrap();
            assert_eq!(scenario.total_frames(), 20);
            assert!(scenario.render_state(0).is_ok());
            assert!(scenario.render_state(19).is_ok());
            assert!(scenario.render_state(20).is_err());
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = MrsConfig::default();
        config.relaxation.t2 = -1.0;
        assert!(matches!(
            build_scenario(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_acquired_samples() {
        assert_eq!(acquired_samples(0, 300, 2048), 0);
        assert_eq!(acquired_samples(150, 300, 2048), 1024);
        assert_eq!(acquired_samples(299, 300, 2048), 2041);
        assert_eq!(acquired_samples(1, 0, 2048), 0);
    }
}
