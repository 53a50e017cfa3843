//! End-to-end scene stream tests: configuration file → scenario → JSON Lines

use approx::assert_relative_eq;
use std::fs::File;
use std::io::BufReader;

use mrs_core::{MrsConfig, Normalization, ScenarioKind, SignalDomain};
use mrs_sim::scenario::basis_fit::{COMPOSITE_TRACE, FITTED_TRACE};
use mrs_sim::{build_scenario, export_scene, read_scene, Phase, SceneHeader, TraceRole};

#[test]
fn yaml_config_to_scene_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("mrs.yaml");
    let scene_path = dir.path().join("scene.jsonl");

    let mut config = MrsConfig::frequency_domain_demo();
    config.animation.frames = Some(50);
    config.save(&config_path).unwrap();

    let loaded = MrsConfig::load_from(&config_path).unwrap();
    assert_eq!(loaded, config);

    let scenario = build_scenario(&loaded).unwrap();
    let header = SceneHeader::new(scenario.as_ref(), &loaded, 1);
    let written = export_scene(scenario.as_ref(), &header, File::create(&scene_path).unwrap()).unwrap();
    assert_eq!(written, 50);

    let (header, frames) = read_scene(BufReader::new(File::open(&scene_path).unwrap())).unwrap();
    assert_eq!(header.scenario, "basis_fit");
    assert_eq!(header.total_frames, 50);
    assert_eq!(frames.len(), 50);

    // Phases never go backwards
    let phases: Vec<usize> = frames.iter().map(|f| f.phase.unwrap().index()).collect();
    assert!(phases.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(frames[0].phase, Some(Phase::RevealComponents));
    assert_eq!(frames[49].phase, Some(Phase::ShowFit));

    let last = &frames[49];
    let composite = last.trace(COMPOSITE_TRACE).unwrap();
    let fitted = last.trace(FITTED_TRACE).unwrap();
    assert_eq!(composite.y, fitted.y);
    assert_eq!(composite.x.len(), 2048);
}

#[test]
fn area_normalized_spectral_bases_integrate_to_one() {
    let mut config = MrsConfig::frequency_domain_demo();
    config.fit.normalization = Normalization::Area;
    config.animation.frames = Some(100);

    let scenario = build_scenario(&config).unwrap();
    let state = scenario.render_state(50).unwrap();
    assert_eq!(state.phase, Some(Phase::ShowBasis));

    for basis in state.traces_with_role(TraceRole::Basis) {
        let area: f64 = basis
            .y
            .windows(2)
            .zip(basis.x.windows(2))
            .map(|(y, x)| 0.5 * (y[0] + y[1]) * (x[1] - x[0]))
            .sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn time_domain_reveal_then_sum() {
    let mut config = MrsConfig::time_domain_demo();
    config.animation.frames = Some(100);
    assert_eq!(config.fit.domain, SignalDomain::Time);

    let scenario = build_scenario(&config).unwrap();

    let mut last_count = 0;
    for frame in 0..30 {
        let state = scenario.render_state(frame).unwrap();
        let count = state.traces_with_role(TraceRole::Component).count();
        assert!(count >= last_count);
        assert_eq!(state.labels.len(), count);
        last_count = count;
    }
    assert_eq!(last_count, 4);

    let sum = scenario.render_state(30).unwrap();
    assert_eq!(sum.traces_with_role(TraceRole::Component).count(), 0);
    assert_eq!(sum.traces_with_role(TraceRole::Composite).count(), 1);
}

#[test]
fn out_of_range_frame_is_an_error() {
    for kind in [ScenarioKind::BasisFit, ScenarioKind::SpinPrecession] {
        let mut config = MrsConfig::for_scenario(kind);
        config.animation.frames = Some(10);
        let scenario = build_scenario(&config).unwrap();
        assert!(scenario.render_state(10).is_err());
    }
}

#[test]
fn zero_policy_keeps_degenerate_species_finite() {
    let yaml = r#"
animation:
  frames: 20
fit:
  degenerate: zero
species:
  - name: A
    concentration: 5
    components:
      - center: 80
        pattern: [1]
  - name: Silent
    concentration: 2
    components: []
"#;
    let config = MrsConfig::parse(yaml).unwrap();
    let scenario = build_scenario(&config).unwrap();

    let state = scenario.render_state(19).unwrap();
    let silent = state.trace("Silent basis").unwrap();
    assert!(silent.y.iter().all(|&v| v == 0.0));
    assert!(state.traces.iter().all(|t| t.y.iter().all(|v| v.is_finite())));
}
