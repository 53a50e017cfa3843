//! # MRS Animation Scenarios
//!
//! Frame-addressable animations built on `mrs-core`:
//!
//! - **Basis fitting**: species signals revealed, summed, normalized, scaled
//!   and refitted, in the time or the frequency domain
//! - **Spectrum build-up**: spectrum of a progressively acquired FID
//! - **Concentration**: shares of the initial FID amplitude
//! - **Proton scaling**: FID amplitude and spectral area versus proton count
//! - **Spin precession**: spins dephasing after a 90° RF pulse
//!
//! Each scenario turns a frame index into a [`FrameState`]. The `mrs-anim`
//! binary writes those states as a JSON Lines scene stream for a renderer.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mrs_core::MrsConfig;
//! use mrs_sim::scenario::build_scenario;
//!
//! let config = MrsConfig::frequency_domain_demo();
//! let scenario = build_scenario(&config).unwrap();
//! let state = scenario.render_state(0).unwrap();
//! println!("{} traces", state.traces.len());
//! ```

pub mod export;
pub mod phase;
pub mod scenario;
pub mod scene;

pub use export::{export_scene, read_scene, ExportError, SceneHeader, SceneSummary, SceneWriter};
pub use phase::{Phase, PhaseDetail, PhaseSchedule, PhaseSequencer, PhaseState};
pub use scenario::{build_scenario, Scenario, ScenarioInfo};
pub use scene::{Arrow, FrameState, Label, LabelAnchor, Trace, TraceRole, Vector3};
