//! # Configuration System
//!
//! Provides YAML-based run configuration:
//!
//! - Acquisition (bandwidth, number of points)
//! - Relaxation (T2)
//! - Animation timing (frame rate, duration or explicit frame count)
//! - Basis construction (domain, normalization, degenerate-species policy)
//! - Scenario selection and the species list
//! - Logging
//!
//! Every section is optional; missing values fall back to the defaults of
//! the time-domain basis-fitting demonstration.
//!
//! ## Example Configuration
//!
//! ```yaml
//! acquisition:
//!   sample_rate: 2000
//!   sample_count: 2048
//!
//! relaxation:
//!   t2: 0.15
//!
//! fit:
//!   domain: frequency
//!   normalization: peak
//!
//! species:
//!   - name: A
//!     concentration: 5
//!     components:
//!       - center: 80
//!         pattern: [1]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::axis::Acquisition;
use crate::molecule::{validate_species, SpeciesEntry};
use crate::multiplet::{MultipletDescriptor, DEFAULT_COUPLING_HZ};
use crate::observe::LogConfig;
use crate::pipeline::{FitSettings, SignalDomain};
use crate::relaxation::RelaxationModel;
use crate::types::{MrsError, MrsResult};

/// Error type for configuration operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Configuration file not found
    NotFound(String),
    /// Failed to read or write configuration file
    ReadError(String),
    /// Failed to parse configuration
    ParseError(String),
    /// Invalid configuration value
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(msg) => write!(f, "config not found: {}", msg),
            ConfigError::ReadError(msg) => write!(f, "failed to read config: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "failed to parse config: {}", msg),
            ConfigError::ValidationError(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<MrsError> for ConfigError {
    fn from(err: MrsError) -> Self {
        ConfigError::ValidationError(err.to_string())
    }
}

/// Relaxation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxationConfig {
    /// T2 in seconds
    pub t2: f64,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self { t2: 0.18 }
    }
}

/// Animation timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Frames per second of the rendered artifact
    pub fps: u32,
    /// Duration in seconds, used when `frames` is not given
    pub duration_s: f64,
    /// Explicit frame count
    pub frames: Option<usize>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            duration_s: 15.0,
            frames: None,
        }
    }
}

impl AnimationConfig {
    /// Total number of frames of the run
    pub fn total_frames(&self) -> usize {
        match self.frames {
            Some(frames) => frames,
            None if self.duration_s.is_finite() && self.duration_s > 0.0 => {
                (self.fps as f64 * self.duration_s).round() as usize
            }
            None => 0,
        }
    }

    /// Frame interval in milliseconds
    pub fn frame_interval_ms(&self) -> f64 {
        if self.fps == 0 {
            0.0
        } else {
            1000.0 / self.fps as f64
        }
    }

    pub fn validate(&self) -> MrsResult<()> {
        if self.fps == 0 || self.total_frames() == 0 {
            return Err(MrsError::InvalidFrameCount);
        }
        Ok(())
    }
}

/// Which animation a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Reveal, sum, normalize, scale and refit species signals
    #[default]
    BasisFit,
    /// Spectrum emerging from a progressively acquired FID
    SpectrumBuildup,
    /// Concentration read from the initial FID amplitude
    Concentration,
    /// FID amplitude and spectral area growing with proton count
    ProtonScaling,
    /// Spin precession and dephasing after a 90° RF pulse
    SpinPrecession,
}

impl ScenarioKind {
    /// Whether the scenario consumes the configured species list
    pub fn uses_species(&self) -> bool {
        matches!(self, ScenarioKind::BasisFit)
    }
}

/// Scenario selection and scenario-specific knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub kind: ScenarioKind,
    /// Molecule case (1-3) for the build-up and concentration scenarios
    pub case: u8,
    /// Seed for the random initial spin phases
    pub seed: u64,
    /// Number of spins in the precession scenario
    pub spins: usize,
    /// Spin dephasing constant, in frames
    pub spin_t2_frames: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            kind: ScenarioKind::BasisFit,
            case: 1,
            seed: 42,
            spins: 6,
            spin_t2_frames: 250.0,
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if matches!(
            self.kind,
            ScenarioKind::SpectrumBuildup | ScenarioKind::Concentration
        ) && !(1..=3).contains(&self.case)
        {
            return Err(ConfigError::ValidationError(format!(
                "scenario case must be 1-3, got {}",
                self.case
            )));
        }
        if self.kind == ScenarioKind::SpinPrecession {
            if self.spins == 0 {
                return Err(ConfigError::ValidationError(
                    "spins must be > 0".to_string(),
                ));
            }
            RelaxationModel::new(self.spin_t2_frames)?;
        }
        Ok(())
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MrsConfig {
    /// Configuration version
    pub version: String,
    pub acquisition: Acquisition,
    pub relaxation: RelaxationConfig,
    pub animation: AnimationConfig,
    pub fit: FitSettings,
    pub scenario: ScenarioConfig,
    /// Species in display order
    pub species: Vec<SpeciesEntry>,
    pub logging: LogConfig,
}

impl Default for MrsConfig {
    fn default() -> Self {
        Self::time_domain_demo()
    }
}

impl MrsConfig {
    /// Four-species time-domain basis fitting (T2 = 0.18 s, 30 fps, 15 s).
    pub fn time_domain_demo() -> Self {
        Self {
            version: "1.0".to_string(),
            acquisition: Acquisition::default(),
            relaxation: RelaxationConfig { t2: 0.18 },
            animation: AnimationConfig::default(),
            fit: FitSettings::default(),
            scenario: ScenarioConfig::default(),
            species: demo_species(),
            logging: LogConfig::default(),
        }
    }

    /// Same species fitted as peak-normalized magnitude spectra (T2 = 0.15 s).
    pub fn frequency_domain_demo() -> Self {
        let mut config = Self::time_domain_demo();
        config.relaxation.t2 = 0.15;
        config.fit.domain = SignalDomain::Frequency;
        config
    }

    /// Preset for a non-basis scenario, with the timing of its classic animation.
    pub fn for_scenario(kind: ScenarioKind) -> Self {
        let mut config = Self::time_domain_demo();
        config.scenario.kind = kind;
        match kind {
            ScenarioKind::BasisFit => {}
            ScenarioKind::SpectrumBuildup => {
                config.relaxation.t2 = 0.3;
                config.animation = AnimationConfig {
                    fps: 25,
                    duration_s: 12.0,
                    frames: None,
                };
            }
            ScenarioKind::Concentration => {
                config.relaxation.t2 = 0.25;
                config.animation = AnimationConfig {
                    fps: 25,
                    duration_s: 10.0,
                    frames: Some(250),
                };
            }
            ScenarioKind::ProtonScaling => {
                config.relaxation.t2 = 0.25;
                config.animation = AnimationConfig {
                    fps: 25,
                    duration_s: 8.0,
                    frames: Some(200),
                };
            }
            ScenarioKind::SpinPrecession => {
                config.animation = AnimationConfig {
                    fps: 30,
                    duration_s: 20.0,
                    frames: None,
                };
            }
        }
        config
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            serde_yaml::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))
    }

    /// The validated relaxation model.
    pub fn relaxation_model(&self) -> MrsResult<RelaxationModel> {
        RelaxationModel::new(self.relaxation.t2)
    }

    /// Validate the configuration.
    ///
    /// Every check a run depends on happens here, before any frame exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.acquisition.validate()?;
        self.relaxation_model()?;
        self.animation.validate()?;
        self.fit.validate()?;
        self.scenario.validate()?;

        if self.scenario.kind.uses_species() {
            validate_species(&self.species)?;
        }

        Ok(())
    }

    /// Generate example configuration YAML.
    pub fn example_yaml() -> String {
        serde_yaml::to_string(&Self::time_domain_demo()).unwrap_or_default()
    }
}

/// Species A-D: singlet; singlet + doublet; triplet; quartet.
pub fn demo_species() -> Vec<SpeciesEntry> {
    let j = DEFAULT_COUPLING_HZ;
    vec![
        SpeciesEntry::new("A", vec![MultipletDescriptor::singlet(80.0)], 5.0),
        SpeciesEntry::new(
            "B",
            vec![
                MultipletDescriptor::singlet(140.0),
                MultipletDescriptor::pattern(200.0, vec![1.0, 1.0], j),
            ],
            10.0,
        )
        .with_note("S7 + D3"),
        SpeciesEntry::new(
            "C",
            vec![MultipletDescriptor::pattern(260.0, vec![1.0, 2.0, 1.0], j)],
            3.0,
        ),
        SpeciesEntry::new(
            "D",
            vec![MultipletDescriptor::pattern(320.0, vec![1.0, 3.0, 3.0, 1.0], j)],
            12.0,
        ),
    ]
}
