//! mrs-anim: render an MRS animation scenario to a JSON Lines scene stream

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use mrs_core::observe::{init_logging, LogLevel};
use mrs_core::{MrsConfig, ScenarioKind, SignalDomain};
use mrs_sim::{build_scenario, export_scene, SceneHeader, SceneSummary};

/// Scenario selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScenarioArg {
    /// Time-domain basis fitting
    BasisTime,
    /// Frequency-domain basis fitting
    BasisSpectral,
    /// Spectrum build-up from a truncated FID
    Buildup,
    /// Concentration from the initial amplitude
    Concentration,
    /// Proton count versus amplitude and area
    Protons,
    /// Spin precession after an RF pulse
    Bloch,
}

impl ScenarioArg {
    fn preset(self) -> MrsConfig {
        match self {
            ScenarioArg::BasisTime => MrsConfig::time_domain_demo(),
            ScenarioArg::BasisSpectral => MrsConfig::frequency_domain_demo(),
            ScenarioArg::Buildup => MrsConfig::for_scenario(ScenarioKind::SpectrumBuildup),
            ScenarioArg::Concentration => MrsConfig::for_scenario(ScenarioKind::Concentration),
            ScenarioArg::Protons => MrsConfig::for_scenario(ScenarioKind::ProtonScaling),
            ScenarioArg::Bloch => MrsConfig::for_scenario(ScenarioKind::SpinPrecession),
        }
    }

    /// Apply the selection to a loaded configuration
    ///
    /// The preset's `relaxation` and `animation` replace the loaded ones
    /// unless the configuration file spells those sections out.
    fn apply(self, config: &mut MrsConfig, explicit: &HashSet<String>) {
        let preset = self.preset();
        config.scenario.kind = preset.scenario.kind;
        if preset.scenario.kind == ScenarioKind::BasisFit {
            config.fit.domain = preset.fit.domain;
        }
        if !explicit.contains("relaxation") {
            config.relaxation = preset.relaxation;
        }
        if !explicit.contains("animation") {
            config.animation = preset.animation;
        }
    }
}

#[derive(Parser)]
#[command(name = "mrs-anim")]
#[command(about = "Render MRS basis-fitting animations as JSON Lines scene streams", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario to render; also takes the preset T2 and timing unless the
    /// configuration file sets `relaxation` or `animation`
    #[arg(short, long, value_enum)]
    scenario: Option<ScenarioArg>,

    /// Molecule case (1-3) for the build-up and concentration scenarios
    #[arg(long)]
    case: Option<u8>,

    /// Explicit frame count
    #[arg(long)]
    frames: Option<usize>,

    /// Emit every n-th frame
    #[arg(long, default_value_t = 1)]
    stride: usize,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the phase table instead of the scene stream
    #[arg(long)]
    summary: bool,

    /// Print an example configuration and exit
    #[arg(long)]
    example_config: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Configuration search paths, most specific first
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("./mrs.yaml")];

    if let Some(dirs) = directories::ProjectDirs::from("", "", "mrs-anim") {
        paths.push(dirs.config_dir().join("config.yaml"));
    }

    paths
}

/// Top-level sections a configuration document sets explicitly
fn explicit_sections(yaml: &str) -> Result<HashSet<String>> {
    let document: serde_yaml::Value =
        serde_yaml::from_str(yaml).context("reading configuration sections")?;
    let sections: HashSet<String> = document
        .as_mapping()
        .map(|mapping| {
            mapping
                .keys()
                .filter_map(|key| key.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    Ok(sections)
}

/// A configuration loaded from disk
struct LoadedConfig {
    config: MrsConfig,
    path: PathBuf,
    sections: HashSet<String>,
}

fn load_file(path: &Path) -> Result<LoadedConfig> {
    let config = MrsConfig::load_from(path)
        .with_context(|| format!("loading configuration {}", path.display()))?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading configuration {}", path.display()))?;
    Ok(LoadedConfig {
        config,
        path: path.to_path_buf(),
        sections: explicit_sections(&text)?,
    })
}

fn load_config(cli: &Cli) -> Result<Option<LoadedConfig>> {
    if let Some(path) = &cli.config {
        return load_file(path).map(Some);
    }

    for path in config_search_paths() {
        if path.exists() {
            return load_file(&path).map(Some);
        }
    }

    Ok(None)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.example_config {
        print!("{}", MrsConfig::example_yaml());
        return Ok(());
    }

    let (mut config, source, sections) = match load_config(&cli)? {
        Some(loaded) => (loaded.config, Some(loaded.path), loaded.sections),
        None => (
            cli.scenario.map(ScenarioArg::preset).unwrap_or_default(),
            None,
            HashSet::new(),
        ),
    };

    if let Some(scenario) = cli.scenario {
        scenario.apply(&mut config, &sections);
    }
    if let Some(case) = cli.case {
        config.scenario.case = case;
    }
    if let Some(frames) = cli.frames {
        config.animation.frames = Some(frames);
    }
    if cli.verbose > 0 {
        config.logging.level = LogLevel::from_verbosity(cli.verbose);
    }
    if cli.stride == 0 {
        bail!("--stride must be at least 1");
    }

    init_logging(&config.logging);
    match &source {
        Some(path) => tracing::info!(path = %path.display(), "configuration loaded"),
        None => tracing::info!("using built-in preset"),
    }
    if config.scenario.kind == ScenarioKind::BasisFit {
        tracing::info!(
            domain = ?config.fit.domain,
            normalization = ?config.fit.normalization,
            species = config.species.len(),
            "basis fit settings"
        );
    }

    let scenario = build_scenario(&config).context("building scenario")?;

    if cli.summary {
        let summary = SceneSummary::compute(scenario.as_ref(), config.animation.fps);
        print!("{}", summary.to_table());
        if config.fit.domain == SignalDomain::Frequency && config.scenario.kind == ScenarioKind::BasisFit {
            println!("frequency layout: {:?}", config.fit.frequency_layout);
        }
        return Ok(());
    }

    let header = SceneHeader::new(scenario.as_ref(), &config, cli.stride);
    let writer = open_output(cli.output.as_deref())?;
    let written = export_scene(scenario.as_ref(), &header, writer).context("writing scene stream")?;

    if let Some(path) = &cli.output {
        tracing::info!(path = %path.display(), frames = written, "artifact written");
    }
    Ok(())
}
