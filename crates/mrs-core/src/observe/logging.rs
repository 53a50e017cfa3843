//! # Structured Logging
//!
//! Run diagnostics go through the `tracing` ecosystem:
//!
//! - `info!` for run milestones (configuration loaded, fit computed, scene written)
//! - `debug!` per species (assembly, normalization)
//! - `warn!` when a degenerate species is absorbed by the zero policy
//!
//! ## Example
//!
//! ```rust,ignore
//! use mrs_core::observe::{init_logging, LogConfig, LogLevel};
//!
//! init_logging(&LogConfig {
//!     level: LogLevel::Debug,
//!     ..Default::default()
//! });
//!
//! tracing::info!(species = 4, "basis fit computed");
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Level for a count of `-v` flags on top of `warn`
    pub fn from_verbosity(verbosity: u8) -> Self {
        match verbosity {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines (machine-readable)
    Json,
    /// Multi-line human-readable output
    Pretty,
    /// One line per event
    #[default]
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Include file:line of the event
    pub source_location: bool,
    /// Directive string overriding `level`, e.g. "mrs_core=debug,mrs_sim=info"
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            source_location: false,
            filter: None,
        }
    }
}

impl LogConfig {
    /// Errors only.
    pub fn quiet() -> Self {
        Self {
            level: LogLevel::Error,
            ..Default::default()
        }
    }

    /// The filter directives this configuration resolves to.
    pub fn directives(&self) -> String {
        match &self.filter {
            Some(custom) => custom.clone(),
            None => self.level.to_string(),
        }
    }
}

/// Initialize the global logging subscriber.
///
/// `RUST_LOG` wins over the configured level when no explicit filter is set.
/// Only the first call installs a subscriber; later calls are ignored.
pub fn init_logging(config: &LogConfig) {
    let filter = match config.filter {
        Some(_) => EnvFilter::try_new(config.directives())
            .unwrap_or_else(|_| EnvFilter::new(config.level.to_string())),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.directives())),
    };

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(layer.pretty())
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init(),
    };

    // Already initialized
    let _ = result;
}
