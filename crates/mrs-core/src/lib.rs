//! # MRS Basis-Fitting Core Library
//!
//! This crate synthesizes the signals used to explain how magnetic resonance
//! spectroscopy (MRS) quantifies metabolites: every species is built from
//! multiplet resonances, damped by T2 relaxation, normalized into a unit
//! basis and recombined with its concentration.
//!
//! ## Overview
//!
//! - **Multiplets**: singlets, doublets, triplets, quartets or explicit line lists
//! - **Relaxation**: mono-exponential `exp(-t/T2)` decay
//! - **Assembly**: one complex FID per species
//! - **Spectra**: centred magnitude spectra on a frequency axis
//! - **Basis sets**: peak or area normalized bases, composite and fitted sums
//! - **Quantification**: initial FID amplitude and spectral area
//!
//! ## Signal Flow
//!
//! ```text
//! Multiplets → Σ lines → × exp(-t/T2) → FID ─┬─────────→ time basis   ─┐
//!                                             └→ |FFT| → spectral basis ┴→ composite / fitted
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use mrs_core::prelude::*;
//!
//! let config = MrsConfig::time_domain_demo();
//! let fit = BasisFit::compute(
//!     &config.acquisition,
//!     config.relaxation_model().unwrap(),
//!     &config.fit,
//!     &config.species,
//! )
//! .unwrap();
//!
//! let display = fit.display();
//! assert_eq!(display.composite, display.fitted);
//! ```

pub mod axis;
pub mod basis;
pub mod config;
pub mod fft_utils;
pub mod molecule;
pub mod multiplet;
pub mod observe;
pub mod pipeline;
pub mod quantify;
pub mod relaxation;
pub mod types;

// Re-export main types
pub use axis::{Acquisition, FrequencyAxis, FrequencyLayout, TimeAxis};
pub use basis::{BasisEntry, BasisSample, BasisSet, DegeneratePolicy, DisplaySet, DisplaySpecies, Normalization};
pub use config::{ConfigError, MrsConfig, ScenarioKind};
pub use fft_utils::{FftProcessor, SpectralPeak, SpectralTransformer};
pub use molecule::{AssembledSpecies, MoleculeAssembler, SpeciesEntry};
pub use multiplet::MultipletDescriptor;
pub use pipeline::{BasisFit, FitSettings, SignalDomain};
pub use relaxation::RelaxationModel;
pub use types::{Complex, FidBuffer, FidSample, MrsError, MrsResult, Sample};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::axis::{Acquisition, FrequencyAxis, TimeAxis};
    pub use crate::basis::{DegeneratePolicy, Normalization};
    pub use crate::config::{MrsConfig, ScenarioKind};
    pub use crate::molecule::{MoleculeAssembler, SpeciesEntry};
    pub use crate::multiplet::MultipletDescriptor;
    pub use crate::pipeline::{BasisFit, FitSettings, SignalDomain};
    pub use crate::relaxation::RelaxationModel;
    pub use crate::types::{Complex, FidSample, MrsError, MrsResult};
}
