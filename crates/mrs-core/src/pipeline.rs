//! Basis-fit pipeline
//!
//! Wires the stages together for one run:
//!
//! ```text
//! species ──► MoleculeAssembler ──► FIDs ──┬──────────────────────► BasisSet<FidSample>  (time)
//!                                          └─► SpectralTransformer ► BasisSet<Sample>     (frequency)
//! ```
//!
//! Everything is computed once here; callers only read the result.

use serde::{Deserialize, Serialize};

use crate::axis::{Acquisition, FrequencyAxis, FrequencyLayout, TimeAxis};
use crate::basis::{BasisSet, DegeneratePolicy, DisplaySet, Normalization, SpeciesSignal};
use crate::fft_utils::SpectralTransformer;
use crate::molecule::{MoleculeAssembler, SpeciesEntry};
use crate::relaxation::RelaxationModel;
use crate::types::{FidSample, MrsError, MrsResult, Sample};

/// Domain in which bases are built and compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDomain {
    /// Complex FIDs, normalized by time-domain peak
    #[default]
    Time,
    /// Magnitude spectra, normalized by spectral peak or area
    Frequency,
}

/// Basis construction options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitSettings {
    pub domain: SignalDomain,
    pub normalization: Normalization,
    pub degenerate: DegeneratePolicy,
    pub frequency_layout: FrequencyLayout,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            domain: SignalDomain::Time,
            normalization: Normalization::Peak,
            degenerate: DegeneratePolicy::Reject,
            frequency_layout: FrequencyLayout::Bins,
        }
    }
}

impl FitSettings {
    pub fn validate(&self) -> MrsResult<()> {
        if self.domain == SignalDomain::Time && self.normalization == Normalization::Area {
            return Err(MrsError::UnsupportedNormalization(
                "area normalization is only defined for the frequency domain".to_string(),
            ));
        }
        if let FrequencyLayout::Span(span) = self.frequency_layout {
            if !span.is_finite() || span <= 0.0 {
                return Err(MrsError::InvalidFrequencySpan(span));
            }
        }
        Ok(())
    }
}

/// Result of a basis fit in either domain
#[derive(Debug, Clone)]
pub enum BasisFit {
    Time {
        axis: TimeAxis,
        set: BasisSet<FidSample>,
    },
    Frequency {
        axis: FrequencyAxis,
        set: BasisSet<Sample>,
    },
}

impl BasisFit {
    /// Assemble, optionally transform, normalize and recombine all species
    pub fn compute(
        acquisition: &Acquisition,
        relaxation: RelaxationModel,
        settings: &FitSettings,
        species: &[SpeciesEntry],
    ) -> MrsResult<Self> {
        acquisition.validate()?;
        settings.validate()?;

        let assembler = MoleculeAssembler::new(acquisition.time_axis(), relaxation);
        let assembled = assembler.assemble_all(species)?;

        let fit = match settings.domain {
            SignalDomain::Time => {
                let signals = assembled
                    .into_iter()
                    .map(|a| SpeciesSignal {
                        name: a.name,
                        concentration: a.concentration,
                        note: a.note,
                        signal: a.fid,
                    })
                    .collect();
                let set = BasisSet::build(signals, settings.normalization, settings.degenerate, None)?;
                BasisFit::Time {
                    axis: assembler.axis().clone(),
                    set,
                }
            }
            SignalDomain::Frequency => {
                let axis = FrequencyAxis::from_layout(settings.frequency_layout, acquisition);
                let mut transformer = SpectralTransformer::new(axis);
                let fids: Vec<&[FidSample]> = assembled.iter().map(|a| a.fid.as_slice()).collect();
                let spectra = transformer.magnitude_spectra(&fids)?;
                let signals = assembled
                    .into_iter()
                    .zip(spectra)
                    .map(|(a, spectrum)| SpeciesSignal {
                        signal: spectrum,
                        name: a.name,
                        concentration: a.concentration,
                        note: a.note,
                    })
                    .collect();
                let set = BasisSet::build(
                    signals,
                    settings.normalization,
                    settings.degenerate,
                    Some(transformer.axis()),
                )?;
                BasisFit::Frequency {
                    axis: transformer.axis().clone(),
                    set,
                }
            }
        };

        tracing::info!(
            domain = ?fit.domain(),
            species = fit.species_count(),
            "basis fit computed"
        );
        Ok(fit)
    }

    pub fn domain(&self) -> SignalDomain {
        match self {
            BasisFit::Time { .. } => SignalDomain::Time,
            BasisFit::Frequency { .. } => SignalDomain::Frequency,
        }
    }

    pub fn species_count(&self) -> usize {
        match self {
            BasisFit::Time { set, .. } => set.len(),
            BasisFit::Frequency { set, .. } => set.len(),
        }
    }

    /// Sample positions the traces are plotted against
    pub fn x_axis(&self) -> &[f64] {
        match self {
            BasisFit::Time { axis, .. } => axis.as_slice(),
            BasisFit::Frequency { axis, .. } => axis.as_slice(),
        }
    }

    /// Real-valued projection of every signal
    pub fn display(&self) -> DisplaySet {
        match self {
            BasisFit::Time { axis, set } => set.display(axis.as_slice()),
            BasisFit::Frequency { axis, set } => set.display(axis.as_slice()),
        }
    }
}
