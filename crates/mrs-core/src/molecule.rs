//! Molecule Assembly
//!
//! A species (metabolite) contributes one or more multiplets to the
//! spectrum. Its FID is the sum of its multiplets' undamped signals, decayed
//! once with the run's T2:
//!
//! ```text
//! species B:  singlet(140) ──┐
//!                            ├── Σ ── × exp(-t/T2) ──► FID_B
//!             doublet(200) ──┘
//! ```
//!
//! Species order is significant for display (label stacking, reveal order)
//! and is preserved through every stage.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::axis::TimeAxis;
use crate::multiplet::{sum_signals, MultipletDescriptor};
use crate::relaxation::RelaxationModel;
use crate::types::{FidBuffer, MrsError, MrsResult};

/// One chemical species of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesEntry {
    /// Unique display name
    pub name: String,
    /// Multiplets making up the species
    pub components: Vec<MultipletDescriptor>,
    /// Known concentration (arbitrary units, > 0)
    pub concentration: f64,
    /// Optional annotation shown under the label, e.g. "S7 + D3"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SpeciesEntry {
    pub fn new(
        name: impl Into<String>,
        components: Vec<MultipletDescriptor>,
        concentration: f64,
    ) -> Self {
        Self {
            name: name.into(),
            components,
            concentration,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn validate(&self) -> MrsResult<()> {
        if !self.concentration.is_finite() || self.concentration <= 0.0 {
            return Err(MrsError::InvalidConcentration {
                name: self.name.clone(),
                value: self.concentration,
            });
        }
        for component in &self.components {
            component.validate()?;
        }
        Ok(())
    }
}

/// Check a species collection: non-empty, unique names, valid entries
pub fn validate_species(species: &[SpeciesEntry]) -> MrsResult<()> {
    if species.is_empty() {
        return Err(MrsError::EmptySpecies);
    }
    let mut seen = HashSet::new();
    for entry in species {
        if !seen.insert(entry.name.as_str()) {
            return Err(MrsError::DuplicateSpecies(entry.name.clone()));
        }
        entry.validate()?;
    }
    Ok(())
}

/// Decayed FID of one species together with its identity
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledSpecies {
    pub name: String,
    pub concentration: f64,
    pub note: Option<String>,
    pub fid: FidBuffer,
}

/// Builds per-species decayed FIDs on a shared time axis
#[derive(Debug, Clone)]
pub struct MoleculeAssembler {
    axis: TimeAxis,
    relaxation: RelaxationModel,
}

impl MoleculeAssembler {
    pub fn new(axis: TimeAxis, relaxation: RelaxationModel) -> Self {
        Self { axis, relaxation }
    }

    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    pub fn relaxation(&self) -> &RelaxationModel {
        &self.relaxation
    }

    /// Sum the species' multiplets and apply the decay envelope
    pub fn assemble(&self, species: &SpeciesEntry) -> MrsResult<FidBuffer> {
        species.validate()?;
        let parts = species
            .components
            .iter()
            .map(|c| c.synthesize(&self.axis))
            .collect::<MrsResult<Vec<_>>>()?;
        let mut fid = sum_signals(&parts, self.axis.len())?;
        self.relaxation.apply_inplace(&mut fid, &self.axis)?;
        tracing::debug!(
            species = %species.name,
            components = species.components.len(),
            "assembled species FID"
        );
        Ok(fid)
    }

    /// Assemble every species once, preserving order
    pub fn assemble_all(&self, species: &[SpeciesEntry]) -> MrsResult<Vec<AssembledSpecies>> {
        validate_species(species)?;

        #[cfg(feature = "parallel")]
        let fids: Vec<MrsResult<FidBuffer>> =
            species.par_iter().map(|s| self.assemble(s)).collect();
        #[cfg(not(feature = "parallel"))]
        let fids: Vec<MrsResult<FidBuffer>> = species.iter().map(|s| self.assemble(s)).collect();

        species
            .iter()
            .zip(fids)
            .map(|(entry, fid)| {
                Ok(AssembledSpecies {
                    name: entry.name.clone(),
                    concentration: entry.concentration,
                    note: entry.note.clone(),
                    fid: fid?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Acquisition;
    use crate::types::complex_ops;
    use approx::assert_relative_eq;

    fn assembler() -> MoleculeAssembler {
        let acq = Acquisition::default();
        MoleculeAssembler::new(acq.time_axis(), RelaxationModel::new(0.18).unwrap())
    }

    fn species_b() -> SpeciesEntry {
        SpeciesEntry::new(
            "B",
            vec![
                MultipletDescriptor::singlet(140.0),
                MultipletDescriptor::pattern(200.0, vec![1.0, 1.0], 7.0),
            ],
            10.0,
        )
        .with_note("S7 + D3")
    }

    #[test]
    fn test_assemble_sums_components() {
        let fid = assembler().assemble(&species_b()).unwrap();
        assert_eq!(fid.len(), 2048);
        // Three unit lines add up at t = 0
        assert_relative_eq!(fid[0].re, 3.0, epsilon = 1e-12);
        assert!(complex_ops::peak_magnitude(&fid[1536..]) < 0.1);
    }

    #[test]
    fn test_assemble_all_preserves_order() {
        let species = vec![
            SpeciesEntry::new("D", vec![MultipletDescriptor::singlet(320.0)], 12.0),
            species_b(),
            SpeciesEntry::new("A", vec![MultipletDescriptor::singlet(80.0)], 5.0),
        ];
        let set = assembler().assemble_all(&species).unwrap();
        let names: Vec<&str> = set.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["D", "B", "A"]);
        assert_eq!(set[1].note.as_deref(), Some("S7 + D3"));
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(validate_species(&[]), Err(MrsError::EmptySpecies));

        let dup = vec![species_b(), species_b()];
        assert_eq!(
            validate_species(&dup),
            Err(MrsError::DuplicateSpecies("B".to_string()))
        );

        let zero = vec![SpeciesEntry::new("Z", vec![], 0.0)];
        assert!(matches!(
            validate_species(&zero),
            Err(MrsError::InvalidConcentration { .. })
        ));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let species = crate::config::demo_species();
        let asm = assembler();

        let parallel = asm.assemble_all(&species).unwrap();
        let sequential = species.iter().fold(Vec::new(), |mut acc, entry| {
            acc.push(asm.assemble(entry).unwrap());
            acc
        });

        assert_eq!(parallel.len(), sequential.len());
        for (p, (s, entry)) in parallel.iter().zip(sequential.iter().zip(&species)) {
            assert_eq!(p.name, entry.name);
            assert_eq!(&p.fid, s);
        }
    }

    #[test]
    fn test_species_without_components_is_silent() {
        let silent = SpeciesEntry::new("S", vec![], 1.0);
        let fid = assembler().assemble(&silent).unwrap();
        assert!(fid.iter().all(|s| s.norm() == 0.0));
    }
}
