use crate::core::io::poscar::{PoscarError, PoscarFile, PoscarMetadata};
use crate::core::io::traits::StructureFile;
use crate::engine::monte_carlo::{
    self, EnergyModel, ExternalEnergyModel, McConfig, McError, McProgress, OccupancyShuffle,
    ProposalError,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum AnnealError {
    #[error("Failed to read '{path}': {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: PoscarError,
    },
    #[error("Pool species '{species}' is not present in the template structure")]
    UnknownPoolSpecies { species: String },
    #[error("Number of independent runs must be >= 1, got {0}")]
    InvalidRuns(usize),
    #[error(transparent)]
    Proposal(#[from] ProposalError),
    #[error(transparent)]
    MonteCarlo(#[from] McError),
    #[error("Failed to write '{path}': {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: PoscarError,
    },
}

/// Everything an annealing session needs, spelled out explicitly: template
/// and output paths, the occupancy model, the Metropolis parameters, and the
/// external calculator invocation. Nothing is read from the process
/// environment or the current working directory.
#[derive(Debug, Clone)]
pub struct AnnealSpec {
    /// POSCAR supplying the lattice, the mobile site pool, and the fixed
    /// species.
    pub template: PathBuf,
    /// Species in the template whose sites form the mobile pool. Its group
    /// is consumed; the remaining species are carried into every candidate
    /// unchanged.
    pub pool_species: String,
    /// Species drawn from the pool each step, with their site counts. Pool
    /// sites not assigned to any species are vacancies.
    pub assignments: Vec<(String, usize)>,
    pub monte_carlo: McConfig,
    /// Number of independent chains. Each restarts from the initial
    /// reference energy with a fresh random occupancy and writes its own
    /// output file.
    pub runs: usize,
    /// RNG seed; a random seed is drawn when absent.
    pub seed: Option<u64>,
    pub calculator: ExternalEnergyModel,
    /// Where the final accepted structure is written. With more than one
    /// run, each output file name is tagged with the run number and its
    /// final energy.
    pub output: PathBuf,
}

/// Outcome of one independent chain.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealRun {
    /// 1-based run number.
    pub run: usize,
    /// Final chain energy (the initial reference if nothing was accepted).
    pub energy: f64,
    /// Number of accepted moves.
    pub accepted: usize,
    /// Path written for this run; `None` if no move was accepted.
    pub path: Option<PathBuf>,
}

/// Runs Metropolis annealing with the external calculator from `spec`.
pub fn run(
    spec: &AnnealSpec,
    on_progress: impl FnMut(&McProgress),
) -> Result<Vec<AnnealRun>, AnnealError> {
    let mut model = spec.calculator.clone();
    run_with_model(spec, &mut model, on_progress)
}

/// Same as [`run`] but with a caller-supplied energy model, so the loop can
/// be exercised without spawning processes.
///
/// The progress callback sees one monotone step counter spanning all runs,
/// with `total = runs * steps`.
#[instrument(level = "info", skip_all, fields(template = %spec.template.display(), runs = spec.runs))]
pub fn run_with_model(
    spec: &AnnealSpec,
    model: &mut impl EnergyModel,
    mut on_progress: impl FnMut(&McProgress),
) -> Result<Vec<AnnealRun>, AnnealError> {
    if spec.runs == 0 {
        return Err(AnnealError::InvalidRuns(0));
    }

    let (structure, _) =
        PoscarFile::read_from_path(&spec.template).map_err(|source| AnnealError::Read {
            path: spec.template.clone(),
            source,
        })?;

    let pool_group =
        structure
            .group(&spec.pool_species)
            .ok_or_else(|| AnnealError::UnknownPoolSpecies {
                species: spec.pool_species.clone(),
            })?;
    let pool = pool_group.sites.clone();
    let fixed: Vec<_> = structure
        .groups
        .iter()
        .filter(|g| g.species != spec.pool_species)
        .cloned()
        .collect();

    let mut proposal = OccupancyShuffle::new(
        structure.lattice.clone(),
        pool,
        spec.assignments.clone(),
        fixed,
    )?;

    let mut rng = match spec.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let total_steps = spec.runs * spec.monte_carlo.steps;
    let mut reports = Vec::with_capacity(spec.runs);
    for run in 1..=spec.runs {
        let offset = (run - 1) * spec.monte_carlo.steps;
        let outcome = monte_carlo::run(
            &spec.monte_carlo,
            &mut proposal,
            model,
            &mut rng,
            |progress| {
                on_progress(&McProgress {
                    step: offset + progress.step,
                    total: total_steps,
                    ..*progress
                });
            },
        )?;

        let path = match &outcome.structure {
            Some(final_structure) => {
                let path = run_output_path(&spec.output, run, outcome.energy, spec.runs);
                let metadata = PoscarMetadata::titled(format!(
                    "annealed occupancies, E = {:.6} eV",
                    outcome.energy
                ));
                PoscarFile::write_to_path(final_structure, &metadata, &path).map_err(|source| {
                    AnnealError::Write {
                        path: path.clone(),
                        source,
                    }
                })?;
                info!(run, energy = outcome.energy, accepted = outcome.accepted, path = %path.display(), "annealed structure written");
                Some(path)
            }
            None => None,
        };

        reports.push(AnnealRun {
            run,
            energy: outcome.energy,
            accepted: outcome.accepted,
            path,
        });
    }

    Ok(reports)
}

/// Output path for one run. A single run writes exactly the configured
/// path; multiple runs disambiguate by run number and final energy.
fn run_output_path(output: &Path, run: usize, energy: f64, runs: usize) -> PathBuf {
    if runs == 1 {
        return output.to_path_buf();
    }
    let stem = output
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("annealed");
    match output.extension().and_then(OsStr::to_str) {
        Some(ext) => output.with_file_name(format!("{stem}_{run:02}_E{energy:.6}.{ext}")),
        None => output.with_file_name(format!("{stem}_{run:02}_E{energy:.6}")),
    }
}
