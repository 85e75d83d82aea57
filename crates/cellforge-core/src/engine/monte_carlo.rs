use crate::core::io::poscar::{PoscarError, PoscarFile, PoscarMetadata};
use crate::core::io::traits::StructureFile;
use crate::core::models::lattice::Lattice;
use crate::core::models::structure::{SpeciesGroup, Structure};
use nalgebra::Vector3;
use rand::Rng;
use rand::seq::SliceRandom;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Boltzmann constant in eV/K.
pub const BOLTZMANN_EV_PER_K: f64 = 8.6173303e-5;

#[derive(Debug, Error)]
pub enum EnergyError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to write candidate structure: {0}")]
    CandidateWrite(#[from] PoscarError),
    #[error("Energy calculator '{program}' exited with {status}")]
    CalculatorFailed { program: String, status: String },
    #[error("Marker '{marker}' not found in calculator output '{path}'")]
    MarkerNotFound { marker: String, path: PathBuf },
    #[error("Energy field {field} of line '{line}' is not a number")]
    InvalidEnergy { field: usize, line: String },
}

/// Scores a candidate structure with a single energy value (eV).
///
/// The Monte Carlo driver is generic over this trait so tests can script
/// energies without touching the filesystem or spawning processes.
pub trait EnergyModel {
    fn evaluate(&mut self, candidate: &Structure) -> Result<f64, EnergyError>;
}

/// Energy evaluation by invoking an external calculator binary.
///
/// Each evaluation writes the candidate as a Direct POSCAR to `input_path`,
/// runs `program` with `args` in `workdir`, then scans `output_path` for the
/// first line containing `energy_marker` and parses whitespace field
/// `energy_field` (0-based) of that line as the energy. A calculator that
/// consumes another input format is expected to be wrapped in a small
/// conversion script.
///
/// Failures are deterministic for a given candidate and are surfaced
/// immediately; there is no retry.
#[derive(Debug, Clone)]
pub struct ExternalEnergyModel {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub energy_marker: String,
    pub energy_field: usize,
}

impl EnergyModel for ExternalEnergyModel {
    #[instrument(level = "debug", skip_all, fields(program = %self.program.display()))]
    fn evaluate(&mut self, candidate: &Structure) -> Result<f64, EnergyError> {
        let input = self.workdir.join(&self.input_path);
        PoscarFile::write_to_path(candidate, &PoscarMetadata::titled("mc candidate"), &input)?;

        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.workdir)
            .status()?;
        if !status.success() {
            return Err(EnergyError::CalculatorFailed {
                program: self.program.display().to_string(),
                status: status.to_string(),
            });
        }

        let output = self.workdir.join(&self.output_path);
        let reader = BufReader::new(File::open(&output)?);
        for line in reader.lines() {
            let line = line?;
            if line.contains(&self.energy_marker) {
                let value = line.split_whitespace().nth(self.energy_field).ok_or_else(
                    || EnergyError::InvalidEnergy {
                        field: self.energy_field,
                        line: line.clone(),
                    },
                )?;
                return value.parse().map_err(|_| EnergyError::InvalidEnergy {
                    field: self.energy_field,
                    line: line.clone(),
                });
            }
        }
        Err(EnergyError::MarkerNotFound {
            marker: self.energy_marker.clone(),
            path: output,
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProposalError {
    #[error("Occupancy pool has {pool} sites but assignments require {required}")]
    PoolTooSmall { pool: usize, required: usize },
}

/// Generates candidate structures for the Metropolis loop.
pub trait Proposal {
    fn propose<R: Rng>(&mut self, rng: &mut R) -> Result<Structure, ProposalError>;
}

/// Random occupancy assignment over a fixed pool of candidate sites.
///
/// The pool of fractional sites is shuffled and partitioned sequentially
/// into one group per `(species, count)` assignment; pool sites left over
/// after all assignments are vacancies. `fixed` species are carried into
/// every candidate unchanged. This generalizes cation/vacancy shuffling in
/// partially occupied frameworks.
#[derive(Debug, Clone)]
pub struct OccupancyShuffle {
    lattice: Lattice,
    pool: Vec<Vector3<f64>>,
    assignments: Vec<(String, usize)>,
    fixed: Vec<SpeciesGroup>,
}

impl OccupancyShuffle {
    pub fn new(
        lattice: Lattice,
        pool: Vec<Vector3<f64>>,
        assignments: Vec<(String, usize)>,
        fixed: Vec<SpeciesGroup>,
    ) -> Result<Self, ProposalError> {
        let required: usize = assignments.iter().map(|(_, n)| n).sum();
        if required > pool.len() {
            return Err(ProposalError::PoolTooSmall {
                pool: pool.len(),
                required,
            });
        }
        Ok(Self {
            lattice,
            pool,
            assignments,
            fixed,
        })
    }
}

impl Proposal for OccupancyShuffle {
    fn propose<R: Rng>(&mut self, rng: &mut R) -> Result<Structure, ProposalError> {
        let mut shuffled = self.pool.clone();
        shuffled.shuffle(rng);

        let mut groups = Vec::with_capacity(self.assignments.len() + self.fixed.len());
        let mut cursor = 0;
        for (species, count) in &self.assignments {
            let sites = shuffled[cursor..cursor + count].to_vec();
            cursor += count;
            groups.push(SpeciesGroup::new(species.clone(), sites));
        }
        groups.extend(self.fixed.iter().cloned());

        Ok(Structure::new(self.lattice.clone(), 1.0, groups))
    }
}

#[derive(Debug, Error)]
pub enum McError {
    #[error("Temperature must be positive, got {0} K")]
    InvalidTemperature(f64),
    #[error(transparent)]
    Energy(#[from] EnergyError),
    #[error(transparent)]
    Proposal(#[from] ProposalError),
}

/// All knobs of one Metropolis run. No global state, no implicit working
/// directory: every path and physical constant the driver needs is here.
#[derive(Debug, Clone, PartialEq)]
pub struct McConfig {
    /// Simulation temperature in K.
    pub temperature_k: f64,
    /// Number of proposal/evaluation iterations.
    pub steps: usize,
    /// Reference energy (eV) the first candidate is compared against.
    pub initial_energy: f64,
}

/// Per-step progress report for user feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McProgress {
    pub step: usize,
    pub total: usize,
    pub current_energy: f64,
    pub accepted: usize,
}

/// Outcome of a Metropolis run.
#[derive(Debug, Clone)]
pub struct McOutcome {
    /// Chain state after the last step; `None` if no move was ever accepted.
    pub structure: Option<Structure>,
    /// Energy of the chain state (the initial reference if nothing was
    /// accepted).
    pub energy: f64,
    /// Number of accepted moves.
    pub accepted: usize,
    /// Energies of accepted moves, in order.
    pub trace: Vec<f64>,
}

/// Runs a Metropolis Monte Carlo chain.
///
/// Each step draws a candidate from `proposal`, scores it with `model`, and
/// accepts it with probability `min(1, exp(-(E_new - E_old) / (k_B * T)))`.
/// Downhill moves are always accepted; uphill moves survive with Boltzmann
/// probability. The chain is deterministic given a seeded `rng`.
///
/// # Errors
///
/// Fails fast on a non-positive temperature or on any proposal/energy
/// failure; no partial recovery is attempted.
#[instrument(level = "info", skip_all, fields(steps = config.steps, temperature_k = config.temperature_k))]
pub fn run<P, M, R>(
    config: &McConfig,
    proposal: &mut P,
    model: &mut M,
    rng: &mut R,
    mut on_progress: impl FnMut(&McProgress),
) -> Result<McOutcome, McError>
where
    P: Proposal,
    M: EnergyModel,
    R: Rng,
{
    if !(config.temperature_k > 0.0) {
        return Err(McError::InvalidTemperature(config.temperature_k));
    }
    let beta = 1.0 / (BOLTZMANN_EV_PER_K * config.temperature_k);

    let mut current_energy = config.initial_energy;
    let mut current: Option<Structure> = None;
    let mut accepted = 0;
    let mut trace = Vec::new();

    for step in 0..config.steps {
        let candidate = proposal.propose(rng)?;
        let candidate_energy = model.evaluate(&candidate)?;

        let acceptance = (-(candidate_energy - current_energy) * beta).exp();
        if rng.r#gen::<f64>() <= acceptance {
            current_energy = candidate_energy;
            current = Some(candidate);
            accepted += 1;
            trace.push(candidate_energy);
            debug!(step, energy = candidate_energy, "move accepted");
        }

        on_progress(&McProgress {
            step: step + 1,
            total: config.steps,
            current_energy,
            accepted,
        });
    }

    if accepted == 0 && config.steps > 0 {
        warn!("No move was accepted; the initial reference energy may be too low");
    }

    Ok(McOutcome {
        structure: current,
        energy: current_energy,
        accepted,
        trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn cubic_lattice(a: f64) -> Lattice {
        Lattice::new(Matrix3::from_diagonal_element(a)).unwrap()
    }

    fn four_site_pool() -> Vec<Vector3<f64>> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.5, 0.0, 0.0),
            Vector3::new(0.0, 0.5, 0.0),
            Vector3::new(0.0, 0.0, 0.5),
        ]
    }

    /// Returns scripted energies in order, then repeats the last one.
    struct ScriptedModel {
        energies: Vec<f64>,
        calls: usize,
    }

    impl EnergyModel for ScriptedModel {
        fn evaluate(&mut self, _candidate: &Structure) -> Result<f64, EnergyError> {
            let idx = self.calls.min(self.energies.len() - 1);
            self.calls += 1;
            Ok(self.energies[idx])
        }
    }

    struct FixedProposal {
        structure: Structure,
    }

    impl Proposal for FixedProposal {
        fn propose<R: Rng>(&mut self, _rng: &mut R) -> Result<Structure, ProposalError> {
            Ok(self.structure.clone())
        }
    }

    fn fixed_proposal() -> FixedProposal {
        FixedProposal {
            structure: Structure::new(
                cubic_lattice(3.0),
                1.0,
                vec![SpeciesGroup::new(
                    "A",
                    vec![Vector3::new(0.0, 0.0, 0.0)],
                )],
            ),
        }
    }

    #[test]
    fn occupancy_shuffle_rejects_oversubscribed_pool() {
        let result = OccupancyShuffle::new(
            cubic_lattice(3.0),
            four_site_pool(),
            vec![("Li".to_string(), 3), ("Mn".to_string(), 2)],
            vec![],
        );
        assert_eq!(
            result.unwrap_err(),
            ProposalError::PoolTooSmall {
                pool: 4,
                required: 5
            }
        );
    }

    #[test]
    fn occupancy_shuffle_partitions_the_pool_without_overlap() {
        let mut shuffle = OccupancyShuffle::new(
            cubic_lattice(3.0),
            four_site_pool(),
            vec![("Li".to_string(), 2), ("Mn".to_string(), 1)],
            vec![SpeciesGroup::new(
                "O",
                vec![Vector3::new(0.25, 0.25, 0.25)],
            )],
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let candidate = shuffle.propose(&mut rng).unwrap();

        let order: Vec<&str> = candidate.species().collect();
        assert_eq!(order, vec!["Li", "Mn", "O"]);
        assert_eq!(candidate.group("Li").unwrap().len(), 2);
        assert_eq!(candidate.group("Mn").unwrap().len(), 1);
        assert_eq!(candidate.group("O").unwrap().len(), 1);

        // Every mobile site must come from the pool, each at most once.
        let pool = four_site_pool();
        let mut drawn: Vec<&Vector3<f64>> = candidate.group("Li").unwrap().sites.iter().collect();
        drawn.extend(candidate.group("Mn").unwrap().sites.iter());
        assert_eq!(drawn.len(), 3);
        for site in &drawn {
            assert!(pool.contains(site));
        }
        for (i, a) in drawn.iter().enumerate() {
            for b in &drawn[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn occupancy_shuffle_is_deterministic_under_a_seed() {
        let make = || {
            OccupancyShuffle::new(
                cubic_lattice(3.0),
                four_site_pool(),
                vec![("Li".to_string(), 2)],
                vec![],
            )
            .unwrap()
        };
        let a = make().propose(&mut StdRng::seed_from_u64(42)).unwrap();
        let b = make().propose(&mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_non_positive_temperature() {
        let config = McConfig {
            temperature_k: 0.0,
            steps: 1,
            initial_energy: 0.0,
        };
        let mut model = ScriptedModel {
            energies: vec![0.0],
            calls: 0,
        };
        let result = run(
            &config,
            &mut fixed_proposal(),
            &mut model,
            &mut StdRng::seed_from_u64(0),
            |_| {},
        );
        assert!(matches!(result, Err(McError::InvalidTemperature(t)) if t == 0.0));
    }

    #[test]
    fn downhill_moves_are_always_accepted() {
        let config = McConfig {
            temperature_k: 300.0,
            steps: 3,
            initial_energy: 0.0,
        };
        let mut model = ScriptedModel {
            energies: vec![-1.0, -2.0, -3.0],
            calls: 0,
        };
        let outcome = run(
            &config,
            &mut fixed_proposal(),
            &mut model,
            &mut StdRng::seed_from_u64(0),
            |_| {},
        )
        .unwrap();
        assert_eq!(outcome.accepted, 3);
        assert_eq!(outcome.trace, vec![-1.0, -2.0, -3.0]);
        assert_eq!(outcome.energy, -3.0);
        assert!(outcome.structure.is_some());
    }

    #[test]
    fn a_steep_uphill_move_is_rejected_at_room_temperature() {
        // 10 eV against k_B * 300 K: acceptance ~ e^-386, far below any
        // draw from a uniform RNG.
        let config = McConfig {
            temperature_k: 300.0,
            steps: 1,
            initial_energy: 0.0,
        };
        let mut model = ScriptedModel {
            energies: vec![10.0],
            calls: 0,
        };
        let outcome = run(
            &config,
            &mut fixed_proposal(),
            &mut model,
            &mut StdRng::seed_from_u64(1),
            |_| {},
        )
        .unwrap();
        assert_eq!(outcome.accepted, 0);
        assert!(outcome.structure.is_none());
        assert_eq!(outcome.energy, 0.0);
    }

    #[test]
    fn progress_callback_sees_every_step() {
        let config = McConfig {
            temperature_k: 300.0,
            steps: 4,
            initial_energy: 0.0,
        };
        let mut model = ScriptedModel {
            energies: vec![-1.0],
            calls: 0,
        };
        let mut seen = Vec::new();
        run(
            &config,
            &mut fixed_proposal(),
            &mut model,
            &mut StdRng::seed_from_u64(0),
            |p| seen.push(p.step),
        )
        .unwrap();
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }
}
