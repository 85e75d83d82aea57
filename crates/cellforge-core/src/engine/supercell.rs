use crate::core::models::structure::{SpeciesGroup, Structure};
use nalgebra::Vector3;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SupercellError {
    #[error("Repetition count along axis {axis} must be >= 1, got {value}")]
    InvalidRepetition { axis: usize, value: i64 },
}

/// Builds a supercell by repeating `structure` `repetitions[d]` times along
/// lattice vector `d`.
///
/// The new lattice has row `d` multiplied by `repetitions[d]`; every species
/// group grows by the product of the three counts, with all fractional
/// coordinates renormalized into [0, 1) of the enlarged cell. Per species the
/// result is stably sorted by fractional z, so identical inputs always
/// produce byte-identical output files.
///
/// # Errors
///
/// Returns [`SupercellError::InvalidRepetition`] if any repetition count is
/// less than 1.
#[instrument(level = "debug", skip(structure), fields(atoms = structure.total_atoms()))]
pub fn build(structure: &Structure, repetitions: [i64; 3]) -> Result<Structure, SupercellError> {
    for (axis, &value) in repetitions.iter().enumerate() {
        if value < 1 {
            return Err(SupercellError::InvalidRepetition { axis, value });
        }
    }

    let factors = repetitions.map(|r| r as f64);
    let lattice = structure.lattice.scaled_rows(factors);

    let groups = structure
        .groups
        .iter()
        .map(|group| {
            let mut sites = group.sites.clone();
            for (axis, &count) in repetitions.iter().enumerate() {
                sites = replicate_axis(&sites, axis, count as usize);
            }
            sites.sort_by(|p, q| p[2].total_cmp(&q[2]));
            SpeciesGroup::new(group.species.clone(), sites)
        })
        .collect();

    Ok(Structure::new(lattice, 1.0, groups))
}

/// Expands a coordinate list `count` times along one axis.
///
/// Each input point yields `count` copies; copy `k` gets `+k` added to its
/// axis component, and the component is then divided by `count` to land in
/// [0, 1) of the enlarged cell. Applying this once per axis composes into
/// the full Nx*Ny*Nz replication without a triple nested sum.
fn replicate_axis(sites: &[Vector3<f64>], axis: usize, count: usize) -> Vec<Vector3<f64>> {
    let mut expanded = Vec::with_capacity(sites.len() * count);
    for site in sites {
        for k in 0..count {
            let mut image = *site;
            image[axis] = (image[axis] + k as f64) / count as f64;
            expanded.push(image);
        }
    }
    expanded
}
