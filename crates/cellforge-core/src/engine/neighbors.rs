use crate::core::geometry;
use crate::core::models::label::SiteLabel;
use crate::core::models::structure::Structure;
use nalgebra::{Point3, Vector3};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NeighborError {
    #[error("Cutoff radius must be a positive finite number, got {0}")]
    InvalidCutoff(f64),
    #[error("Species '{species}' is not present in the structure")]
    UnknownSpecies { species: String },
    #[error(
        "Site index {index} is out of range for species '{species}' ({count} sites, indices are 1-based)"
    )]
    IndexOutOfRange {
        species: String,
        index: usize,
        count: usize,
    },
}

/// One periodic image found within the cutoff sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborImage {
    /// 1-based index of the source atom within its species group.
    pub index: usize,
    /// Cartesian position of the image, in Å.
    pub position: Point3<f64>,
    /// Cartesian distance from the center atom, in Å.
    pub distance: f64,
}

/// All in-cutoff images contributed by one species.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesNeighbors {
    pub species: String,
    pub images: Vec<NeighborImage>,
}

/// Result of a periodic neighbor search, one entry per species in input
/// order (species with no images in range keep an empty entry).
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborResult {
    pub center: SiteLabel,
    pub cutoff: f64,
    pub groups: Vec<SpeciesNeighbors>,
}

impl NeighborResult {
    pub fn group(&self, species: &str) -> Option<&SpeciesNeighbors> {
        self.groups.iter().find(|g| g.species == species)
    }

    pub fn total_images(&self) -> usize {
        self.groups.iter().map(|g| g.images.len()).sum()
    }
}

/// Finds every periodic image within `cutoff` Å of a center atom.
///
/// The search enumerates, for every atom of every species, all lattice
/// translations `(a, b, c)` with `|a| <= ceil(cutoff / |row_a|)` (likewise b
/// and c) and keeps the images whose Cartesian distance to the center is at
/// most `cutoff`. The per-axis bound is exact for orthogonal lattices and
/// conservative (possibly over-enumerating, never missing an image) for
/// non-orthogonal ones; this is the library's documented approximation.
///
/// The zero-offset image of the center atom itself is excluded. Its images
/// at nonzero offsets are genuine periodic self-neighbors and are kept.
///
/// Cost is `O(total_atoms * (2a+1)(2b+1)(2c+1))` with the bounds above, so
/// it grows cubically with the cutoff-to-lattice-length ratio; keep cutoffs
/// commensurate with the cell.
///
/// # Errors
///
/// [`NeighborError::InvalidCutoff`] unless `cutoff` is positive and finite;
/// [`NeighborError::UnknownSpecies`] / [`NeighborError::IndexOutOfRange`] if
/// the center label does not identify an atom of `structure`.
#[instrument(level = "debug", skip(structure), fields(center = %center))]
pub fn search(
    structure: &Structure,
    center: &SiteLabel,
    cutoff: f64,
) -> Result<NeighborResult, NeighborError> {
    if !(cutoff > 0.0) || !cutoff.is_finite() {
        return Err(NeighborError::InvalidCutoff(cutoff));
    }
    let center_group =
        structure
            .group(&center.species)
            .ok_or_else(|| NeighborError::UnknownSpecies {
                species: center.species.clone(),
            })?;
    let center_site = *structure.site(&center.species, center.index).ok_or_else(|| {
        NeighborError::IndexOutOfRange {
            species: center.species.clone(),
            index: center.index,
            count: center_group.len(),
        }
    })?;

    let lattice = &structure.lattice;
    let bounds = lattice.row_lengths().map(|len| (cutoff / len).ceil() as i64);
    debug!(?bounds, "periodic image search bounds");

    let mut groups = Vec::with_capacity(structure.groups.len());
    for group in &structure.groups {
        let is_center_species = group.species == center.species;
        let mut images = Vec::new();
        for (offset, site) in group.sites.iter().enumerate() {
            let index = offset + 1;
            let is_center_atom = is_center_species && index == center.index;
            for a in -bounds[0]..=bounds[0] {
                for b in -bounds[1]..=bounds[1] {
                    for c in -bounds[2]..=bounds[2] {
                        if is_center_atom && a == 0 && b == 0 && c == 0 {
                            continue;
                        }
                        let image = site + Vector3::new(a as f64, b as f64, c as f64);
                        let distance = geometry::distance(&center_site, &image, lattice);
                        if distance <= cutoff {
                            images.push(NeighborImage {
                                index,
                                position: geometry::cartesian(&image, lattice),
                                distance,
                            });
                        }
                    }
                }
            }
        }
        groups.push(SpeciesNeighbors {
            species: group.species.clone(),
            images,
        });
    }

    Ok(NeighborResult {
        center: center.clone(),
        cutoff,
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::lattice::Lattice;
    use crate::core::models::structure::SpeciesGroup;
    use nalgebra::Matrix3;

    fn cubic_cell(a: f64, groups: Vec<SpeciesGroup>) -> Structure {
        let lattice = Lattice::new(Matrix3::from_diagonal_element(a)).unwrap();
        Structure::new(lattice, 1.0, groups)
    }

    fn lone_atom(a: f64) -> Structure {
        cubic_cell(
            a,
            vec![SpeciesGroup::new("A", vec![Vector3::new(0.0, 0.0, 0.0)])],
        )
    }

    #[test]
    fn rejects_non_positive_cutoff() {
        let structure = lone_atom(4.0);
        let center = SiteLabel::new("A", 1);
        assert_eq!(
            search(&structure, &center, 0.0),
            Err(NeighborError::InvalidCutoff(0.0))
        );
        assert_eq!(
            search(&structure, &center, -1.5),
            Err(NeighborError::InvalidCutoff(-1.5))
        );
        assert!(search(&structure, &center, f64::NAN).is_err());
    }

    #[test]
    fn rejects_unknown_species() {
        let structure = lone_atom(4.0);
        assert_eq!(
            search(&structure, &SiteLabel::new("Zz", 1), 3.0),
            Err(NeighborError::UnknownSpecies {
                species: "Zz".to_string()
            })
        );
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let structure = lone_atom(4.0);
        assert_eq!(
            search(&structure, &SiteLabel::new("A", 0), 3.0),
            Err(NeighborError::IndexOutOfRange {
                species: "A".to_string(),
                index: 0,
                count: 1
            })
        );
        assert_eq!(
            search(&structure, &SiteLabel::new("A", 2), 3.0),
            Err(NeighborError::IndexOutOfRange {
                species: "A".to_string(),
                index: 2,
                count: 1
            })
        );
    }

    #[test]
    fn cutoff_below_nearest_neighbor_distance_finds_nothing() {
        let structure = lone_atom(4.0);
        let result = search(&structure, &SiteLabel::new("A", 1), 3.9).unwrap();
        assert_eq!(result.total_images(), 0);
        assert_eq!(result.groups.len(), 1);
        assert!(result.group("A").unwrap().images.is_empty());
    }

    #[test]
    fn simple_cubic_first_shell_has_six_images() {
        let structure = lone_atom(4.0);
        let result = search(&structure, &SiteLabel::new("A", 1), 4.1).unwrap();
        let images = &result.group("A").unwrap().images;
        assert_eq!(images.len(), 6);
        for image in images {
            assert_eq!(image.index, 1);
            assert!((image.distance - 4.0).abs() < 1e-9);
            // Each first-shell image sits on exactly one axis.
            let on_axis = [image.position.x, image.position.y, image.position.z]
                .iter()
                .filter(|v| v.abs() > 1e-9)
                .count();
            assert_eq!(on_axis, 1);
        }
        assert_eq!(result.total_images(), 6);
    }

    #[test]
    fn second_shell_adds_twelve_edge_images() {
        let structure = lone_atom(4.0);
        // sqrt(2) * 4.0 = 5.657 < 5.8 < 4.0 * 2
        let result = search(&structure, &SiteLabel::new("A", 1), 5.8).unwrap();
        assert_eq!(result.total_images(), 6 + 12);
    }

    #[test]
    fn zero_offset_neighbors_of_other_atoms_are_kept() {
        let structure = cubic_cell(
            4.0,
            vec![
                SpeciesGroup::new("A", vec![Vector3::new(0.0, 0.0, 0.0)]),
                SpeciesGroup::new("B", vec![Vector3::new(0.5, 0.0, 0.0)]),
            ],
        );
        let result = search(&structure, &SiteLabel::new("A", 1), 2.1).unwrap();
        assert!(result.group("A").unwrap().images.is_empty());
        let b_images = &result.group("B").unwrap().images;
        // B at +2.0 Å and its -a image at -2.0 Å.
        assert_eq!(b_images.len(), 2);
        for image in b_images {
            assert!((image.distance - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn result_lists_every_species_in_input_order() {
        let structure = cubic_cell(
            10.0,
            vec![
                SpeciesGroup::new("Li", vec![Vector3::new(0.0, 0.0, 0.0)]),
                SpeciesGroup::new("O", vec![Vector3::new(0.5, 0.5, 0.5)]),
            ],
        );
        let result = search(&structure, &SiteLabel::new("Li", 1), 1.0).unwrap();
        let order: Vec<&str> = result.groups.iter().map(|g| g.species.as_str()).collect();
        assert_eq!(order, vec!["Li", "O"]);
    }

    #[test]
    fn reported_positions_are_cartesian() {
        let structure = cubic_cell(
            4.0,
            vec![
                SpeciesGroup::new("A", vec![Vector3::new(0.0, 0.0, 0.0)]),
                SpeciesGroup::new("B", vec![Vector3::new(0.25, 0.0, 0.0)]),
            ],
        );
        let result = search(&structure, &SiteLabel::new("A", 1), 1.5).unwrap();
        let b = &result.group("B").unwrap().images;
        assert_eq!(b.len(), 1);
        assert!((b[0].position - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-9);
    }
}
