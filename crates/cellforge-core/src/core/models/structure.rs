use super::lattice::Lattice;
use nalgebra::Vector3;

/// One atomic species and its ordered fractional coordinates.
///
/// Each group owns its coordinate vector outright; no two groups ever share
/// backing storage, so mutating one species can never leak into another.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesGroup {
    /// Element symbol as written in the source file (e.g. "Li", "O").
    pub species: String,
    /// Fractional coordinates, conventionally each component in [0, 1).
    /// Order follows the source file and determines 1-based site indices.
    pub sites: Vec<Vector3<f64>>,
}

impl SpeciesGroup {
    pub fn new(species: impl Into<String>, sites: Vec<Vector3<f64>>) -> Self {
        Self {
            species: species.into(),
            sites,
        }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// An immutable in-memory crystal structure.
///
/// Holds the (already scaled) lattice, the scaling factor read from the
/// source file, and one [`SpeciesGroup`] per species in file order. Built
/// once by a parser or by the supercell engine, then passed around by
/// shared reference; nothing in this library mutates a `Structure` after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub lattice: Lattice,
    /// Scaling factor from line 2 of the source file. The lattice rows have
    /// it applied already; it is retained for provenance only.
    pub scale: f64,
    pub groups: Vec<SpeciesGroup>,
}

impl Structure {
    pub fn new(lattice: Lattice, scale: f64, groups: Vec<SpeciesGroup>) -> Self {
        Self {
            lattice,
            scale,
            groups,
        }
    }

    /// Species symbols in file order.
    pub fn species(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.species.as_str())
    }

    /// The coordinate group for `species`, if present.
    pub fn group(&self, species: &str) -> Option<&SpeciesGroup> {
        self.groups.iter().find(|g| g.species == species)
    }

    /// Fractional coordinate of the site with 1-based `index` in `species`.
    pub fn site(&self, species: &str, index: usize) -> Option<&Vector3<f64>> {
        self.group(species)
            .and_then(|g| index.checked_sub(1).and_then(|i| g.sites.get(i)))
    }

    /// Total number of atoms across all species.
    pub fn total_atoms(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;

    fn two_species() -> Structure {
        let lattice = Lattice::new(Matrix3::from_diagonal_element(4.0)).unwrap();
        Structure::new(
            lattice,
            1.0,
            vec![
                SpeciesGroup::new(
                    "Li",
                    vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5)],
                ),
                SpeciesGroup::new("O", vec![Vector3::new(0.25, 0.25, 0.25)]),
            ],
        )
    }

    #[test]
    fn species_preserves_insertion_order() {
        let structure = two_species();
        let order: Vec<&str> = structure.species().collect();
        assert_eq!(order, vec!["Li", "O"]);
    }

    #[test]
    fn site_lookup_is_one_based() {
        let structure = two_species();
        assert_eq!(
            structure.site("Li", 2),
            Some(&Vector3::new(0.5, 0.5, 0.5))
        );
        assert_eq!(structure.site("Li", 0), None);
        assert_eq!(structure.site("Li", 3), None);
    }

    #[test]
    fn site_lookup_on_absent_species_is_none() {
        let structure = two_species();
        assert_eq!(structure.site("Zz", 1), None);
    }

    #[test]
    fn total_atoms_sums_all_groups() {
        assert_eq!(two_species().total_atoms(), 3);
    }

    #[test]
    fn groups_own_independent_storage() {
        let mut structure = two_species();
        structure.groups[0].sites.push(Vector3::new(0.1, 0.1, 0.1));
        assert_eq!(structure.groups[0].len(), 3);
        assert_eq!(structure.groups[1].len(), 1);
    }
}
