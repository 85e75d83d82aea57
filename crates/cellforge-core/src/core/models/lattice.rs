use nalgebra::{Matrix3, RowVector3};
use thiserror::Error;

/// Determinants below this threshold are treated as a degenerate cell.
const DEGENERACY_THRESHOLD: f64 = 1e-9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LatticeError {
    #[error(
        "Lattice vectors are linearly dependent (|det| = {determinant:.3e}); a periodic cell must span three dimensions"
    )]
    Degenerate { determinant: f64 },
}

/// The three vectors defining a repeating unit cell.
///
/// Row `i` of the underlying matrix is lattice vector `i` in Cartesian length
/// units (Å), with any file-level scaling factor already applied. The rows are
/// guaranteed linearly independent: construction fails on a degenerate cell,
/// so downstream geometry never has to re-check.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    matrix: Matrix3<f64>,
}

impl Lattice {
    /// Creates a lattice from a matrix whose rows are the cell vectors.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Degenerate`] if the rows do not span three
    /// dimensions.
    pub fn new(matrix: Matrix3<f64>) -> Result<Self, LatticeError> {
        let determinant = matrix.determinant();
        if determinant.abs() < DEGENERACY_THRESHOLD {
            return Err(LatticeError::Degenerate { determinant });
        }
        Ok(Self { matrix })
    }

    /// Creates a lattice from three row vectors.
    pub fn from_rows(
        a: RowVector3<f64>,
        b: RowVector3<f64>,
        c: RowVector3<f64>,
    ) -> Result<Self, LatticeError> {
        Self::new(Matrix3::from_rows(&[a, b, c]))
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Lattice vector `axis` (0, 1, or 2) as a row.
    pub fn row(&self, axis: usize) -> RowVector3<f64> {
        self.matrix.row(axis).into_owned()
    }

    /// Euclidean lengths of the three lattice vectors, in Å.
    pub fn row_lengths(&self) -> [f64; 3] {
        [
            self.matrix.row(0).norm(),
            self.matrix.row(1).norm(),
            self.matrix.row(2).norm(),
        ]
    }

    /// Returns a lattice with row `i` multiplied by `factors[i]`.
    ///
    /// Row-wise scalar scaling only; no cross terms. This is how a supercell
    /// lattice is derived from integer repetition counts. The determinant
    /// scales by the product of the factors, so nonzero factors keep the
    /// rows linearly independent and the result needs no re-validation.
    pub fn scaled_rows(&self, factors: [f64; 3]) -> Self {
        debug_assert!(factors.iter().all(|f| *f != 0.0));
        let mut matrix = self.matrix;
        for (axis, factor) in factors.iter().enumerate() {
            let scaled = self.matrix.row(axis) * *factor;
            matrix.set_row(axis, &scaled);
        }
        Self { matrix }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(a: f64) -> Lattice {
        Lattice::new(Matrix3::from_diagonal_element(a)).unwrap()
    }

    #[test]
    fn new_accepts_non_degenerate_matrix() {
        let lattice = cubic(4.0);
        assert_eq!(lattice.matrix()[(0, 0)], 4.0);
        assert_eq!(lattice.matrix()[(1, 2)], 0.0);
    }

    #[test]
    fn new_rejects_linearly_dependent_rows() {
        let matrix = Matrix3::from_rows(&[
            RowVector3::new(1.0, 0.0, 0.0),
            RowVector3::new(2.0, 0.0, 0.0),
            RowVector3::new(0.0, 0.0, 1.0),
        ]);
        let result = Lattice::new(matrix);
        assert!(matches!(result, Err(LatticeError::Degenerate { .. })));
    }

    #[test]
    fn new_rejects_zero_matrix() {
        assert!(Lattice::new(Matrix3::zeros()).is_err());
    }

    #[test]
    fn row_lengths_are_euclidean_norms() {
        let lattice = Lattice::from_rows(
            RowVector3::new(3.0, 4.0, 0.0),
            RowVector3::new(0.0, 2.0, 0.0),
            RowVector3::new(0.0, 0.0, 1.5),
        )
        .unwrap();
        let [a, b, c] = lattice.row_lengths();
        assert!((a - 5.0).abs() < 1e-12);
        assert!((b - 2.0).abs() < 1e-12);
        assert!((c - 1.5).abs() < 1e-12);
    }

    #[test]
    fn scaled_rows_multiplies_each_row_independently() {
        let lattice = cubic(3.0);
        let scaled = lattice.scaled_rows([2.0, 1.0, 1.0]);
        assert_eq!(scaled.row(0), RowVector3::new(6.0, 0.0, 0.0));
        assert_eq!(scaled.row(1), RowVector3::new(0.0, 3.0, 0.0));
        assert_eq!(scaled.row(2), RowVector3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn scaled_rows_keeps_the_rows_independent() {
        let lattice = cubic(3.0);
        let scaled = lattice.scaled_rows([2.0, 3.0, 4.0]);
        // det(L) = 27, scaled by 2 * 3 * 4.
        assert!((scaled.matrix().determinant() - 648.0).abs() < 1e-9);
    }
}
