//! Pure geometry over fractional coordinates and a lattice.

use super::models::lattice::Lattice;
use nalgebra::{Point3, Vector3};

/// Cartesian position of a fractional coordinate under `lattice`.
///
/// Computes `p · L` where row `i` of `L` is lattice vector `i`.
pub fn cartesian(p: &Vector3<f64>, lattice: &Lattice) -> Point3<f64> {
    let row = p.transpose() * lattice.matrix();
    Point3::new(row[0], row[1], row[2])
}

/// Cartesian distance between two fractional-coordinate points.
///
/// The fractional difference `p − q` is transformed into Cartesian space by
/// the lattice matrix and measured with the Euclidean norm. Pure function;
/// the shapes are fixed by the types, so there is no failure mode.
pub fn distance(p: &Vector3<f64>, q: &Vector3<f64>, lattice: &Lattice) -> f64 {
    ((p - q).transpose() * lattice.matrix()).norm()
}
