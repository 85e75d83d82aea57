//! Data structures describing a periodic crystal structure.
//!
//! A [`structure::Structure`] owns a [`lattice::Lattice`] (the three cell
//! vectors, in Å) and one ordered coordinate list per atomic species. Species
//! order and within-species site order follow the source file and are
//! semantically meaningful: they determine atom labels in generated output.

pub mod label;
pub mod lattice;
pub mod structure;
