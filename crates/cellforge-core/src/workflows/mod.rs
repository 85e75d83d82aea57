//! # Workflows Module
//!
//! High-level entry points tying parsing, computation, and output writing
//! into complete procedures. Each workflow performs exactly one input read
//! and at most one output write per invocation and returns its in-memory
//! result for programmatic use.
//!
//! - **Supercell** ([`supercell`]) - Parse a POSCAR, replicate it, write
//!   `POSCAR_{Nx}{Ny}{Nz}.vasp`
//! - **Neighbors** ([`neighbors`]) - Parse a POSCAR and report periodic
//!   images within a cutoff of a center atom
//! - **Snapshots** ([`snapshots`]) - Extract the frames of an XDATCAR
//!   closest to requested simulation times
//! - **Annealing** ([`anneal`]) - Metropolis Monte Carlo over site
//!   occupancies, scored by an external calculator

pub mod anneal;
pub mod neighbors;
pub mod snapshots;
pub mod supercell;
