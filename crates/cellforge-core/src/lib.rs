//! # cellforge Core Library
//!
//! A library for manipulating atomistic crystal-structure descriptions used in
//! periodic electronic-structure simulations: supercell construction, neighbor
//! search under periodic boundary conditions, trajectory snapshot extraction,
//! and Metropolis Monte Carlo occupancy sampling driven by an external energy
//! calculator.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (`Structure`,
//!   `Lattice`), pure geometry (fractional-to-Cartesian transforms, periodic
//!   distances), and text-format I/O for VASP-style structure files.
//!
//! - **[`engine`]: The Logic Core.** Implements the algorithms: supercell
//!   replication, periodic-image neighbor enumeration, nearest-timestamp
//!   snapshot selection, and the Metropolis acceptance loop.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing
//!   layer. It ties the `engine` and `core` together into complete procedures
//!   (parse a file, compute, write the result) with a simple entry point for
//!   end-users of the library.

pub mod core;
pub mod engine;
pub mod workflows;
