//! # Engine Module
//!
//! This module implements the algorithms of cellforge over the stateless
//! models in [`crate::core`].
//!
//! ## Architecture
//!
//! - **Supercell construction** ([`supercell`]) - Integer replication of a
//!   unit cell with renormalized fractional coordinates
//! - **Neighbor search** ([`neighbors`]) - Periodic-image enumeration within
//!   a cutoff radius
//! - **Snapshot selection** ([`snapshots`]) - Nearest-timestamp lookup over a
//!   trajectory
//! - **Monte Carlo** ([`monte_carlo`]) - Metropolis acceptance loop over
//!   occupancy proposals, scored by an external energy calculator
//!
//! All operations are synchronous, single-threaded computations over
//! in-memory arrays; given immutable inputs they are deterministic (the
//! Monte Carlo loop, given a seeded RNG), so failures never warrant a retry.

pub mod monte_carlo;
pub mod neighbors;
pub mod snapshots;
pub mod supercell;
