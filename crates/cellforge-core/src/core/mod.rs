//! # Core Module
//!
//! This module provides the fundamental building blocks for periodic crystal
//! structure manipulation in cellforge, serving as the stateless foundation of
//! the library.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules that handle different
//! aspects of structure representation:
//!
//! - **Structure Representation** ([`models`]) - Lattices, per-species site
//!   collections, and site labels
//! - **Geometry** ([`geometry`]) - Fractional-to-Cartesian transforms and
//!   periodic distance computation
//! - **File I/O** ([`io`]) - Reading/writing VASP-style structure and
//!   trajectory files with order-preserving species handling

pub mod geometry;
pub mod io;
pub mod models;
