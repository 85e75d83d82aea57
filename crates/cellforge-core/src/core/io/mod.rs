//! Text-format I/O for VASP-style structure and trajectory files.
//!
//! Reads and writes go through buffered handles that are scoped to one call:
//! each workflow performs exactly one read and at most one write, and the
//! handle is released on every exit path, error paths included. Write
//! failures are fatal and surface the underlying `io::Error` unchanged.

pub mod poscar;
pub mod traits;
pub mod xdatcar;
