pub mod anneal;
pub mod neighbors;
pub mod snapshots;
pub mod supercell;
