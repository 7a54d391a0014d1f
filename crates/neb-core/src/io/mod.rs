//! File I/O for crystal structure formats.

pub mod poscar;
pub mod traits;
