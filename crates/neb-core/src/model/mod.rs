//! Defines the core data model for crystal structures used in NEB image
//! generation.
//!
//! The central type is [`Structure`](structure::Structure), an immutable
//! snapshot of a periodic crystal (lattice, composition, fractional atomic
//! positions). Differences between two endpoint structures are captured by
//! [`StructureDelta`](structure::StructureDelta), which accounts for
//! periodic-boundary wraparound so that interpolation always follows the
//! shortest path through the unit cell.

pub mod structure;
