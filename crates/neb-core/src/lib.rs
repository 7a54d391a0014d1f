//! # nebgen Core Library
//!
//! A library for generating the intermediate images of a Nudged Elastic Band
//! (NEB) calculation: given the two endpoint structures of a reaction path,
//! it linearly interpolates lattice and fractional atomic positions (taking
//! the shortest path across periodic cell boundaries) and writes one
//! structure file per intermediate image directory.
//!
//! ## Architecture
//!
//! - **[`model`]: The Foundation.** Immutable value types for crystal
//!   structures and their differences, with the composition invariants
//!   enforced at construction time.
//!
//! - **[`io`] / [`images`]: The Edges.** POSCAR parsing and serialization
//!   behind a format trait, and discovery/creation of the numbered image
//!   directory layout.
//!
//! - **[`workflows`]: The Public API.** The end-to-end generation pipeline,
//!   a pure function of an explicit working directory, reporting progress
//!   through [`progress`] callbacks.

pub mod images;
pub mod io;
pub mod model;
pub mod progress;
pub mod workflows;
