//! # Workflows Module
//!
//! High-level entry points that orchestrate the complete NEB image
//! generation pipeline: directory discovery, endpoint parsing, structure
//! differencing, and interpolated image writing.
//!
//! Workflows take the working directory as an explicit parameter and report
//! progress through the callback seam in [`crate::progress`], so callers can
//! attach any frontend (a CLI progress bar, a log sink) without the core
//! depending on one.

pub mod generate;
