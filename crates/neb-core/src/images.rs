//! Discovery and creation of the numbered NEB image directories.
//!
//! A NEB run lays its images out as zero-padded numbered directories
//! (`00`, `01`, ..) under a working directory. The first and last hold the
//! user-supplied endpoint structures; the ones in between receive the
//! interpolated images.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error(
        "No NEB image directories found in '{dir}': prepare numbered directories 00 01 02 .. with at least one numbered above 00",
        dir = dir.display()
    )]
    NoImageDirectories { dir: PathBuf },
    #[error("Failed to create image directory '{path}': {source}", path = path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Parses the leading fixed-width two-digit image index of a directory name.
///
/// Returns `None` when the first two characters are not both ASCII digits,
/// which keeps "no match" distinguishable from a matched index of zero.
/// Characters past the first two are ignored, so `05-relaxed` parses as 5.
pub fn parse_image_index(name: &str) -> Option<u32> {
    let prefix = name.get(0..2)?;
    if prefix.bytes().all(|b| b.is_ascii_digit()) {
        prefix.parse().ok()
    } else {
        None
    }
}

/// Scans `workdir` for numbered image directories and derives the image
/// count (highest index + 1, endpoints included).
///
/// # Errors
///
/// Returns [`ImageError::NoImageDirectories`] when no directory carries a
/// two-digit index, or when the highest index is 00: the last image must be
/// a pre-existing directory numbered above the first, since a chain needs at
/// least two endpoints.
pub fn scan_image_count(workdir: &Path) -> Result<usize, ImageError> {
    let mut max_index: Option<u32> = None;
    for entry in fs::read_dir(workdir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(index) = parse_image_index(&entry.file_name().to_string_lossy()) {
            max_index = Some(max_index.map_or(index, |m| m.max(index)));
        }
    }

    match max_index {
        Some(max) if max > 0 => Ok(max as usize + 1),
        _ => Err(ImageError::NoImageDirectories {
            dir: workdir.to_path_buf(),
        }),
    }
}

/// Ensures the directories `00 .. count-1` exist under `workdir`, creating
/// any that are missing. Idempotent; safe to rerun over existing output.
///
/// Returns the ordered directory names: index 0 is the first image, index
/// `count - 1` the last. Names are zero-padded to two digits and widen
/// naturally past 99.
pub fn ensure_image_dirs(workdir: &Path, count: usize) -> Result<Vec<String>, ImageError> {
    let mut names = Vec::with_capacity(count);
    for i in 0..count {
        let name = format!("{:02}", i);
        let path = workdir.join(&name);
        if !path.is_dir() {
            fs::create_dir_all(&path).map_err(|source| ImageError::CreateDir {
                path: path.clone(),
                source,
            })?;
        }
        names.push(name);
    }
    Ok(names)
}
