use crate::images::{self, ImageError};
use crate::io::poscar::{PoscarError, PoscarFile};
use crate::io::traits::StructureFile;
use crate::model::structure::{ModelError, Structure};
use crate::progress::{Progress, ProgressReporter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

const STRUCTURE_FILE_NAME: &str = "POSCAR";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("Failed to parse structure file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: PoscarError,
    },
    #[error("Failed to write structure file '{path}': {source}", path = path.display())]
    FileWriting {
        path: PathBuf,
        #[source]
        source: PoscarError,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Summary of a completed generation run.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    /// Total number of images in the chain, endpoints included.
    pub image_count: usize,
    /// Paths of the interpolated POSCAR files that were written, in
    /// directory-index order.
    pub written: Vec<PathBuf>,
}

/// Runs the full image generation pipeline under `workdir`.
///
/// Scans for the highest-numbered image directory to derive the image count,
/// ensures all chain directories exist, reads the endpoint structures from
/// the first and last directories, and writes a linearly interpolated
/// structure into every directory in between. The image at step k gets
/// fraction `k / image_count` of the (periodic-wrapped) endpoint difference.
///
/// Existing intermediate POSCAR files are overwritten; rerunning with the
/// same endpoints produces byte-identical output. Writes are not staged
/// through temporary files, so a failure mid-run leaves earlier images
/// written and later ones untouched; a rerun regenerates all of them.
///
/// # Errors
///
/// Fails before any file I/O if no valid image directory layout is found,
/// and on the first parse, validation, or filesystem error after that. No
/// retries, no partial-failure tolerance.
#[instrument(skip_all, name = "generate_workflow")]
pub fn run(workdir: &Path, reporter: &ProgressReporter) -> Result<GenerateReport, GenerateError> {
    let image_count = images::scan_image_count(workdir)?;
    info!(image_count, "Discovered NEB image chain.");

    let dirs = images::ensure_image_dirs(workdir, image_count)?;

    let first_path = workdir.join(&dirs[0]).join(STRUCTURE_FILE_NAME);
    let last_dir = &dirs[image_count - 1];
    let last_path = workdir.join(last_dir).join(STRUCTURE_FILE_NAME);

    let first = read_structure(&first_path)?;
    let last = read_structure(&last_path)?;
    info!(
        atoms = first.atom_count(),
        "Endpoint structures loaded; computing difference."
    );

    let delta = Structure::delta_from(&last, &first)?;

    let intermediates = &dirs[1..image_count - 1];
    reporter.report(Progress::Message(format!(
        "Interpolating {} intermediate image(s)",
        intermediates.len()
    )));
    reporter.report(Progress::TaskStart {
        total_steps: intermediates.len() as u64,
    });

    let mut written = Vec::with_capacity(intermediates.len());
    for (offset, dir) in intermediates.iter().enumerate() {
        let step = offset + 1;
        let fraction = step as f64 / image_count as f64;
        let image = first.interpolated(&delta, fraction);

        let path = workdir.join(dir).join(STRUCTURE_FILE_NAME);
        PoscarFile::write_to_path(&image, &path).map_err(|source| GenerateError::FileWriting {
            path: path.clone(),
            source,
        })?;
        info!(step, fraction, path = %path.display(), "Wrote interpolated image.");

        written.push(path);
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    Ok(GenerateReport {
        image_count,
        written,
    })
}

fn read_structure(path: &Path) -> Result<Structure, GenerateError> {
    PoscarFile::read_from_path(path).map_err(|source| GenerateError::FileParsing {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn poscar_text(comment: &str, edge: f64, x: f64) -> String {
        format!(
            "{comment}\n 1.0\n   {edge} 0.0 0.0\n   0.0 {edge} 0.0\n   0.0 0.0 {edge}\n   Si\n   2\nDirect\n  {x} 0.1 0.1\n  0.5 0.5 0.5\n"
        )
    }

    fn setup_endpoints(last_dir: &str, first_x: f64, last_x: f64) -> TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("00")).unwrap();
        fs::create_dir(tmp.path().join(last_dir)).unwrap();
        fs::write(
            tmp.path().join("00").join("POSCAR"),
            poscar_text("first endpoint", 5.0, first_x),
        )
        .unwrap();
        fs::write(
            tmp.path().join(last_dir).join("POSCAR"),
            poscar_text("last endpoint", 5.0, last_x),
        )
        .unwrap();
        tmp
    }

    fn read_back(path: &Path) -> Structure {
        PoscarFile::read_from_path(path).unwrap()
    }

    #[test]
    fn writes_one_file_per_intermediate_directory() {
        let tmp = setup_endpoints("04", 0.1, 0.3);

        let report = run(tmp.path(), &ProgressReporter::new()).unwrap();
        assert_eq!(report.image_count, 5);
        assert_eq!(report.written.len(), 3);

        for name in ["00", "01", "02", "03", "04"] {
            assert!(tmp.path().join(name).is_dir());
        }
        for name in ["01", "02", "03"] {
            assert!(tmp.path().join(name).join("POSCAR").is_file());
        }
    }

    #[test]
    fn intermediate_images_are_exactly_linear() {
        let tmp = setup_endpoints("04", 0.1, 0.3);
        run(tmp.path(), &ProgressReporter::new()).unwrap();

        for (step, name) in [(1, "01"), (2, "02"), (3, "03")] {
            let image = read_back(&tmp.path().join(name).join("POSCAR"));
            let expected = 0.1 + 0.2 * step as f64 / 5.0;
            assert!(
                (image.positions()[0].x - expected).abs() < 1e-12,
                "image {name}: got {}, expected {expected}",
                image.positions()[0].x
            );
            // Fixed atom stays fixed.
            assert_eq!(image.positions()[1].x, 0.5);
            // Text fields come from the first endpoint.
            assert_eq!(image.comment(), "first endpoint");
            assert_eq!(image.coordinate_mode(), "Direct");
        }
    }

    #[test]
    fn interpolation_takes_shortest_periodic_path() {
        // 0.1 -> 0.9 wraps through the boundary: the half-way image sits at
        // 0.0 rather than the naive midpoint 0.5.
        let tmp = setup_endpoints("03", 0.1, 0.9);
        run(tmp.path(), &ProgressReporter::new()).unwrap();

        let quarter = read_back(&tmp.path().join("01").join("POSCAR"));
        assert!((quarter.positions()[0].x - 0.05).abs() < 1e-12);
        let mid = read_back(&tmp.path().join("02").join("POSCAR"));
        assert!((mid.positions()[0].x - 0.0).abs() < 1e-12);
    }

    #[test]
    fn two_image_chain_writes_nothing_and_succeeds() {
        let tmp = setup_endpoints("01", 0.1, 0.3);

        let report = run(tmp.path(), &ProgressReporter::new()).unwrap();
        assert_eq!(report.image_count, 2);
        assert!(report.written.is_empty());
    }

    #[test]
    fn rerun_produces_byte_identical_output() {
        let tmp = setup_endpoints("03", 0.1, 0.4);

        run(tmp.path(), &ProgressReporter::new()).unwrap();
        let first_pass = fs::read(tmp.path().join("02").join("POSCAR")).unwrap();

        run(tmp.path(), &ProgressReporter::new()).unwrap();
        let second_pass = fs::read(tmp.path().join("02").join("POSCAR")).unwrap();
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn fails_without_numbered_directories() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            run(tmp.path(), &ProgressReporter::new()),
            Err(GenerateError::Image(ImageError::NoImageDirectories { .. }))
        ));
    }

    #[test]
    fn missing_endpoint_file_is_a_parse_error_with_its_path() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("00")).unwrap();
        fs::create_dir(tmp.path().join("02")).unwrap();

        match run(tmp.path(), &ProgressReporter::new()) {
            Err(GenerateError::FileParsing { path, .. }) => {
                assert!(path.ends_with(Path::new("00").join("POSCAR")));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn mismatched_endpoints_are_rejected_before_writing() {
        let tmp = setup_endpoints("03", 0.1, 0.3);
        // Overwrite the last endpoint with a different composition.
        fs::write(
            tmp.path().join("03").join("POSCAR"),
            "last\n 1.0\n   5.0 0.0 0.0\n   0.0 5.0 0.0\n   0.0 0.0 5.0\n   Ge\n   1\nDirect\n  0.1 0.1 0.1\n",
        )
        .unwrap();

        assert!(matches!(
            run(tmp.path(), &ProgressReporter::new()),
            Err(GenerateError::Model(ModelError::EndpointMismatch { .. }))
        ));
        assert!(!tmp.path().join("01").join("POSCAR").exists());
    }

    #[test]
    fn progress_events_cover_every_intermediate() {
        use std::sync::Mutex;

        let tmp = setup_endpoints("04", 0.1, 0.3);
        let events = Mutex::new(Vec::new());
        {
            let reporter = ProgressReporter::with_callback(Box::new(|p| {
                events.lock().unwrap().push(p);
            }));
            run(tmp.path(), &reporter).unwrap();
        }

        let events = events.into_inner().unwrap();
        let increments = events
            .iter()
            .filter(|e| matches!(e, Progress::TaskIncrement))
            .count();
        assert_eq!(increments, 3);
        assert!(matches!(
            events
                .iter()
                .find(|e| matches!(e, Progress::TaskStart { .. })),
            Some(Progress::TaskStart { total_steps: 3 })
        ));
    }
}
