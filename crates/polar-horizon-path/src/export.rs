//! Horizon text export: `<azimuth> <elevation>` as integers, one point per
//! line, every line newline-terminated, no header.

use std::{
    fs,
    path::{Path, PathBuf},
};

use polar_horizon_core::HorizonPoint;

use crate::path::HorizonPath;

/// Default artifact name.
pub const DEFAULT_EXPORT_FILE: &str = "horizon.txt";

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of [`write_horizon`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Nothing recorded; no file was created or touched.
    Skipped,
    Written { path: PathBuf, lines: usize },
}

/// Format one export line (without the newline).
pub fn format_point(p: &HorizonPoint) -> String {
    // `round() as i32` turns -0.0 into 0, so `-0` is never written.
    format!(
        "{} {}",
        p.azimuth.round() as i32,
        p.elevation.round() as i32
    )
}

/// Serialize the path. Empty path gives an empty buffer.
pub fn export_horizon(path: &HorizonPath) -> Vec<u8> {
    let mut out = String::new();
    for p in path.to_export_list() {
        out.push_str(&format_point(&p));
        out.push('\n');
    }
    out.into_bytes()
}

/// Overwrite `dest` with the exported path. An empty path is a no-op.
pub fn write_horizon(
    path: &HorizonPath,
    dest: impl AsRef<Path>,
) -> Result<ExportOutcome, ExportError> {
    if path.is_empty() {
        log::info!("nothing to export; {} left untouched", dest.as_ref().display());
        return Ok(ExportOutcome::Skipped);
    }
    let dest = dest.as_ref().to_path_buf();
    fs::write(&dest, export_horizon(path)).map_err(|source| ExportError::Io {
        path: dest.clone(),
        source,
    })?;
    log::info!("exported {} points to {}", path.len(), dest.display());
    Ok(ExportOutcome::Written {
        path: dest,
        lines: path.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_of(points: &[(f32, f32)]) -> HorizonPath {
        let mut path = HorizonPath::new();
        for &(az, el) in points {
            path.append(HorizonPoint::new(az, el)).expect("valid order");
        }
        path
    }

    #[test]
    fn exports_rounded_integer_lines() {
        let path = path_of(&[(10.4, 44.6), (5.0, 2.0)]);
        assert_eq!(export_horizon(&path), b"10 45\n5 2\n".to_vec());
    }

    #[test]
    fn negative_zero_is_written_as_zero() {
        let path = path_of(&[(180.0, -0.3)]);
        assert_eq!(export_horizon(&path), b"180 0\n".to_vec());
    }

    #[test]
    fn empty_path_exports_nothing() {
        assert!(export_horizon(&HorizonPath::new()).is_empty());
    }

    #[test]
    fn empty_path_does_not_touch_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join(DEFAULT_EXPORT_FILE);
        fs::write(&dest, "1 1\n").expect("seed");

        let outcome = write_horizon(&HorizonPath::new(), &dest).expect("no-op");
        assert_eq!(outcome, ExportOutcome::Skipped);
        assert_eq!(fs::read_to_string(&dest).expect("read"), "1 1\n");

        let fresh = dir.path().join("never.txt");
        write_horizon(&HorizonPath::new(), &fresh).expect("no-op");
        assert!(!fresh.exists());
    }

    #[test]
    fn write_overwrites_previous_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join(DEFAULT_EXPORT_FILE);
        fs::write(&dest, "old content that is longer\n").expect("seed");

        let path = path_of(&[(359.0, 3.0), (270.2, 8.7)]);
        let outcome = write_horizon(&path, &dest).expect("written");
        assert_eq!(
            outcome,
            ExportOutcome::Written {
                path: dest.clone(),
                lines: 2
            }
        );
        assert_eq!(fs::read_to_string(&dest).expect("read"), "359 3\n270 9\n");
    }

    #[test]
    fn unwritable_destination_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("missing-dir").join("horizon.txt");
        let err = write_horizon(&path_of(&[(10.0, 1.0)]), &dest).unwrap_err();
        assert!(err.to_string().contains("missing-dir"));
    }
}
