//! Reference horizon files.
//!
//! Plain text, one `azimuth elevation` pair per line separated by whitespace.
//! No header and no ordering requirement. Blank lines and lines starting with
//! `#` are skipped.

use std::{fs, path::Path};

use polar_horizon_core::HorizonPoint;

/// Failure to load a reference file. `Io` means the file could not be read,
/// every other variant means its content is malformed.
#[derive(thiserror::Error, Debug)]
pub enum ReferenceError {
    #[error("failed to read reference file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected 2 columns (azimuth elevation), found {found}")]
    ColumnCount { line: usize, found: usize },
    #[error("line {line}: invalid number `{token}`")]
    InvalidNumber { line: usize, token: String },
}

impl ReferenceError {
    /// `true` for malformed content, `false` for I/O failures.
    pub fn is_format(&self) -> bool {
        !matches!(self, ReferenceError::Io(_))
    }
}

/// Immutable point sequence drawn next to the traced path for comparison.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceOverlay {
    points: Vec<HorizonPoint>,
}

impl ReferenceOverlay {
    pub fn from_points(points: Vec<HorizonPoint>) -> Self {
        Self { points }
    }

    /// Parse reference text. Fails on the first malformed line.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        let mut points = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_no = idx + 1;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != 2 {
                return Err(ReferenceError::ColumnCount {
                    line: line_no,
                    found: tokens.len(),
                });
            }
            let azimuth = parse_number(tokens[0], line_no)?;
            let elevation = parse_number(tokens[1], line_no)?;
            points.push(HorizonPoint::new(azimuth, elevation));
        }
        log::debug!("parsed {} reference points", points.len());
        Ok(Self { points })
    }

    /// Read and parse a reference file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReferenceError> {
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn points(&self) -> &[HorizonPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest and largest azimuth in the overlay.
    pub fn azimuth_range(&self) -> Option<(f32, f32)> {
        self.points.iter().fold(None, |acc, p| match acc {
            None => Some((p.azimuth, p.azimuth)),
            Some((lo, hi)) => Some((lo.min(p.azimuth), hi.max(p.azimuth))),
        })
    }
}

fn parse_number(token: &str, line: usize) -> Result<f32, ReferenceError> {
    match token.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ReferenceError::InvalidNumber {
            line,
            token: token.to_string(),
        }),
    }
}
