use polar_horizon_core::HorizonPoint;
use serde::{Deserialize, Serialize};

/// Rotational direction the operator must trace in.
///
/// The system convention is [`TraceDirection::Decreasing`]: the trace starts on
/// the north line (359°) and every new point has a lower bearing than the one
/// before.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceDirection {
    #[default]
    Decreasing,
    Increasing,
}

impl TraceDirection {
    /// `true` if `next` strictly continues the trace after `last`.
    #[inline]
    pub fn accepts(self, last: f32, next: f32) -> bool {
        match self {
            TraceDirection::Decreasing => next < last,
            TraceDirection::Increasing => next > last,
        }
    }

    fn relation(self) -> &'static str {
        match self {
            TraceDirection::Decreasing => "below",
            TraceDirection::Increasing => "above",
        }
    }
}

/// Why a point was not appended. The path is left unchanged in every case.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum AppendError {
    #[error("out of sequence: azimuth {attempted:.0}° must be {} {last:.0}°", .direction.relation())]
    OutOfSequence {
        last: f32,
        attempted: f32,
        direction: TraceDirection,
    },
    #[error("non-finite point (azimuth={azimuth}, elevation={elevation})")]
    NonFinite { azimuth: f32, elevation: f32 },
}

/// Ordered horizon profile in click order.
///
/// Deserialization replays every point through [`HorizonPath::append`], so a
/// stored path that breaks the trace order is refused.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredPath")]
pub struct HorizonPath {
    points: Vec<HorizonPoint>,
    direction: TraceDirection,
}

#[derive(Deserialize)]
struct StoredPath {
    #[serde(default)]
    points: Vec<HorizonPoint>,
    #[serde(default)]
    direction: TraceDirection,
}

impl TryFrom<StoredPath> for HorizonPath {
    type Error = AppendError;

    fn try_from(stored: StoredPath) -> Result<Self, Self::Error> {
        let mut path = HorizonPath::with_direction(stored.direction);
        for point in stored.points {
            path.append(point)?;
        }
        Ok(path)
    }
}

impl HorizonPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direction(direction: TraceDirection) -> Self {
        Self {
            points: Vec::new(),
            direction,
        }
    }

    pub fn direction(&self) -> TraceDirection {
        self.direction
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

    pub fn last(&self) -> Option<HorizonPoint> {
        self.points.last().copied()
    }

    /// Append `point` if it continues the trace in the configured direction.
    pub fn append(&mut self, point: HorizonPoint) -> Result<(), AppendError> {
        if !point.azimuth.is_finite() || !point.elevation.is_finite() {
            return Err(AppendError::NonFinite {
                azimuth: point.azimuth,
                elevation: point.elevation,
            });
        }
        if let Some(last) = self.points.last() {
            if !self.direction.accepts(last.azimuth, point.azimuth) {
                return Err(AppendError::OutOfSequence {
                    last: last.azimuth,
                    attempted: point.azimuth,
                    direction: self.direction,
                });
            }
        }
        self.points.push(point);
        Ok(())
    }

    /// Drop the most recent point. No-op on an empty path.
    pub fn undo(&mut self) -> Option<HorizonPoint> {
        self.points.pop()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Points in trace order. `append` already keeps them monotonic, so the
    /// stable sort below never reorders anything on a path built through it.
    pub fn to_export_list(&self) -> Vec<HorizonPoint> {
        let mut out = self.points.clone();
        match self.direction {
            TraceDirection::Decreasing => {
                out.sort_by(|a, b| b.azimuth.total_cmp(&a.azimuth));
            }
            TraceDirection::Increasing => {
                out.sort_by(|a, b| a.azimuth.total_cmp(&b.azimuth));
            }
        }
        out
    }
}
