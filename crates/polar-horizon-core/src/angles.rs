use serde::{Deserialize, Serialize};

/// One (azimuth, elevation) sample, both in degrees.
///
/// Azimuth is a compass bearing in `[0, 360)`. Elevation is measured from the
/// true horizon, `90` is the zenith.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HorizonPoint {
    pub azimuth: f32,
    pub elevation: f32,
}

impl HorizonPoint {
    pub fn new(azimuth: f32, elevation: f32) -> Self {
        Self { azimuth, elevation }
    }

    /// Same point with both angles rounded to whole degrees.
    pub fn rounded(self) -> Self {
        Self {
            azimuth: self.azimuth.round(),
            elevation: self.elevation.round(),
        }
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_degrees(deg: f32) -> f32 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid may return exactly 360.0 for tiny negative inputs.
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

/// Smallest absolute difference between two bearings, in degrees.
#[inline]
pub fn angular_distance(a: f32, b: f32) -> f32 {
    let d = normalize_degrees(a - b);
    d.min(360.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalizes_into_half_open_range() {
        assert_relative_eq!(normalize_degrees(-90.0), 270.0);
        assert_relative_eq!(normalize_degrees(720.0), 0.0);
        assert!(normalize_degrees(-1e-9) < 360.0);
    }

    #[test]
    fn angular_distance_crosses_the_seam() {
        assert_relative_eq!(angular_distance(359.0, 1.0), 2.0, epsilon = 1e-4);
        assert_relative_eq!(angular_distance(10.0, 350.0), 20.0, epsilon = 1e-4);
    }
}
