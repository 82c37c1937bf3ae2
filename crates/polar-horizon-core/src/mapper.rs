//! Canvas pixel <-> (azimuth, elevation) mapping.
//!
//! Conventions, shared with [`crate::warp_polar`]:
//! - bearing is `atan2(dx, dy)` with `dx = x - c`, `dy = y - c`, so 0° points
//!   straight down from the centre, 90° to the right, 180° up;
//! - elevation is `90 * (1 - dist / horizon_radius)`, clamped to `[-90, 90]`.
//!
//! Raw bearings within [`SEAM_SNAP_DEG`] of the 0/360 seam are reported as
//! 359° so a click on the north line never lands on the ambiguous side of the
//! wrap.

use nalgebra::Point2;

use crate::angles::{normalize_degrees, HorizonPoint};
use crate::params::ProjectionParams;

/// Half-width of the seam band around 0°/360° that snaps to [`SEAM_AZIMUTH`].
pub const SEAM_SNAP_DEG: f32 = 0.5;
/// Bearing reported for clicks inside the seam band.
pub const SEAM_AZIMUTH: f32 = 359.0;
/// Relative inward pull applied by [`CoordinateMapper::angle_to_pixel`], so a
/// point on the horizon survives the round-off of the strict disc test.
const INWARD_NUDGE: f32 = 16.0 * f32::EPSILON;

/// Bidirectional pixel/angle transform for one canvas and zoom state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    center: f32,
    horizon_radius: f32,
}

impl CoordinateMapper {
    pub fn new(canvas_size: usize, horizon_radius: f32) -> Self {
        Self {
            center: canvas_size as f32 / 2.0,
            horizon_radius,
        }
    }

    pub fn from_params(params: &ProjectionParams) -> Self {
        Self::new(params.canvas_size, params.horizon_radius())
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.center, self.center)
    }

    pub fn horizon_radius(&self) -> f32 {
        self.horizon_radius
    }

    /// Distance of `p` from the canvas centre.
    #[inline]
    pub fn radius_of(&self, p: Point2<f32>) -> f32 {
        let dx = p.x - self.center;
        let dy = p.y - self.center;
        (dx * dx + dy * dy).sqrt()
    }

    /// `true` when `p` lies on or inside the horizon circle.
    #[inline]
    pub fn contains(&self, p: Point2<f32>) -> bool {
        p.x.is_finite() && p.y.is_finite() && self.radius_of(p) <= self.horizon_radius
    }

    /// Continuous (azimuth, elevation) for a canvas pixel, or `None` outside
    /// the horizon disc. The azimuth is seam-snapped, the elevation clamped.
    pub fn pixel_to_angle_raw(&self, p: Point2<f32>) -> Option<HorizonPoint> {
        if self.horizon_radius <= 0.0 || !self.contains(p) {
            return None;
        }
        let dx = p.x - self.center;
        let dy = p.y - self.center;
        let dist = (dx * dx + dy * dy).sqrt();

        let azimuth = snap_seam(normalize_degrees(dx.atan2(dy).to_degrees()));
        let elevation = (90.0 * (1.0 - dist / self.horizon_radius)).clamp(-90.0, 90.0);
        Some(HorizonPoint::new(azimuth, elevation))
    }

    /// Recorded form of [`Self::pixel_to_angle_raw`]: both angles rounded to
    /// whole degrees.
    pub fn pixel_to_angle(&self, p: Point2<f32>) -> Option<HorizonPoint> {
        let raw = self.pixel_to_angle_raw(p)?;
        Some(HorizonPoint::new(
            snap_seam(raw.azimuth.round()),
            raw.elevation.round(),
        ))
    }

    /// Canvas position of an (azimuth, elevation) pair. Inverse of
    /// [`Self::pixel_to_angle_raw`]; elevation is clamped to `[-90, 90]`, so
    /// points below the horizon land outside the disc.
    pub fn angle_to_pixel(&self, point: HorizonPoint) -> Point2<f32> {
        let elevation = point.elevation.clamp(-90.0, 90.0);
        let dist = self.horizon_radius * (1.0 - elevation / 90.0) * (1.0 - INWARD_NUDGE);
        let az = point.azimuth.to_radians();
        Point2::new(
            self.center + dist * az.sin(),
            self.center + dist * az.cos(),
        )
    }
}

#[inline]
fn snap_seam(azimuth: f32) -> f32 {
    if azimuth < SEAM_SNAP_DEG || azimuth >= 360.0 - SEAM_SNAP_DEG {
        SEAM_AZIMUTH
    } else {
        azimuth
    }
}
