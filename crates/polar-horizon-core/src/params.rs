/// Smallest accepted zoom factor.
pub const MIN_ZOOM: f32 = 0.5;
/// Largest accepted zoom factor.
pub const MAX_ZOOM: f32 = 5.0;
/// Default canvas edge in pixels.
pub const DEFAULT_CANVAS_SIZE: usize = 800;
/// Largest canvas edge a session accepts (a 192 MiB RGB raster).
pub const MAX_CANVAS_SIZE: usize = 8192;
/// Default padding between the horizon circle and the canvas edge.
pub const DEFAULT_PADDING: f32 = 1.1;
/// Default phase shift so that the middle panorama column faces north.
pub const DEFAULT_AZIMUTH_OFFSET_DEG: f32 = 180.0;

/// Radial and angular parameters shared by the warp and the coordinate mapper.
///
/// The horizon circle radius is `(canvas_size / 2) * zoom / padding`:
/// `zoom` is the operator-controlled magnification, `padding` a fixed margin
/// that keeps the horizon circle inside the canvas at `zoom = 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionParams {
    /// Edge of the square canvas in pixels.
    pub canvas_size: usize,
    /// Radial magnification, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub zoom: f32,
    /// Horizon padding, `> 0`.
    pub padding: f32,
    /// Panorama column phase in degrees. Only affects which source column is
    /// drawn at a given screen bearing, never the recorded azimuths.
    pub azimuth_offset_deg: f32,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            zoom: 1.0,
            padding: DEFAULT_PADDING,
            azimuth_offset_deg: DEFAULT_AZIMUTH_OFFSET_DEG,
        }
    }
}

impl ProjectionParams {
    pub fn new(canvas_size: usize) -> Self {
        Self {
            canvas_size,
            ..Self::default()
        }
    }

    /// Builder-style zoom override (clamped).
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.set_zoom(zoom);
        self
    }

    /// Set the zoom, clamping into the supported range. Non-finite values are
    /// ignored. Returns the zoom actually applied.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
        self.zoom
    }

    /// Canvas centre (both axes).
    #[inline]
    pub fn center(&self) -> f32 {
        self.canvas_size as f32 / 2.0
    }

    /// Radius of the 0° elevation circle in canvas pixels.
    #[inline]
    pub fn horizon_radius(&self) -> f32 {
        self.center() * self.zoom / self.padding
    }
}
