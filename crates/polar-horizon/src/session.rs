//! Session controller.
//!
//! [`AppState`] owns everything one tracing session touches: the panorama,
//! the projection parameters, the polar raster cache, the traced path and the
//! optional reference overlay. Every operation runs to completion; callers
//! (a GUI event loop, the CLI script replay) feed it one stimulus at a time.

use std::path::Path;

use nalgebra::Point2;
use polar_horizon_core::{
    CacheKey, CoordinateMapper, HorizonPoint, PolarCache, ProjectionParams, RgbImage,
};
use polar_horizon_path::{
    export_horizon, write_horizon, AppendError, ExportError, ExportOutcome, HorizonPath,
    ReferenceError, ReferenceOverlay,
};

use crate::config::SessionConfig;
use crate::io::{load_panorama, ImageLoadError};
use crate::render::{draw_commands, DrawCommand, OverlayInput};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// What happened to one click.
#[derive(Clone, Debug, PartialEq)]
pub enum ClickOutcome {
    /// A new point was appended.
    Recorded(HorizonPoint),
    /// Same pixel as the last accepted click; ignored.
    Duplicate,
    /// Outside the horizon disc; ignored without a warning.
    OutsideHorizon,
    /// No panorama loaded yet.
    NoPanorama,
    /// The point would break the trace order; the path is unchanged.
    Rejected(AppendError),
}

#[derive(Clone, Debug)]
struct Panorama {
    image: RgbImage,
    generation: u64,
}

/// One tracing session.
#[derive(Clone, Debug)]
pub struct AppState {
    config: SessionConfig,
    params: ProjectionParams,
    panorama: Option<Panorama>,
    generation: u64,
    path: HorizonPath,
    reference: Option<ReferenceOverlay>,
    cache: PolarCache,
    last_click: Option<Point2<f32>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl AppState {
    pub fn new(config: SessionConfig) -> Self {
        let params = config.projection_params();
        let path = HorizonPath::with_direction(config.direction);
        Self {
            config,
            params,
            panorama: None,
            generation: 0,
            path,
            reference: None,
            cache: PolarCache::new(),
            last_click: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn params(&self) -> &ProjectionParams {
        &self.params
    }

    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::from_params(&self.params)
    }

    pub fn path(&self) -> &HorizonPath {
        &self.path
    }

    pub fn reference(&self) -> Option<&ReferenceOverlay> {
        self.reference.as_ref()
    }

    pub fn has_panorama(&self) -> bool {
        self.panorama.is_some()
    }

    /// Replace the panorama. Clears the traced path and drops the cached
    /// polar raster.
    pub fn load_panorama(&mut self, image: RgbImage) {
        self.generation += 1;
        log::info!(
            "panorama {}x{} loaded (generation {})",
            image.width,
            image.height,
            self.generation
        );
        self.panorama = Some(Panorama {
            image,
            generation: self.generation,
        });
        self.path.clear();
        self.last_click = None;
        self.cache.invalidate();
    }

    /// Decode and load a panorama file. On failure the session is untouched.
    pub fn load_panorama_file(&mut self, path: impl AsRef<Path>) -> Result<(), ImageLoadError> {
        let image = load_panorama(path)?;
        self.load_panorama(image);
        Ok(())
    }

    /// Parse reference text; the previous overlay is kept on failure.
    pub fn load_reference(&mut self, text: &str) -> Result<usize, ReferenceError> {
        let overlay = ReferenceOverlay::parse(text)?;
        Ok(self.set_reference(overlay))
    }

    /// Read and parse a reference file; the previous overlay is kept on
    /// failure.
    pub fn load_reference_file(&mut self, path: impl AsRef<Path>) -> Result<usize, ReferenceError> {
        let overlay = ReferenceOverlay::load(path)?;
        Ok(self.set_reference(overlay))
    }

    fn set_reference(&mut self, overlay: ReferenceOverlay) -> usize {
        let n = overlay.len();
        log::info!("reference overlay loaded ({n} points)");
        self.reference = Some(overlay);
        n
    }

    pub fn clear_reference(&mut self) {
        self.reference = None;
    }

    /// Handle a click at canvas pixel `(x, y)`.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self), fields(points = self.path.len())))]
    pub fn click(&mut self, x: f32, y: f32) -> ClickOutcome {
        if self.panorama.is_none() {
            return ClickOutcome::NoPanorama;
        }
        let at = Point2::new(x, y);
        if self.last_click == Some(at) {
            log::debug!("duplicate click at ({x}, {y}) ignored");
            return ClickOutcome::Duplicate;
        }
        let Some(point) = self.mapper().pixel_to_angle(at) else {
            log::trace!("click at ({x}, {y}) outside the horizon disc");
            return ClickOutcome::OutsideHorizon;
        };
        match self.path.append(point) {
            Ok(()) => {
                self.last_click = Some(at);
                log::debug!(
                    "recorded az={} el={} ({} points)",
                    point.azimuth,
                    point.elevation,
                    self.path.len()
                );
                ClickOutcome::Recorded(point)
            }
            Err(err) => {
                log::warn!("{err}");
                ClickOutcome::Rejected(err)
            }
        }
    }

    /// Change the zoom (clamped). Returns the zoom actually applied. Recorded
    /// points keep their angles; only their rendered position moves.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        let applied = self.params.set_zoom(zoom);
        log::debug!("zoom set to {applied:.2}");
        applied
    }

    /// Remove the last point. No-op on an empty path.
    pub fn undo(&mut self) -> Option<HorizonPoint> {
        self.last_click = None;
        self.path.undo()
    }

    /// Remove every traced point; panorama and reference stay.
    pub fn clear(&mut self) {
        self.last_click = None;
        self.path.clear();
    }

    /// Back to a fresh session with the same configuration.
    pub fn reset(&mut self) {
        log::info!("session reset");
        let generation = self.generation;
        *self = Self::new(self.config.clone());
        // Keep generations unique across resets so a stale cache key can
        // never match a later panorama.
        self.generation = generation;
    }

    /// Polar raster for the current panorama and zoom; warped on first use
    /// and after every panorama or zoom change.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self), fields(zoom = self.params.zoom, canvas = self.params.canvas_size))
    )]
    pub fn polar_raster(&mut self) -> Option<&RgbImage> {
        let panorama = self.panorama.as_ref()?;
        let key = CacheKey {
            source_id: panorama.generation,
            params: self.params,
        };
        Some(self.cache.get_or_warp(key, &panorama.image.view()))
    }

    /// Number of warps computed by this session.
    pub fn warp_count(&self) -> usize {
        self.cache.warp_count()
    }

    /// Overlay primitives for the current state.
    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        let reference = self
            .reference
            .as_ref()
            .map(|r| r.points())
            .unwrap_or_default();
        draw_commands(&OverlayInput {
            mapper: self.mapper(),
            canvas_size: self.params.canvas_size,
            path: self.path.points(),
            reference,
        })
    }

    /// Export buffer for the current path.
    pub fn export(&self) -> Vec<u8> {
        export_horizon(&self.path)
    }

    /// Write the export to `dest`; an empty path writes nothing.
    pub fn export_to(&self, dest: impl AsRef<Path>) -> Result<ExportOutcome, ExportError> {
        write_horizon(&self.path, dest)
    }

    /// Write the export to the configured output path.
    pub fn export_default(&self) -> Result<ExportOutcome, ExportError> {
        write_horizon(&self.path, &self.config.output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polar_horizon_path::TraceDirection;

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.load_panorama(RgbImage::new(72, 36));
        state
    }

    // Default canvas: centre 400, horizon radius 400 / 1.1.
    const C: f32 = 400.0;

    #[test]
    fn click_without_panorama_is_ignored() {
        let mut state = AppState::default();
        assert_eq!(state.click(C, C + 100.0), ClickOutcome::NoPanorama);
        assert!(state.path().is_empty());
    }

    #[test]
    fn clicks_record_in_decreasing_azimuth() {
        let mut state = loaded();
        let north = state.click(C, C + 100.0);
        assert!(matches!(north, ClickOutcome::Recorded(p) if p.azimuth == 359.0));

        let south = state.click(C, C - 100.0);
        assert!(matches!(south, ClickOutcome::Recorded(p) if p.azimuth == 180.0));

        // West (270°) is above the last bearing: rejected, path unchanged.
        match state.click(C - 100.0, C) {
            ClickOutcome::Rejected(AppendError::OutOfSequence {
                last, attempted, ..
            }) => {
                assert_eq!(last, 180.0);
                assert_eq!(attempted, 270.0);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(state.path().len(), 2);
    }

    #[test]
    fn repeated_click_is_idempotent() {
        let mut state = loaded();
        assert!(matches!(
            state.click(C + 50.0, C + 50.0),
            ClickOutcome::Recorded(_)
        ));
        assert_eq!(state.click(C + 50.0, C + 50.0), ClickOutcome::Duplicate);
        assert_eq!(state.path().len(), 1);

        // After undo the same pixel may be clicked again.
        state.undo();
        assert!(matches!(
            state.click(C + 50.0, C + 50.0),
            ClickOutcome::Recorded(_)
        ));
    }

    #[test]
    fn outside_disc_is_silently_ignored() {
        let mut state = loaded();
        let r = state.mapper().horizon_radius();
        assert_eq!(
            state.click(C + r + 0.5, C),
            ClickOutcome::OutsideHorizon
        );
        assert!(matches!(
            state.click(C + r - 0.5, C),
            ClickOutcome::Recorded(_)
        ));
    }

    #[test]
    fn zoom_keeps_logical_points() {
        let mut state = loaded();
        let before_px = state.mapper().angle_to_pixel(HorizonPoint::new(90.0, 30.0));
        let outcome = state.click(before_px.x, before_px.y);
        let recorded = match outcome {
            ClickOutcome::Recorded(p) => p,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(recorded, HorizonPoint::new(90.0, 30.0));

        assert_eq!(state.set_zoom(2.0), 2.0);
        assert_eq!(state.path().points()[0], recorded);

        let after_px = state.mapper().angle_to_pixel(recorded);
        let m = state.mapper();
        let r_before = ((before_px.x - C).powi(2) + (before_px.y - C).powi(2)).sqrt();
        approx::assert_relative_eq!(m.radius_of(after_px), 2.0 * r_before, epsilon = 1e-3);
    }

    #[test]
    fn polar_raster_is_cached_until_zoom_or_image_changes() {
        let mut state = loaded();
        assert!(state.polar_raster().is_some());
        assert!(state.polar_raster().is_some());
        assert_eq!(state.warp_count(), 1);

        state.set_zoom(1.5);
        let raster = state.polar_raster().expect("loaded");
        assert_eq!(raster.width, 800);
        assert_eq!(state.warp_count(), 2);

        state.load_panorama(RgbImage::new(72, 36));
        state.polar_raster();
        assert_eq!(state.warp_count(), 3);
    }

    #[test]
    fn loading_a_panorama_clears_the_path() {
        let mut state = loaded();
        state.click(C, C + 100.0);
        assert_eq!(state.path().len(), 1);
        state.load_panorama(RgbImage::new(72, 36));
        assert!(state.path().is_empty());
    }

    #[test]
    fn failed_loads_leave_state_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut state = loaded();
        state.click(C, C + 100.0);
        state.load_reference("10 2\n20 3\n").expect("valid reference");

        let bad_image = dir.path().join("bad.png");
        std::fs::write(&bad_image, b"garbage").expect("write");
        assert!(state.load_panorama_file(&bad_image).is_err());
        assert!(state.has_panorama());
        assert_eq!(state.path().len(), 1);

        let err = state.load_reference("10 2 3\n").unwrap_err();
        assert!(err.is_format());
        assert_eq!(state.reference().map(|r| r.len()), Some(2));

        let err = state
            .load_reference_file(dir.path().join("missing.txt"))
            .unwrap_err();
        assert!(!err.is_format());
        assert_eq!(state.reference().map(|r| r.len()), Some(2));
    }

    #[test]
    fn reset_drops_everything_but_config() {
        let config = SessionConfig {
            zoom: 2.0,
            ..SessionConfig::default()
        };
        let mut state = AppState::new(config.clone());
        state.load_panorama(RgbImage::new(72, 36));
        state.click(C, C + 100.0);
        state.load_reference("1 1\n").expect("valid");
        state.set_zoom(4.0);

        state.reset();
        assert!(!state.has_panorama());
        assert!(state.path().is_empty());
        assert!(state.reference().is_none());
        assert_eq!(state.params().zoom, 2.0);
        assert_eq!(state.config(), &config);
        assert_eq!(state.path().direction(), TraceDirection::Decreasing);
    }

    #[test]
    fn export_skips_empty_path_and_writes_points() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("horizon.txt");
        let mut state = loaded();
        assert_eq!(state.export_to(&dest).expect("no-op"), ExportOutcome::Skipped);
        assert!(!dest.exists());

        state.click(C, C + 100.0);
        state.click(C + 100.0, C);
        let outcome = state.export_to(&dest).expect("write");
        assert!(matches!(outcome, ExportOutcome::Written { lines: 2, .. }));
        let text = std::fs::read_to_string(&dest).expect("read");
        assert_eq!(text, String::from_utf8(state.export()).expect("utf8"));
        assert_eq!(text, "359 65\n90 65\n");
    }
}
