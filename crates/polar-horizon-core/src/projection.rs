//! Equirectangular -> polar re-projection.
//!
//! Every canvas pixel `(x, y)` is mapped back into the panorama:
//! - `theta = atan2(dx, dy)` wrapped into `[0, 2π)`, the same bearing the
//!   [`crate::CoordinateMapper`] reports;
//! - `src_x = ((theta + offset) mod 2π) / 2π * w`;
//! - `src_y = (dist / horizon_radius) * h / 2`, so the horizon circle samples
//!   the middle panorama row and the centre samples the zenith row.
//!
//! Columns wrap, rows beyond the panorama come out black.

use std::f32::consts::TAU;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::image::{sample_bilinear_rgb_u8, RgbImage, RgbImageView};
use crate::params::ProjectionParams;

/// Warp a full 360° equirectangular panorama into a square polar raster of
/// `params.canvas_size` pixels.
///
/// Deterministic: identical inputs always give a bit-identical raster.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(src, params), fields(width = src.width, height = src.height, zoom = params.zoom))
)]
pub fn warp_polar(src: &RgbImageView<'_>, params: &ProjectionParams) -> RgbImage {
    let size = params.canvas_size;
    let mut out = RgbImage::new(size, size);
    let radius = params.horizon_radius();
    if src.is_empty() || size == 0 || radius <= 0.0 {
        return out;
    }

    let c = params.center();
    let w = src.width as f32;
    let half_h = src.height as f32 / 2.0;
    let offset = params.azimuth_offset_deg.to_radians();

    for y in 0..size {
        let dy = y as f32 - c;
        let row = &mut out.data[y * size * 3..(y + 1) * size * 3];
        for x in 0..size {
            let dx = x as f32 - c;
            let r = (dx * dx + dy * dy).sqrt() / radius;

            // atan2(0, 0) is 0, which is the zenith convention we want.
            let theta = (dx.atan2(dy) + offset).rem_euclid(TAU);
            let src_x = theta / TAU * w;
            let src_y = r * half_h;

            let rgb = sample_bilinear_rgb_u8(src, src_x, src_y);
            row[x * 3..x * 3 + 3].copy_from_slice(&rgb);
        }
    }

    log::debug!(
        "warped {}x{} panorama into {}x{} polar raster (zoom={:.2}, radius={:.1}px)",
        src.width,
        src.height,
        size,
        size,
        params.zoom,
        radius
    );
    out
}

/// Identity of one cached warp: which source image and which parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheKey {
    /// Caller-assigned generation of the source image; bump it on every load.
    pub source_id: u64,
    pub params: ProjectionParams,
}

#[derive(Clone, Debug)]
struct CachedRaster {
    key: CacheKey,
    raster: RgbImage,
}

/// Single-entry cache for the last warped raster.
#[derive(Clone, Debug, Default)]
pub struct PolarCache {
    entry: Option<CachedRaster>,
    warps: usize,
}

impl PolarCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached raster for `key`, warping `src` first if the cache
    /// holds a different key (or nothing).
    pub fn get_or_warp(&mut self, key: CacheKey, src: &RgbImageView<'_>) -> &RgbImage {
        let entry = match self.entry.take() {
            Some(cached) if cached.key == key => cached,
            _ => {
                self.warps += 1;
                CachedRaster {
                    key,
                    raster: warp_polar(src, &key.params),
                }
            }
        };
        &self.entry.insert(entry).raster
    }

    /// Cached raster for `key`, without computing anything.
    pub fn get(&self, key: &CacheKey) -> Option<&RgbImage> {
        self.entry
            .as_ref()
            .filter(|cached| cached.key == *key)
            .map(|cached| &cached.raster)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Number of warps computed so far.
    pub fn warp_count(&self) -> usize {
        self.warps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::HorizonPoint;
    use crate::mapper::CoordinateMapper;

    /// Panorama whose red channel encodes the column (azimuth) and green the
    /// row (elevation band).
    fn gradient_panorama(w: usize, h: usize) -> RgbImage {
        let mut data = Vec::with_capacity(w * h * 3);
        for y in 0..h {
            for x in 0..w {
                data.push((x * 255 / (w - 1)) as u8);
                data.push((y * 255 / (h - 1)) as u8);
                data.push(200);
            }
        }
        RgbImage::from_raw(w, h, data).expect("valid")
    }

    fn small_params() -> ProjectionParams {
        ProjectionParams {
            canvas_size: 64,
            azimuth_offset_deg: 0.0,
            ..ProjectionParams::default()
        }
    }

    #[test]
    fn output_has_canvas_size() {
        let pano = gradient_panorama(36, 18);
        let out = warp_polar(&pano.view(), &small_params());
        assert_eq!(out.width, 64);
        assert_eq!(out.height, 64);
        assert_eq!(out.data.len(), 64 * 64 * 3);
    }

    #[test]
    fn warp_is_deterministic() {
        let pano = gradient_panorama(72, 36);
        let params = small_params().with_zoom(1.7);
        let a = warp_polar(&pano.view(), &params);
        let b = warp_polar(&pano.view(), &params);
        assert_eq!(a, b);
    }

    #[test]
    fn horizon_circle_samples_middle_row() {
        let pano = gradient_panorama(360, 180);
        let params = ProjectionParams {
            canvas_size: 200,
            ..ProjectionParams::default()
        };
        let out = warp_polar(&pano.view(), &params);
        let mapper = CoordinateMapper::from_params(&params);

        let centre = out.pixel(100, 100).expect("in raster");
        assert_eq!(centre[1], 0, "zenith samples the top row");

        // 45° elevation is a quarter of the panorama height.
        let p = mapper.angle_to_pixel(HorizonPoint::new(90.0, 45.0));
        let px = out
            .pixel(p.x.round() as usize, p.y.round() as usize)
            .expect("in raster");
        let expected = (45.0_f32 / 179.0 * 255.0) as i32;
        assert!((px[1] as i32 - expected).abs() <= 3, "green {}", px[1]);
    }

    #[test]
    fn below_panorama_extent_is_black() {
        let pano = gradient_panorama(36, 18);
        // Corners are at sqrt(2) * 32 px; with zoom 0.5 that is > 2 horizon
        // radii, i.e. beyond the bottom of the panorama.
        let params = small_params().with_zoom(0.5);
        let out = warp_polar(&pano.view(), &params);
        assert_eq!(out.pixel(0, 0), Some([0, 0, 0]));
        assert_eq!(out.pixel(63, 63), Some([0, 0, 0]));
    }

    #[test]
    fn offset_rotates_source_columns() {
        let pano = gradient_panorama(360, 180);
        let base = ProjectionParams {
            canvas_size: 100,
            azimuth_offset_deg: 0.0,
            ..ProjectionParams::default()
        };
        let shifted = ProjectionParams {
            azimuth_offset_deg: 90.0,
            ..base
        };
        let a = warp_polar(&pano.view(), &base);
        let b = warp_polar(&pano.view(), &shifted);

        // Pixel to the right of centre is bearing 90°.
        let east_a = a.pixel(80, 50).expect("in raster")[0] as i32;
        let east_b = b.pixel(80, 50).expect("in raster")[0] as i32;
        assert!((east_a - 64).abs() <= 2, "red {east_a}");
        assert!((east_b - 128).abs() <= 2, "red {east_b}");
    }

    #[test]
    fn cache_recomputes_only_on_key_change() {
        let pano = gradient_panorama(36, 18);
        let mut cache = PolarCache::new();
        let key = CacheKey {
            source_id: 1,
            params: small_params(),
        };

        let first = cache.get_or_warp(key, &pano.view()).clone();
        let second = cache.get_or_warp(key, &pano.view()).clone();
        assert_eq!(first, second);
        assert_eq!(cache.warp_count(), 1);

        let zoomed = CacheKey {
            params: small_params().with_zoom(2.0),
            ..key
        };
        cache.get_or_warp(zoomed, &pano.view());
        assert_eq!(cache.warp_count(), 2);
        assert!(cache.get(&key).is_none());
        assert!(cache.get(&zoomed).is_some());

        cache.invalidate();
        assert!(cache.get(&zoomed).is_none());
    }
}
