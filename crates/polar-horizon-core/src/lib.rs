//! Geometry core for tracing a horizon profile on a 360° panorama.
//!
//! This crate is purely geometric: rasters are plain RGB buffers and no image
//! codec is involved. It provides
//! - the polar warp of an equirectangular panorama ([`warp_polar`], cached by
//!   [`PolarCache`]),
//! - the pixel <-> (azimuth, elevation) transform ([`CoordinateMapper`]) that
//!   shares the warp's conventions,
//! - the radial/zoom parameters both of them use ([`ProjectionParams`]).

mod angles;
mod image;
mod logger;
mod mapper;
mod params;
mod projection;

pub use angles::{angular_distance, normalize_degrees, HorizonPoint};
pub use image::{sample_bilinear_rgb, sample_bilinear_rgb_u8, RasterError, RgbImage, RgbImageView};
pub use mapper::{CoordinateMapper, SEAM_AZIMUTH, SEAM_SNAP_DEG};
pub use params::{
    ProjectionParams, DEFAULT_AZIMUTH_OFFSET_DEG, DEFAULT_CANVAS_SIZE, DEFAULT_PADDING,
    MAX_CANVAS_SIZE, MAX_ZOOM, MIN_ZOOM,
};
pub use projection::{warp_polar, CacheKey, PolarCache};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
