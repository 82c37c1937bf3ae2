//! Image decode/encode at the edge of the workspace.
//!
//! The geometry crates only see [`polar_horizon_core::RgbImage`]; this module
//! converts from and to the `image` crate.

use std::path::Path;

use ::image::{DynamicImage, ImageReader};
use polar_horizon_core::{RasterError, RgbImage};

/// Failure to obtain a panorama raster.
#[derive(thiserror::Error, Debug)]
pub enum ImageLoadError {
    #[error("failed to open image: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(#[from] ::image::ImageError),
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Convert any decoded image into an RGB raster.
pub fn rgb_from_dynamic(img: DynamicImage) -> Result<RgbImage, ImageLoadError> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width != 2 * height {
        log::warn!(
            "panorama is {width}x{height}; a full 360°x180° equirectangular capture is 2:1"
        );
    }
    Ok(RgbImage::from_raw(
        width as usize,
        height as usize,
        rgb.into_raw(),
    )?)
}

/// Decode an in-memory image (any format supported by `image`).
pub fn decode_panorama(bytes: &[u8]) -> Result<RgbImage, ImageLoadError> {
    let img = ::image::load_from_memory(bytes)?;
    rgb_from_dynamic(img)
}

/// Open and decode an image file. The format is guessed from the content.
pub fn load_panorama(path: impl AsRef<Path>) -> Result<RgbImage, ImageLoadError> {
    let img = ImageReader::open(path.as_ref())?
        .with_guessed_format()?
        .decode()?;
    log::info!(
        "loaded panorama {} ({}x{})",
        path.as_ref().display(),
        img.width(),
        img.height()
    );
    rgb_from_dynamic(img)
}

/// Copy a raster into an `image` buffer, e.g. to draw overlays on it.
pub fn to_canvas(raster: &RgbImage) -> Result<::image::RgbImage, RasterError> {
    ::image::RgbImage::from_raw(
        raster.width as u32,
        raster.height as u32,
        raster.data.clone(),
    )
    .ok_or(RasterError::InvalidBufferLength {
        expected: raster.width * raster.height * 3,
        got: raster.data.len(),
    })
}

/// Save a canvas; the format follows the file extension.
pub fn save_canvas(path: impl AsRef<Path>, canvas: &::image::RgbImage) -> Result<(), ::image::ImageError> {
    canvas.save(path.as_ref())?;
    log::info!("wrote {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_panorama(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ImageLoadError::Decode(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_panorama(dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, ImageLoadError::Io(_)));
    }

    #[test]
    fn png_round_trip_keeps_pixels() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pano.png");
        let mut src = RgbImage::new(8, 4);
        src.put_pixel(3, 1, [10, 20, 30]);
        save_canvas(&path, &to_canvas(&src).expect("canvas")).expect("save");

        let back = load_panorama(&path).expect("load");
        assert_eq!(back, src);
    }

    #[test]
    fn canvas_copies_the_raster() {
        let mut raster = RgbImage::new(4, 3);
        raster.put_pixel(2, 1, [1, 2, 3]);
        let canvas = to_canvas(&raster).expect("consistent buffer");
        assert_eq!(canvas.dimensions(), (4, 3));
        assert_eq!(canvas.get_pixel(2, 1), &::image::Rgb([1, 2, 3]));
    }
}
