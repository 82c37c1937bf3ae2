use std::path::{Path, PathBuf};

/// Synthetic 360x180 panorama: blue sky above a grey ridge whose height
/// varies with azimuth, dark ground below the horizon row.
pub fn write_panorama(dir: &Path) -> PathBuf {
    let img = image::RgbImage::from_fn(360, 180, |x, y| {
        let ridge = 80 + (((x as f32).to_radians() * 3.0).sin() * 6.0) as i32;
        if (y as i32) < ridge {
            image::Rgb([90, 140, 230])
        } else if y < 90 {
            image::Rgb([110, 110, 110])
        } else {
            image::Rgb([30, 40, 20])
        }
    });
    let path = dir.join("pano.png");
    img.save(&path).expect("save panorama");
    path
}
