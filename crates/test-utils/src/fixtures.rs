//! Common test fixtures: named views and on-disk world images.

use std::path::{Path, PathBuf};

use image::{ImageResult, RgbaImage};
use tempfile::TempDir;

use crate::generators::create_quadrant_world;

/// Named viewing rotations as (latitude, longitude, heading) in degrees.
pub mod views {
    /// Unrotated view.
    pub const IDENTITY: (f64, f64, f64) = (0.0, 0.0, 0.0);

    /// Looking down at the north pole.
    pub const NORTH_POLE: (f64, f64, f64) = (90.0, 0.0, 0.0);

    /// Looking down at the south pole.
    pub const SOUTH_POLE: (f64, f64, f64) = (-90.0, 0.0, 0.0);

    /// Centred on the antimeridian.
    pub const PACIFIC: (f64, f64, f64) = (0.0, 180.0, 0.0);

    /// An arbitrary tilted view.
    pub const TILTED: (f64, f64, f64) = (37.5, -122.3, 30.0);

    /// Every named view.
    pub const ALL: [(f64, f64, f64); 5] = [IDENTITY, NORTH_POLE, SOUTH_POLE, PACIFIC, TILTED];
}

/// Write RGBA bytes as an image file; the format follows the extension.
pub fn write_world_image(
    path: &Path,
    width: usize,
    height: usize,
    pixels: Vec<u8>,
) -> ImageResult<()> {
    let image = RgbaImage::from_raw(width as u32, height as u32, pixels).ok_or_else(|| {
        image::ImageError::Parameter(image::error::ParameterError::from_kind(
            image::error::ParameterErrorKind::DimensionMismatch,
        ))
    })?;
    image.save(path)
}

/// Create a temporary directory holding `world.png`, a quadrant world.
///
/// The directory is removed when the returned [`TempDir`] is dropped.
pub fn temp_world_png(width: usize, height: usize) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("world.png");
    write_world_image(&path, width, height, create_quadrant_world(width, height))
        .expect("Failed to write world image");
    (dir, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_world_png_roundtrips() {
        let (_dir, path) = temp_world_png(16, 8);
        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (16, 8));
        assert_eq!(image.get_pixel(0, 0).0, crate::NORTH_WEST);
    }

    #[test]
    fn test_write_world_image_rejects_short_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_world_image(&dir.path().join("bad.png"), 4, 4, vec![0; 10]);
        assert!(result.is_err());
    }
}
