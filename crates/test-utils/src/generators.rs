//! Synthetic equirectangular world images.
//!
//! Every generator returns row-major RGBA8 bytes covering longitude
//! [-180°, 180°) left to right and latitude [90°, -90°] top to bottom, the
//! same layout the renderer expects of a source image.

/// North-west quadrant colour (lon < 0, lat > 0).
pub const NORTH_WEST: [u8; 4] = [255, 0, 0, 255];
/// North-east quadrant colour (lon >= 0, lat > 0).
pub const NORTH_EAST: [u8; 4] = [0, 255, 0, 255];
/// South-west quadrant colour (lon < 0, lat <= 0).
pub const SOUTH_WEST: [u8; 4] = [0, 0, 255, 255];
/// South-east quadrant colour (lon >= 0, lat <= 0).
pub const SOUTH_EAST: [u8; 4] = [255, 255, 0, 255];

/// A world split into four solid hemispheric quadrants.
///
/// # Example
///
/// ```
/// use test_utils::{create_quadrant_world, NORTH_WEST, SOUTH_EAST};
///
/// let pixels = create_quadrant_world(4, 2);
/// assert_eq!(&pixels[0..4], &NORTH_WEST);
/// assert_eq!(&pixels[28..32], &SOUTH_EAST);
/// ```
pub fn create_quadrant_world(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let north = y < height / 2;
        for x in 0..width {
            let west = x < width / 2;
            let color = match (north, west) {
                (true, true) => NORTH_WEST,
                (true, false) => NORTH_EAST,
                (false, true) => SOUTH_WEST,
                (false, false) => SOUTH_EAST,
            };
            pixels.extend_from_slice(&color);
        }
    }
    pixels
}

/// A world whose pixels encode their own position.
///
/// Red is `x * 255 / (width - 1)` and green is `y * 255 / (height - 1)`,
/// so a sampled colour reveals roughly where it came from.
pub fn create_position_world(width: usize, height: usize) -> Vec<u8> {
    let max_x = width.saturating_sub(1).max(1);
    let max_y = height.saturating_sub(1).max(1);
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / max_x) as u8;
            let g = (y * 255 / max_y) as u8;
            pixels.extend_from_slice(&[r, g, 64, 255]);
        }
    }
    pixels
}

/// A single-colour world.
pub fn create_solid_world(width: usize, height: usize, color: [u8; 4]) -> Vec<u8> {
    color.repeat(width * height)
}

/// Alternating black and white latitude bands, `band_degrees` tall.
///
/// Useful for checking how a projection stretches latitudes.
pub fn create_latitude_bands(width: usize, height: usize, band_degrees: f64) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let lat = 90.0 - (y as f64 + 0.5) / height as f64 * 180.0;
        let band = ((lat + 90.0) / band_degrees).floor() as i64;
        let v = if band % 2 == 0 { 0 } else { 255 };
        for _ in 0..width {
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    pixels
}
