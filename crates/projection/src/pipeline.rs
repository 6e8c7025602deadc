//! Output pixel to source pixel coordinate pipeline.
//!
//! ```text
//! (x, y) ──projection──▶ (lat, lon) ──to_vector──▶ v ──rotate──▶ v'
//!        ──to_spherical──▶ (lat', lon') ──▶ (px, py) in the source raster
//! ```
//!
//! Every function here is pure and reentrant, so callers may evaluate
//! pixels in any order and on any number of threads.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, ProjectionResult};
use crate::map_projection::MapProjection;
use crate::rotation::Rotation;
use crate::spherical::{to_spherical, SphericalCoord};

/// Fractional pixel coordinate in the source raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceCoord {
    pub px: f64,
    pub py: f64,
}

/// Latitude/longitude in the source raster's (unrotated) frame for an
/// output coordinate, or `None` where the projection has no coverage.
#[inline]
pub fn map_coord(
    x: f64,
    y: f64,
    rotation: &Rotation,
    projection: MapProjection,
) -> Option<SphericalCoord> {
    let raw = projection.unproject(x, y)?;
    let rotated = rotation.rotate_vector(&raw.to_vector());
    Some(to_spherical(&rotated))
}

/// Map a normalized output coordinate to a fractional source pixel.
///
/// `Ok(None)` means the pixel is outside the projection's coverage and should
/// be left empty. An `Err` means the rotated coordinate left the sphere's
/// domain, which is a numerical bug and is reported rather than clamped.
#[inline]
pub fn map_output_pixel_to_source(
    x: f64,
    y: f64,
    rotation: &Rotation,
    projection: MapProjection,
    source_width: usize,
    source_height: usize,
) -> ProjectionResult<Option<SourceCoord>> {
    let Some(coord) = map_coord(x, y, rotation, projection) else {
        return Ok(None);
    };
    validate_domain(&coord)?;
    Ok(Some(source_coord(&coord, source_width, source_height)))
}

/// Check latitude ∈ [-π/2, π/2] and longitude ∈ [-π, π]. NaN fails both.
#[inline]
pub fn validate_domain(coord: &SphericalCoord) -> ProjectionResult<()> {
    let lat_ok = (-FRAC_PI_2..=FRAC_PI_2).contains(&coord.latitude);
    let lon_ok = (-PI..=PI).contains(&coord.longitude);
    if lat_ok && lon_ok {
        Ok(())
    } else {
        Err(ProjectionError::CoordinateOutOfDomain {
            latitude: coord.latitude,
            longitude: coord.longitude,
        })
    }
}

/// Position of a geographic coordinate in an equirectangular raster.
///
/// Longitude -π maps to the left edge, latitude π/2 to the top edge.
#[inline]
pub fn source_coord(coord: &SphericalCoord, source_width: usize, source_height: usize) -> SourceCoord {
    SourceCoord {
        px: (coord.longitude + PI) / TAU * source_width as f64,
        py: (0.5 - coord.latitude / PI) * source_height as f64,
    }
}

/// Normalized coordinate of output pixel (col, row).
///
/// Rows count down from the top while `y` counts up from the bottom, so row
/// 0 is `y = 1`.
#[inline]
pub fn output_coord(col: usize, row: usize, width: usize, height: usize) -> (f64, f64) {
    (
        col as f64 / width as f64,
        1.0 - row as f64 / height as f64,
    )
}
