//! Output map projections.
//!
//! Each projection maps normalized output coordinates `x, y ∈ [0, 1]`
//! (x left to right, y bottom to top) to the unprojected latitude/longitude
//! shown at that point, before the view rotation is applied.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;
use crate::spherical::SphericalCoord;

/// Supported output projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapProjection {
    /// Plate carrée, 2:1.
    #[default]
    Equirectangular,
    /// Front-facing globe; only the inscribed disk is covered.
    Orthographic,
    /// Square mercator, latitude range ±85.05°.
    Mercator,
}

impl MapProjection {
    pub const ALL: [MapProjection; 3] = [
        MapProjection::Equirectangular,
        MapProjection::Orthographic,
        MapProjection::Mercator,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MapProjection::Equirectangular => "equirectangular",
            MapProjection::Orthographic => "orthographic",
            MapProjection::Mercator => "mercator",
        }
    }

    /// Width / height of the output canvas for this projection.
    pub fn aspect_ratio(&self) -> f64 {
        match self {
            MapProjection::Equirectangular => 2.0,
            MapProjection::Orthographic | MapProjection::Mercator => 1.0,
        }
    }

    /// Unproject a normalized output coordinate.
    ///
    /// Returns `None` where the projection has no coverage (outside the
    /// orthographic disk).
    #[inline]
    pub fn unproject(&self, x: f64, y: f64) -> Option<SphericalCoord> {
        match self {
            MapProjection::Equirectangular => Some(equirectangular(x, y)),
            MapProjection::Orthographic => orthographic(x, y),
            MapProjection::Mercator => Some(mercator(x, y)),
        }
    }

    /// Largest `(width, height)` with this aspect ratio that fits in the box.
    ///
    /// Mirrors sizing a canvas to `min(box_w, ratio * box_h)`. Both results
    /// are at least 1.
    pub fn fit_dimensions(&self, max_width: usize, max_height: usize) -> (usize, usize) {
        let ratio = self.aspect_ratio();
        let width = (max_width as f64).min(ratio * max_height as f64);
        let height = width / ratio;
        (
            (width.floor() as usize).max(1),
            (height.floor() as usize).max(1),
        )
    }
}

impl fmt::Display for MapProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MapProjection {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equirectangular" => Ok(MapProjection::Equirectangular),
            "orthographic" => Ok(MapProjection::Orthographic),
            "mercator" => Ok(MapProjection::Mercator),
            _ => Err(ProjectionError::unknown_projection(s)),
        }
    }
}

/// Width / height of the output canvas for a projection.
pub fn aspect_ratio(projection: MapProjection) -> f64 {
    projection.aspect_ratio()
}

/// Equirectangular: linear in both latitude and longitude.
#[inline]
pub fn equirectangular(x: f64, y: f64) -> SphericalCoord {
    SphericalCoord {
        latitude: (y - 0.5) * PI,
        longitude: (x - 0.5) * TAU,
    }
}

/// Orthographic globe seen from (0°, 0°).
#[inline]
pub fn orthographic(x: f64, y: f64) -> Option<SphericalCoord> {
    let x = (x - 0.5) * 2.0;
    let y = (y - 0.5) * 2.0;
    let r2 = x * x + y * y;
    if r2 > 1.0 {
        return None;
    }
    let z = (1.0 - r2).sqrt();
    Some(SphericalCoord {
        latitude: y.asin(),
        longitude: x.atan2(z),
    })
}

/// Mercator over the full square; y = 0 and y = 1 sit at ±85.05°.
#[inline]
pub fn mercator(x: f64, y: f64) -> SphericalCoord {
    SphericalCoord {
        latitude: 2.0 * ((y - 0.5) * TAU).exp().atan() - FRAC_PI_2,
        longitude: (x - 0.5) * TAU,
    }
}
