//! Conversion between geographic coordinates and points on the unit sphere.
//!
//! Axis convention: +X points at (lat 0, lon 0), +Y at (lat 0, lon 90°E),
//! +Z at the north pole.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A point on the unit sphere, `x² + y² + z² = 1` within floating-point tolerance.
pub type UnitVector3 = Vector3<f64>;

/// Latitude/longitude pair in radians.
///
/// Latitude is in [-π/2, π/2]. Longitude is conventionally in [-π, π] but
/// not every producer guarantees it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphericalCoord {
    pub latitude: f64,
    pub longitude: f64,
}

impl SphericalCoord {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build from degrees.
    pub fn from_degrees(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude.to_radians(), longitude.to_radians())
    }

    /// Returns (latitude, longitude) in degrees.
    pub fn to_degrees(&self) -> (f64, f64) {
        (self.latitude.to_degrees(), self.longitude.to_degrees())
    }

    /// Unit vector for this coordinate.
    pub fn to_vector(&self) -> UnitVector3 {
        to_vector(self.latitude, self.longitude)
    }
}

/// Convert latitude/longitude (radians) to a unit vector.
#[inline]
pub fn to_vector(latitude: f64, longitude: f64) -> UnitVector3 {
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let (sin_lon, cos_lon) = longitude.sin_cos();
    Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
}

/// Convert a unit vector back to latitude/longitude (radians).
///
/// `z` is clamped to [-1, 1] so a vector that drifted slightly off the unit
/// sphere still yields a finite latitude. At the poles `atan2(0, 0)` gives a
/// longitude of 0.
#[inline]
pub fn to_spherical(v: &UnitVector3) -> SphericalCoord {
    SphericalCoord {
        latitude: v.z.clamp(-1.0, 1.0).asin(),
        longitude: v.y.atan2(v.x),
    }
}
