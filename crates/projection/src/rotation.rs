//! Viewing rotation of the globe.
//!
//! A [`Rotation`] is an immutable three-degree-of-freedom orientation
//! (latitude, longitude, heading) stored as a unit quaternion. The angles
//! are never stored; the accessors decode them from the quaternion, so
//! `with_*` edits go through the decoded values.
//!
//! The quaternion is the intrinsic Z-Y-X composition
//!
//! ```text
//! q = Rz(longitude) · Ry(-latitude) · Rx(heading)
//! ```
//!
//! Heading spins the view about the viewing axis (+X, the sub-viewer point),
//! latitude tilts the pole toward or away from the viewer, longitude spins the
//! globe about the polar axis.

use std::f64::consts::FRAC_PI_2;
use std::fmt;

use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, ProjectionResult};
use crate::spherical::UnitVector3;

/// Below this `cos(pitch)` the yaw/roll split is treated as gimbal-locked.
const GIMBAL_LOCK_EPSILON: f64 = 1e-9;

/// Decoded rotation angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    pub latitude: f64,
    pub longitude: f64,
    pub heading: f64,
}

impl EulerAngles {
    /// The same angles in degrees.
    pub fn to_degrees(self) -> Self {
        Self {
            latitude: self.latitude.to_degrees(),
            longitude: self.longitude.to_degrees(),
            heading: self.heading.to_degrees(),
        }
    }
}

/// Immutable globe orientation backed by a unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    inner: UnitQuaternion<f64>,
}

impl Rotation {
    /// The identity rotation: the sub-viewer point is (0°, 0°), north is up.
    pub fn identity() -> Self {
        Self {
            inner: UnitQuaternion::identity(),
        }
    }

    /// Build a rotation from radians.
    ///
    /// Fails if latitude is outside [-π/2, π/2] or if longitude or heading
    /// is not finite. Finite longitude and heading are accepted as given.
    pub fn from_angles(latitude: f64, longitude: f64, heading: f64) -> ProjectionResult<Self> {
        if !(-FRAC_PI_2..=FRAC_PI_2).contains(&latitude) {
            return Err(ProjectionError::latitude_radians(latitude));
        }
        Ok(Self::compose(
            latitude,
            ProjectionError::check_finite("longitude", longitude)?,
            ProjectionError::check_finite("heading", heading)?,
        ))
    }

    /// Build a rotation from degrees.
    ///
    /// The range check runs on the degree value so ±90° is always accepted,
    /// regardless of rounding in the radian conversion.
    pub fn from_degrees(latitude: f64, longitude: f64, heading: f64) -> ProjectionResult<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ProjectionError::latitude_degrees(latitude));
        }
        Ok(Self::compose(
            latitude.to_radians(),
            ProjectionError::check_finite("longitude", longitude)?.to_radians(),
            ProjectionError::check_finite("heading", heading)?.to_radians(),
        ))
    }

    fn compose(latitude: f64, longitude: f64, heading: f64) -> Self {
        // from_euler_angles(roll, pitch, yaw) = Rz(yaw) * Ry(pitch) * Rx(roll)
        Self {
            inner: UnitQuaternion::from_euler_angles(heading, -latitude, longitude),
        }
    }

    /// The underlying unit quaternion.
    pub fn quaternion(&self) -> &UnitQuaternion<f64> {
        &self.inner
    }

    /// All three angles in radians.
    pub fn angles(&self) -> EulerAngles {
        let (yaw, pitch, roll) = decompose_zyx(&self.inner);
        EulerAngles {
            latitude: -pitch,
            longitude: yaw,
            heading: roll,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.angles().latitude
    }

    pub fn longitude(&self) -> f64 {
        self.angles().longitude
    }

    pub fn heading(&self) -> f64 {
        self.angles().heading
    }

    pub fn latitude_degrees(&self) -> f64 {
        self.latitude().to_degrees()
    }

    pub fn longitude_degrees(&self) -> f64 {
        self.longitude().to_degrees()
    }

    pub fn heading_degrees(&self) -> f64 {
        self.heading().to_degrees()
    }

    /// Rotate a point on the unit sphere. Norm-preserving.
    #[inline]
    pub fn rotate_vector(&self, v: &UnitVector3) -> UnitVector3 {
        self.inner.transform_vector(v)
    }

    /// New rotation with latitude replaced (radians).
    pub fn with_latitude(&self, latitude: f64) -> ProjectionResult<Self> {
        let angles = self.angles();
        Self::from_angles(latitude, angles.longitude, angles.heading)
    }

    /// New rotation with longitude replaced (radians).
    pub fn with_longitude(&self, longitude: f64) -> ProjectionResult<Self> {
        let longitude = ProjectionError::check_finite("longitude", longitude)?;
        let angles = self.angles();
        Ok(Self::compose(angles.latitude, longitude, angles.heading))
    }

    /// New rotation with heading replaced (radians).
    pub fn with_heading(&self, heading: f64) -> ProjectionResult<Self> {
        let heading = ProjectionError::check_finite("heading", heading)?;
        let angles = self.angles();
        Ok(Self::compose(angles.latitude, angles.longitude, heading))
    }

    pub fn with_latitude_degrees(&self, latitude: f64) -> ProjectionResult<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ProjectionError::latitude_degrees(latitude));
        }
        let angles = self.angles();
        Ok(Self::compose(
            latitude.to_radians(),
            angles.longitude,
            angles.heading,
        ))
    }

    pub fn with_longitude_degrees(&self, longitude: f64) -> ProjectionResult<Self> {
        self.with_longitude(longitude.to_radians())
    }

    pub fn with_heading_degrees(&self, heading: f64) -> ProjectionResult<Self> {
        self.with_heading(heading.to_radians())
    }

    /// Human-readable angles (degrees) and raw quaternion components.
    pub fn debug(&self) -> String {
        let angles = self.angles().to_degrees();
        let q = self.inner.quaternion();
        // Adding 0.0 turns -0.0 into 0.0 so the identity prints without signs.
        [
            ("lat", angles.latitude),
            ("lon", angles.longitude),
            ("hea", angles.heading),
            ("w", q.w),
            ("x", q.i),
            ("y", q.j),
            ("z", q.k),
        ]
        .iter()
        .map(|(k, v)| format!("{}: {:.2}", k, v + 0.0))
        .collect::<Vec<_>>()
        .join(" ")
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug())
    }
}

/// Decompose a unit quaternion into intrinsic Z-Y-X angles `(yaw, pitch, roll)`.
///
/// Pitch comes from `atan2` against `hypot(r00, r10)` rather than `asin`,
/// which keeps it exact near ±π/2. When gimbal-locked, roll is fixed at 0 and
/// the whole spin about the polar axis is reported as yaw.
pub fn decompose_zyx(q: &UnitQuaternion<f64>) -> (f64, f64, f64) {
    let q = q.quaternion();
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);

    let r00 = 1.0 - 2.0 * (y * y + z * z);
    let r10 = 2.0 * (x * y + w * z);
    let r20 = 2.0 * (x * z - w * y);

    let cos_pitch = r00.hypot(r10);
    let pitch = (-r20).atan2(cos_pitch);

    if cos_pitch > GIMBAL_LOCK_EPSILON {
        let r21 = 2.0 * (y * z + w * x);
        let r22 = 1.0 - 2.0 * (x * x + y * y);
        let yaw = r10.atan2(r00);
        let roll = r21.atan2(r22);
        (yaw, pitch, roll)
    } else {
        // Rz(a)·Ry(±π/2)·Rx(c) only depends on a ∓ c; take c = 0.
        let r11 = 1.0 - 2.0 * (x * x + z * z);
        let r12 = 2.0 * (y * z - w * x);
        let yaw = (pitch.signum() * r12).atan2(r11);
        (yaw, pitch, 0.0)
    }
}
