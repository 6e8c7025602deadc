//! Error types for rotation construction and coordinate mapping.

use thiserror::Error;

/// Result type alias using ProjectionError.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Errors produced by the projection crate.
///
/// Orthographic pixels outside the visible disk are *not* errors; they are
/// reported as `None` by the projection functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// A rotation was requested with a latitude outside its valid range.
    #[error("latitude out of range: {value:.3} (expected {min:.3} to {max:.3})")]
    LatitudeOutOfRange { value: f64, min: f64, max: f64 },

    /// A longitude or heading that is NaN or infinite.
    #[error("{name} must be finite, got {value}")]
    NonFiniteAngle { name: &'static str, value: f64 },

    /// The pipeline produced a coordinate outside the sphere's domain.
    ///
    /// Every stage is an exact sphere operation, so this only happens when
    /// floating-point drift exceeds tolerance. It is reported, never clamped.
    #[error("coordinate outside valid domain: latitude {latitude:.6}, longitude {longitude:.6}")]
    CoordinateOutOfDomain { latitude: f64, longitude: f64 },

    /// A projection name that does not match any supported projection.
    #[error("unknown projection: {0}")]
    UnknownProjection(String),
}

impl ProjectionError {
    /// Create a LatitudeOutOfRange error for a radian value.
    pub fn latitude_radians(value: f64) -> Self {
        Self::LatitudeOutOfRange {
            value,
            min: -std::f64::consts::FRAC_PI_2,
            max: std::f64::consts::FRAC_PI_2,
        }
    }

    /// Create a LatitudeOutOfRange error for a degree value.
    pub fn latitude_degrees(value: f64) -> Self {
        Self::LatitudeOutOfRange {
            value,
            min: -90.0,
            max: 90.0,
        }
    }

    /// Reject a NaN or infinite angle component.
    pub fn check_finite(name: &'static str, value: f64) -> ProjectionResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NonFiniteAngle { name, value })
        }
    }

    /// Create an UnknownProjection error.
    pub fn unknown_projection(name: impl Into<String>) -> Self {
        Self::UnknownProjection(name.into())
    }

    /// Whether this error was caused by caller input rather than a bug.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::CoordinateOutOfDomain { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_finite() {
        assert_eq!(ProjectionError::check_finite("heading", -3.5), Ok(-3.5));
        assert!(matches!(
            ProjectionError::check_finite("longitude", f64::INFINITY),
            Err(ProjectionError::NonFiniteAngle { name: "longitude", .. })
        ));
        let err = ProjectionError::check_finite("heading", f64::NAN).unwrap_err();
        assert_eq!(err.to_string(), "heading must be finite, got NaN");
        assert!(err.is_input_error());
    }
}
