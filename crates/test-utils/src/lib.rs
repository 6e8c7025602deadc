//! Shared test utilities for the world-map workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic world image generators
//! - Named views and temporary image files
//! - Approximate-equality assertions for angles, coordinates and pixels
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{create_quadrant_world, fixtures::views};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::{temp_world_png, write_world_image};
pub use generators::*;

/// Assert two `f64` values are within `epsilon`, with optional context.
///
/// NaN is never close to anything, including itself.
///
/// ```
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0 + 1e-12, 1.0, 1e-10);
/// assert_approx_eq!(0.7853981634, std::f64::consts::FRAC_PI_4, 1e-9, "lat at row {}", 3);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr $(,)?) => {
        $crate::assert_approx_eq!($left, $right, $epsilon, "values differ")
    };
    ($left:expr, $right:expr, $epsilon:expr, $($context:tt)+) => {{
        let (left, right, epsilon): (f64, f64, f64) = ($left, $right, $epsilon);
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "{}: {:.12} != {:.12} (diff {:e} > {:e})",
                format_args!($($context)+),
                left,
                right,
                diff,
                epsilon
            );
        }
    }};
}

/// Assert a value with `latitude` and `longitude` fields (radians) matches
/// an expected `(latitude, longitude)` pair.
///
/// ```ignore
/// assert_lat_lon_eq!(to_spherical(&v), (FRAC_PI_4, 0.0), 1e-10);
/// ```
#[macro_export]
macro_rules! assert_lat_lon_eq {
    ($actual:expr, ($lat:expr, $lon:expr), $epsilon:expr $(,)?) => {{
        let actual = &$actual;
        $crate::assert_approx_eq!(actual.latitude, $lat, $epsilon, "latitude of {:?}", actual);
        $crate::assert_approx_eq!(actual.longitude, $lon, $epsilon, "longitude of {:?}", actual);
    }};
}

/// Macro asserting two RGBA pixels differ by at most `tolerance` per channel.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_rgba_close;
///
/// assert_rgba_close!([10, 20, 30, 255], [11, 19, 30, 255], 1);
/// ```
#[macro_export]
macro_rules! assert_rgba_close {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left: [u8; 4] = $left;
        let right: [u8; 4] = $right;
        let tolerance: u8 = $tolerance;
        for i in 0..4 {
            if left[i].abs_diff(right[i]) > tolerance {
                panic!(
                    "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n channel {} differs by more than {}",
                    left, right, i, tolerance
                );
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    #[derive(Debug)]
    struct LatLon {
        latitude: f64,
        longitude: f64,
    }

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001, "heading {}", "degrees");
    }

    #[test]
    #[should_panic(expected = "pixel 4: ")]
    fn test_assert_approx_eq_reports_context() {
        assert_approx_eq!(1.1, 1.0, 0.001, "pixel {}", 4);
    }

    #[test]
    #[should_panic(expected = "values differ")]
    fn test_assert_approx_eq_rejects_nan() {
        assert_approx_eq!(f64::NAN, f64::NAN, 1.0);
    }

    #[test]
    fn test_assert_lat_lon_eq() {
        let coord = LatLon {
            latitude: 0.5,
            longitude: -1.0 + 1e-12,
        };
        assert_lat_lon_eq!(coord, (0.5, -1.0), 1e-10);
    }

    #[test]
    #[should_panic(expected = "longitude of LatLon")]
    fn test_assert_lat_lon_eq_names_component() {
        let coord = LatLon {
            latitude: 0.5,
            longitude: 2.0,
        };
        assert_lat_lon_eq!(coord, (0.5, -2.0), 1e-10);
    }

    #[test]
    fn test_assert_rgba_close() {
        assert_rgba_close!([10, 20, 30, 255], [11, 19, 30, 255], 1);
    }

    #[test]
    #[should_panic(expected = "channel 2")]
    fn test_assert_rgba_close_fails() {
        assert_rgba_close!([10, 20, 30, 255], [10, 20, 40, 255], 2);
    }
}
