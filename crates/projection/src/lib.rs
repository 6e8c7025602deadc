//! Coordinate transformations for world map rendering.
//!
//! Maps every output pixel of a map view back to a fractional pixel of an
//! equirectangular source image:
//!
//! - [`rotation`]: quaternion-backed viewing rotation
//! - [`spherical`]: latitude/longitude ⇄ unit vector
//! - [`map_projection`]: equirectangular, orthographic and mercator unprojection
//! - [`pipeline`]: the composed per-pixel mapping
//! - [`lut`]: pre-computed mapping for a whole view

pub mod error;
pub mod lut;
pub mod map_projection;
pub mod pipeline;
pub mod rotation;
pub mod spherical;

pub use error::{ProjectionError, ProjectionResult};
pub use lut::ViewLut;
pub use map_projection::{aspect_ratio, MapProjection};
pub use pipeline::{map_coord, map_output_pixel_to_source, output_coord, SourceCoord};
pub use rotation::{EulerAngles, Rotation};
pub use spherical::{to_spherical, to_vector, SphericalCoord, UnitVector3};
