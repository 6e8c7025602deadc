//! Rendering world map views from an equirectangular source image.
//!
//! - [`raster`]: loading and holding the source image
//! - [`sampler`]: bilinear lookup at fractional source pixels
//! - [`frame`]: per-pixel rendering of a view, rayon row-parallel
//! - [`png`]: encoding rendered frames

pub mod error;
pub mod frame;
pub mod png;
pub mod raster;
pub mod sampler;

pub use error::{RenderError, RenderResult};
pub use frame::{render_frame, render_frame_with_lut, render_rows, OutputFrame, TRANSPARENT};
pub use png::create_png;
pub use raster::{Rgba, SourceRaster};
pub use sampler::sample;
