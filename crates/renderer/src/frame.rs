//! Rendering a whole map view into an RGBA frame.

use std::time::Instant;

use projection::{
    map_output_pixel_to_source, output_coord, MapProjection, ProjectionResult, Rotation, ViewLut,
};
use rayon::prelude::*;
use tracing::{debug, error};

use crate::error::{RenderError, RenderResult};
use crate::png::create_png;
use crate::raster::{Rgba, SourceRaster};
use crate::sampler::sample;

/// Pixel value for output pixels outside the projection's coverage.
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// A rendered view, row-major RGBA8 with row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFrame {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl OutputFrame {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let idx = (y * self.width + x) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Number of pixels with source coverage (non-zero alpha).
    pub fn covered_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|p| p[3] != 0).count()
    }

    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        create_png(&self.pixels, self.width, self.height)
    }
}

/// Render one view of the source raster.
///
/// Rows are rendered in parallel. If any pixel's rotated coordinate leaves
/// the sphere's domain the whole frame fails with
/// [`RenderError::Projection`].
pub fn render_frame(
    width: usize,
    height: usize,
    rotation: &Rotation,
    projection: MapProjection,
    raster: &SourceRaster,
) -> RenderResult<OutputFrame> {
    check_dimensions(width, height)?;
    let start = Instant::now();

    let mut pixels = vec![0u8; width * height * 4];
    let result = pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .try_for_each(|(row, line)| {
            render_row(line, row, width, height, rotation, projection, raster)
        });

    if let Err(e) = result {
        error!(
            error = %e,
            width,
            height,
            projection = %projection,
            rotation = %rotation.debug(),
            "Coordinate pipeline left the valid domain"
        );
        return Err(e.into());
    }

    debug!(
        width,
        height,
        projection = %projection,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Rendered frame"
    );

    Ok(OutputFrame {
        width,
        height,
        pixels,
    })
}

/// Render rows `first_row..` of a `width`x`height` view into `out`.
///
/// `out` must hold a whole number of rows (`width * 4` bytes each) and is
/// filled from `first_row` downward. Lets an external scheduler split a
/// frame into bands.
pub fn render_rows(
    out: &mut [u8],
    first_row: usize,
    width: usize,
    height: usize,
    rotation: &Rotation,
    projection: MapProjection,
    raster: &SourceRaster,
) -> RenderResult<()> {
    check_dimensions(width, height)?;
    let stride = width * 4;
    if out.len() % stride != 0 || first_row + out.len() / stride > height {
        return Err(RenderError::InvalidDimensions {
            width,
            height: out.len() / stride,
        });
    }

    for (i, line) in out.chunks_exact_mut(stride).enumerate() {
        render_row(line, first_row + i, width, height, rotation, projection, raster)?;
    }
    Ok(())
}

/// Render a view from a pre-computed lookup table.
///
/// Produces the same pixels as [`render_frame`] with the rotation and
/// projection the LUT was built for.
pub fn render_frame_with_lut(lut: &ViewLut, raster: &SourceRaster) -> RenderResult<OutputFrame> {
    let (width, height) = (lut.width(), lut.height());
    check_dimensions(width, height)?;

    let mut pixels = vec![0u8; width * height * 4];
    pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(row, line)| {
            for (px, coord) in line.chunks_exact_mut(4).zip(lut.row(row)) {
                let value = match coord {
                    Some(c) => sample(raster, c.px, c.py),
                    None => TRANSPARENT,
                };
                px.copy_from_slice(&value);
            }
        });

    Ok(OutputFrame {
        width,
        height,
        pixels,
    })
}

fn render_row(
    line: &mut [u8],
    row: usize,
    width: usize,
    height: usize,
    rotation: &Rotation,
    projection: MapProjection,
    raster: &SourceRaster,
) -> ProjectionResult<()> {
    for (col, px) in line.chunks_exact_mut(4).enumerate() {
        let (x, y) = output_coord(col, row, width, height);
        let value = match map_output_pixel_to_source(
            x,
            y,
            rotation,
            projection,
            raster.width(),
            raster.height(),
        )? {
            Some(c) => sample(raster, c.px, c.py),
            None => TRANSPARENT,
        };
        px.copy_from_slice(&value);
    }
    Ok(())
}

fn check_dimensions(width: usize, height: usize) -> RenderResult<()> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::create_solid_world;

    fn uniform(color: Rgba) -> SourceRaster {
        SourceRaster::new(36, 18, create_solid_world(36, 18, color)).unwrap()
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let raster = uniform([1, 2, 3, 255]);
        let result = render_frame(0, 10, &Rotation::identity(), MapProjection::Mercator, &raster);
        assert!(matches!(
            result,
            Err(RenderError::InvalidDimensions { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_uniform_source_fills_equirectangular() {
        let raster = uniform([10, 200, 30, 0]);
        let frame = render_frame(
            20,
            10,
            &Rotation::identity(),
            MapProjection::Equirectangular,
            &raster,
        )
        .unwrap();
        assert_eq!(frame.covered_pixels(), 200);
        assert!(frame
            .as_bytes()
            .chunks_exact(4)
            .all(|p| p == [10, 200, 30, 255]));
    }

    #[test]
    fn test_render_rows_matches_frame() {
        let raster = SourceRaster::from_fn(36, 18, |x, y| [(x * 7) as u8, (y * 13) as u8, 0, 255])
            .unwrap();
        let rotation = Rotation::from_degrees(30.0, 45.0, 10.0).unwrap();
        let frame = render_frame(16, 16, &rotation, MapProjection::Orthographic, &raster).unwrap();

        let mut band = vec![0u8; 16 * 4 * 4];
        render_rows(&mut band, 6, 16, 16, &rotation, MapProjection::Orthographic, &raster)
            .unwrap();
        assert_eq!(&band[..], &frame.as_bytes()[6 * 64..10 * 64]);
    }

    #[test]
    fn test_render_rows_rejects_overflowing_band() {
        let raster = uniform([0, 0, 0, 255]);
        let mut band = vec![0u8; 4 * 4 * 3];
        let result = render_rows(
            &mut band,
            2,
            4,
            4,
            &Rotation::identity(),
            MapProjection::Equirectangular,
            &raster,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_into_pixels_and_png() {
        let raster = uniform([5, 5, 5, 255]);
        let frame = render_frame(4, 4, &Rotation::identity(), MapProjection::Mercator, &raster)
            .unwrap();
        let png = frame.to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert_eq!(frame.into_pixels().len(), 64);
    }
}
