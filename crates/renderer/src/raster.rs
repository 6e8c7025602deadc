//! The fixed equirectangular source image.
//!
//! A [`SourceRaster`] covers longitude [-180°, 180°) left to right and
//! latitude [90°, -90°] top to bottom, row-major RGBA8. It is built once and
//! only read afterwards.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use tracing::info;

use crate::error::{RenderError, RenderResult};

/// One RGBA8 pixel.
pub type Rgba = [u8; 4];

/// Immutable RGBA source raster.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRaster {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl SourceRaster {
    /// Wrap an RGBA8 buffer. `data.len()` must equal `width * height * 4`.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        let expected = width * height * 4;
        if data.len() != expected {
            return Err(RenderError::invalid_raster(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a raster from generator output, one closure call per pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> RenderResult<Self>
    where
        F: FnMut(usize, usize) -> Rgba,
    {
        let mut data = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    /// Take ownership of a decoded image.
    pub fn from_image(image: RgbaImage) -> RenderResult<Self> {
        let width = image.width() as usize;
        let height = image.height() as usize;
        Self::new(width, height, image.into_raw())
    }

    /// Downscale by an integer factor (dimensions rounded) and convert to RGBA.
    pub fn from_image_downscaled(image: DynamicImage, factor: u32) -> RenderResult<Self> {
        if factor == 0 {
            return Err(RenderError::invalid_raster("downscale factor must be at least 1"));
        }
        if factor == 1 {
            return Self::from_image(image.to_rgba8());
        }

        let width = downscaled(image.width(), factor);
        let height = downscaled(image.height(), factor);
        let resized = image.resize_exact(width, height, FilterType::Triangle);
        Self::from_image(resized.to_rgba8())
    }

    /// Decode an image file and downscale it.
    pub fn load(path: impl AsRef<Path>, factor: u32) -> RenderResult<Self> {
        let path = path.as_ref();
        let image = image::open(path)?;
        let (orig_width, orig_height) = (image.width(), image.height());
        let raster = Self::from_image_downscaled(image, factor)?;

        info!(
            path = %path.display(),
            orig_width,
            orig_height,
            width = raster.width,
            height = raster.height,
            factor,
            "Loaded source raster"
        );

        Ok(raster)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at integer coordinates. Panics if out of bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let idx = (y * self.width + x) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }
}

fn downscaled(dimension: u32, factor: u32) -> u32 {
    ((dimension as f64 / factor as f64).round() as u32).max(1)
}
