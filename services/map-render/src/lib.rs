//! Render a single world map view to a PNG file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use projection::{MapProjection, Rotation};
use renderer::{render_frame, SourceRaster};
use tracing::info;

#[derive(Parser, Debug, Clone)]
#[command(name = "map-render")]
#[command(about = "Render a rotated world map view to PNG")]
pub struct Args {
    /// Equirectangular world image
    #[arg(long, env = "MAP_IMAGE_PATH")]
    pub image: PathBuf,

    /// Latitude of the view centre in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude of the view centre in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub lon: f64,

    /// Spin about the view axis in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub heading: f64,

    /// equirectangular, orthographic or mercator
    #[arg(short, long, default_value = "equirectangular")]
    pub projection: MapProjection,

    /// Output width in pixels
    #[arg(short, long, default_value_t = 1024)]
    pub width: usize,

    /// Output height in pixels (default: from the projection's aspect ratio)
    #[arg(long)]
    pub height: Option<usize>,

    /// Factor the source image is shrunk by before rendering
    #[arg(long, env = "MAP_DOWNSCALE_FACTOR", default_value_t = 3)]
    pub downscale: u32,

    /// Output PNG path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub width: usize,
    pub height: usize,
    pub covered_pixels: usize,
    pub bytes_written: usize,
}

/// Output size for the arguments; height follows the aspect ratio unless given.
pub fn output_dimensions(args: &Args) -> (usize, usize) {
    match args.height {
        Some(height) => (args.width, height),
        None => {
            let height = (args.width as f64 / args.projection.aspect_ratio()).round() as usize;
            (args.width, height.max(1))
        }
    }
}

/// Load, render and write one view.
pub fn run(args: &Args) -> Result<RenderSummary> {
    let rotation = Rotation::from_degrees(args.lat, args.lon, args.heading)
        .context("Invalid view rotation")?;
    let (width, height) = output_dimensions(args);

    let raster = SourceRaster::load(&args.image, args.downscale)
        .with_context(|| format!("Failed to load {}", args.image.display()))?;

    let start = Instant::now();
    let frame = render_frame(width, height, &rotation, args.projection, &raster)?;
    let png = frame.to_png()?;
    write_output(&args.output, &png)?;

    info!(
        output = %args.output.display(),
        width,
        height,
        projection = %args.projection,
        rotation = %rotation,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Rendered map"
    );

    Ok(RenderSummary {
        width,
        height,
        covered_pixels: frame.covered_pixels(),
        bytes_written: png.len(),
    })
}

fn write_output(path: &Path, png: &[u8]) -> Result<()> {
    std::fs::write(path, png).with_context(|| format!("Failed to write {}", path.display()))
}
