//! Bilinear sampling of the source raster.

use crate::raster::{Rgba, SourceRaster};

/// Bilinear interpolation at a fractional source pixel.
///
/// The four neighbours `floor(px)..=floor(px)+1` by `floor(py)..=floor(py)+1`
/// are clamped to the raster edges independently on each axis; there is no
/// horizontal wraparound. The weights are the fractional parts of `px` and
/// `py`. The result is always fully opaque.
#[inline]
pub fn sample(raster: &SourceRaster, px: f64, py: f64) -> Rgba {
    let fx = px.floor();
    let fy = py.floor();
    let tx = px - fx;
    let ty = py - fy;

    let x0 = clamp_index(fx, raster.width());
    let x1 = clamp_index(fx + 1.0, raster.width());
    let y0 = clamp_index(fy, raster.height());
    let y1 = clamp_index(fy + 1.0, raster.height());

    let a = raster.pixel(x0, y0);
    let b = raster.pixel(x1, y0);
    let c = raster.pixel(x0, y1);
    let d = raster.pixel(x1, y1);

    let mut out = [0, 0, 0, 255];
    for i in 0..3 {
        let top = lerp(a[i] as f64, b[i] as f64, tx);
        let bottom = lerp(c[i] as f64, d[i] as f64, tx);
        out[i] = lerp(top, bottom, ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
fn clamp_index(v: f64, len: usize) -> usize {
    // `as` saturates, so negatives and NaN land on 0.
    (v as usize).min(len - 1)
}
