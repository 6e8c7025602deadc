//! Tests for PNG encoding of rendered frames.
//!
//! Encoded output is decoded again with the `image` crate to check that the
//! hand-written chunk layout is a valid PNG.

use projection::{MapProjection, Rotation};
use renderer::png::create_png;
use renderer::{render_frame, SourceRaster, TRANSPARENT};
use test_utils::{create_position_world, create_quadrant_world};

#[test]
fn test_png_decodes_to_same_pixels() {
    let pixels = create_position_world(37, 11);
    let png = create_png(&pixels, 37, 11).expect("Failed to encode");

    let decoded = image::load_from_memory(&png)
        .expect("Failed to decode")
        .to_rgba8();
    assert_eq!(decoded.dimensions(), (37, 11));
    assert_eq!(decoded.into_raw(), pixels);
}

#[test]
fn test_rendered_globe_keeps_transparency() {
    let raster = SourceRaster::new(72, 36, create_quadrant_world(72, 36)).unwrap();
    let frame = render_frame(
        32,
        32,
        &Rotation::identity(),
        MapProjection::Orthographic,
        &raster,
    )
    .unwrap();

    let decoded = image::load_from_memory(&frame.to_png().unwrap())
        .unwrap()
        .to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0).0, TRANSPARENT);
    assert_eq!(decoded.get_pixel(16, 16).0, frame.pixel(16, 16));
}

#[test]
fn test_solid_image_compresses() {
    let pixels = [0u8, 0, 0, 255].repeat(256 * 256);
    let png = create_png(&pixels, 256, 256).unwrap();
    assert!(
        png.len() < pixels.len() / 50,
        "PNG is {} bytes for {} raw bytes",
        png.len(),
        pixels.len()
    );
}
