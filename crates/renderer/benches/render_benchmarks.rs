//! Benchmarks for the renderer crate - frame rendering, sampling and PNG encoding.
//!
//! Run with: cargo bench --package renderer -- render_frame
//! Or: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use projection::{MapProjection, Rotation, ViewLut};
use rand::Rng;
use renderer::{png, render_frame, render_frame_with_lut, sample, SourceRaster};
use test_utils::create_position_world;

/// Roughly the size of a 5400x2700 world image downscaled by three.
const SOURCE_WIDTH: usize = 1800;
const SOURCE_HEIGHT: usize = 900;

fn source_raster() -> SourceRaster {
    SourceRaster::new(
        SOURCE_WIDTH,
        SOURCE_HEIGHT,
        create_position_world(SOURCE_WIDTH, SOURCE_HEIGHT),
    )
    .expect("valid raster")
}

fn tilted_view() -> Rotation {
    Rotation::from_degrees(37.5, -122.3, 30.0).expect("valid rotation")
}

/// Generate random RGBA pixel data for PNG encoding benchmarks.
fn generate_rgba_data(width: usize, height: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut data = vec![0u8; width * height * 4];
    for chunk in data.chunks_mut(4) {
        chunk[0] = rng.gen();
        chunk[1] = rng.gen();
        chunk[2] = rng.gen();
        chunk[3] = 255;
    }
    data
}

fn bench_render_frame(c: &mut Criterion) {
    let raster = source_raster();
    let rotation = tilted_view();
    let mut group = c.benchmark_group("render_frame");

    for projection in MapProjection::ALL {
        for max in [256usize, 512, 1024] {
            let (width, height) = projection.fit_dimensions(max, max);
            group.throughput(Throughput::Elements((width * height) as u64));
            group.bench_with_input(
                BenchmarkId::new(projection.name(), format!("{}x{}", width, height)),
                &(width, height),
                |b, &(w, h)| {
                    b.iter(|| {
                        black_box(render_frame(w, h, &rotation, projection, &raster).unwrap())
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_lut(c: &mut Criterion) {
    let raster = source_raster();
    let rotation = tilted_view();
    let mut group = c.benchmark_group("view_lut");

    for size in [256usize, 512] {
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("build", size), &size, |b, &size| {
            b.iter(|| {
                black_box(
                    ViewLut::build(
                        size,
                        size,
                        &rotation,
                        MapProjection::Orthographic,
                        SOURCE_WIDTH,
                        SOURCE_HEIGHT,
                    )
                    .unwrap(),
                )
            });
        });

        let lut = ViewLut::build(
            size,
            size,
            &rotation,
            MapProjection::Orthographic,
            SOURCE_WIDTH,
            SOURCE_HEIGHT,
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::new("render", size), &lut, |b, lut| {
            b.iter(|| black_box(render_frame_with_lut(lut, &raster).unwrap()));
        });
    }

    group.finish();
}

fn bench_sample(c: &mut Criterion) {
    let raster = source_raster();
    let mut rng = rand::thread_rng();
    let coords: Vec<(f64, f64)> = (0..10_000)
        .map(|_| {
            (
                rng.gen_range(0.0..SOURCE_WIDTH as f64),
                rng.gen_range(0.0..SOURCE_HEIGHT as f64),
            )
        })
        .collect();

    let mut group = c.benchmark_group("sample");
    group.throughput(Throughput::Elements(coords.len() as u64));
    group.bench_function("bilinear_10k", |b| {
        b.iter(|| {
            for &(px, py) in &coords {
                black_box(sample(&raster, px, py));
            }
        });
    });
    group.finish();
}

fn bench_png_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encoding");

    for size in [256usize, 512, 1024] {
        let data = generate_rgba_data(size, size);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rgba", size), &data, |b, data| {
            b.iter(|| black_box(png::create_png(data, size, size).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_render_frame,
    bench_lut,
    bench_sample,
    bench_png_encoding,
);
criterion_main!(benches);
