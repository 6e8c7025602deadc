//! View lookup table (LUT) for repeated renders of the same view.
//!
//! Pre-computes the source coordinate of every output pixel for one
//! (output size, rotation, projection, source size) combination. Rendering
//! from a LUT skips all trigonometry and leaves only bilinear sampling.
//!
//! # Memory Usage
//!
//! 16 bytes per pixel plus one coverage bit: ~4MB for a 512x512 globe,
//! ~270MB at 4096x4096. Building needs no memory beyond the finished table.

use rayon::prelude::*;
use tracing::debug;

use crate::error::ProjectionResult;
use crate::map_projection::MapProjection;
use crate::pipeline::{map_output_pixel_to_source, output_coord, SourceCoord};
use crate::rotation::Rotation;

const UNCOVERED: SourceCoord = SourceCoord {
    px: f64::NAN,
    py: f64::NAN,
};

/// Pre-computed source coordinates for one view.
#[derive(Debug, Clone)]
pub struct ViewLut {
    width: usize,
    height: usize,
    /// Source coordinates, `coords[row * width + col]`. Unset entries are
    /// meaningless; check the coverage bitmap first.
    coords: Vec<SourceCoord>,
    /// Coverage bitmap: bit N is 1 if pixel N maps into the source raster.
    covered_bitmap: Vec<u64>,
}

impl ViewLut {
    /// Create an empty LUT where no pixel is covered.
    pub fn new(width: usize, height: usize) -> Self {
        let pixels = width * height;
        Self {
            width,
            height,
            coords: vec![SourceCoord { px: 0.0, py: 0.0 }; pixels],
            covered_bitmap: vec![0u64; pixels.div_ceil(64)],
        }
    }

    /// Run the coordinate pipeline for every pixel of a view.
    ///
    /// Rows are computed in parallel straight into the coordinate table;
    /// uncovered pixels hold NaN until the coverage bitmap is derived from
    /// them. Fails on the first pixel whose rotated coordinate leaves the
    /// valid domain.
    pub fn build(
        width: usize,
        height: usize,
        rotation: &Rotation,
        projection: MapProjection,
        source_width: usize,
        source_height: usize,
    ) -> ProjectionResult<Self> {
        let mut coords = vec![UNCOVERED; width * height];
        if width > 0 {
            coords
                .par_chunks_mut(width)
                .enumerate()
                .try_for_each(|(row, line)| -> ProjectionResult<()> {
                    for (col, slot) in line.iter_mut().enumerate() {
                        let (x, y) = output_coord(col, row, width, height);
                        if let Some(coord) = map_output_pixel_to_source(
                            x,
                            y,
                            rotation,
                            projection,
                            source_width,
                            source_height,
                        )? {
                            *slot = coord;
                        }
                    }
                    Ok(())
                })?;
        }

        // Valid source coordinates are never NaN.
        let mut covered_bitmap = vec![0u64; coords.len().div_ceil(64)];
        for (pixel_idx, coord) in coords.iter().enumerate() {
            if !coord.px.is_nan() {
                covered_bitmap[pixel_idx / 64] |= 1u64 << (pixel_idx % 64);
            }
        }

        let lut = Self {
            width,
            height,
            coords,
            covered_bitmap,
        };

        debug!(
            width,
            height,
            projection = %projection,
            covered = lut.covered_count(),
            bytes = lut.memory_bytes(),
            "Built view LUT"
        );

        Ok(lut)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Check if a pixel maps into the source raster.
    #[inline]
    pub fn is_covered(&self, pixel_idx: usize) -> bool {
        let word_idx = pixel_idx / 64;
        let bit_idx = pixel_idx % 64;
        (self.covered_bitmap[word_idx] & (1u64 << bit_idx)) != 0
    }

    /// Set a pixel's source coordinate and mark it covered.
    #[inline]
    pub fn set(&mut self, pixel_idx: usize, coord: SourceCoord) {
        self.coords[pixel_idx] = coord;
        let word_idx = pixel_idx / 64;
        let bit_idx = pixel_idx % 64;
        self.covered_bitmap[word_idx] |= 1u64 << bit_idx;
    }

    /// Get a pixel's source coordinate, or `None` if not covered.
    #[inline]
    pub fn get(&self, pixel_idx: usize) -> Option<SourceCoord> {
        if self.is_covered(pixel_idx) {
            Some(self.coords[pixel_idx])
        } else {
            None
        }
    }

    /// Row `row` as an iterator of optional source coordinates.
    pub fn row(&self, row: usize) -> impl Iterator<Item = Option<SourceCoord>> + '_ {
        let start = row * self.width;
        (start..start + self.width).map(move |idx| self.get(idx))
    }

    /// Count covered pixels.
    pub fn covered_count(&self) -> usize {
        self.covered_bitmap
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum()
    }

    /// Approximate heap usage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.coords.len() * std::mem::size_of::<SourceCoord>() + self.covered_bitmap.len() * 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_lut_basic() {
        let mut lut = ViewLut::new(100, 100);

        assert!(!lut.is_covered(0));
        assert!(lut.get(0).is_none());
        assert_eq!(lut.covered_count(), 0);

        lut.set(0, SourceCoord { px: 100.5, py: 200.5 });
        assert!(lut.is_covered(0));
        assert_eq!(lut.get(0), Some(SourceCoord { px: 100.5, py: 200.5 }));
        assert_eq!(lut.covered_count(), 1);

        lut.set(9999, SourceCoord { px: 50.0, py: 75.0 });
        assert!(lut.is_covered(9999));
        assert_eq!(lut.covered_count(), 2);
    }

    #[test]
    fn test_equirectangular_covers_everything() {
        let lut = ViewLut::build(
            40,
            20,
            &Rotation::identity(),
            MapProjection::Equirectangular,
            360,
            180,
        )
        .unwrap();
        assert_eq!(lut.covered_count(), 800);
        assert_eq!(lut.width(), 40);
        assert_eq!(lut.height(), 20);
    }

    #[test]
    fn test_orthographic_covers_disk_only() {
        let size = 64;
        let lut = ViewLut::build(
            size,
            size,
            &Rotation::identity(),
            MapProjection::Orthographic,
            360,
            180,
        )
        .unwrap();

        // Corners are outside the globe, the centre is inside.
        assert!(!lut.is_covered(0));
        assert!(!lut.is_covered(size * size - 1));
        assert!(lut.is_covered(size / 2 * size + size / 2));

        // Roughly pi/4 of the square.
        let ratio = lut.covered_count() as f64 / (size * size) as f64;
        assert!((ratio - std::f64::consts::FRAC_PI_4).abs() < 0.03, "ratio = {}", ratio);
    }

    #[test]
    fn test_lut_matches_pipeline() {
        let rotation = Rotation::from_degrees(20.0, -40.0, 10.0).unwrap();
        let lut = ViewLut::build(16, 16, &rotation, MapProjection::Orthographic, 90, 45).unwrap();
        for row in 0..16 {
            for col in 0..16 {
                let (x, y) = output_coord(col, row, 16, 16);
                let direct =
                    map_output_pixel_to_source(x, y, &rotation, MapProjection::Orthographic, 90, 45)
                        .unwrap();
                assert_eq!(lut.get(row * 16 + col), direct);
            }
        }
    }

    #[test]
    fn test_row_iterator() {
        let lut = ViewLut::build(8, 8, &Rotation::identity(), MapProjection::Orthographic, 10, 5)
            .unwrap();
        let first_row: Vec<_> = lut.row(0).collect();
        assert_eq!(first_row.len(), 8);
        assert!(first_row[0].is_none());
    }

    #[test]
    fn test_build_handles_degenerate_sizes() {
        let empty = ViewLut::build(0, 4, &Rotation::identity(), MapProjection::Mercator, 10, 5)
            .unwrap();
        assert_eq!(empty.covered_count(), 0);
        assert_eq!(empty.memory_bytes(), 0);

        let single = ViewLut::build(1, 1, &Rotation::identity(), MapProjection::Mercator, 10, 5)
            .unwrap();
        assert!(single.is_covered(0));
    }

    #[test]
    fn test_uncovered_pixels_read_as_none() {
        let lut = ViewLut::build(9, 9, &Rotation::identity(), MapProjection::Orthographic, 10, 5)
            .unwrap();
        for idx in 0..81 {
            match lut.get(idx) {
                Some(coord) => assert!(coord.px.is_finite() && coord.py.is_finite()),
                None => assert!(!lut.is_covered(idx)),
            }
        }
        assert!(lut.get(0).is_none());
        assert!(lut.get(40).is_some());
    }

    #[test]
    fn test_memory_bytes() {
        let lut = ViewLut::new(64, 2);
        assert_eq!(lut.memory_bytes(), 128 * 16 + 2 * 8);
    }
}
