//! Repeating image paint.

use crate::error::{RasterError, RasterResult};
use crate::math::{to_fixed, FRACTION_BITS};
use crate::transform::Affine;

/// Maximum pattern tile side.
const MAX_PATTERN_SIZE: i32 = 4096;

/// An ARGB tile repeated in both directions, sampled nearest-neighbour.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    width: i32,
    height: i32,
    pixels: Vec<u32>,
    inverse: Affine,
}

impl Pattern {
    /// Create a pattern from a row-major ARGB tile.
    pub fn new(pixels: Vec<u32>, width: i32, height: i32) -> RasterResult<Self> {
        if width <= 0 || height <= 0 || width > MAX_PATTERN_SIZE || height > MAX_PATTERN_SIZE {
            return Err(RasterError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }
        if pixels.len() != width as usize * height as usize {
            return Err(RasterError::InvalidArgument(format!(
                "Pattern data holds {} pixels, expected {}x{}",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            inverse: Affine::identity(),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Install the paint-to-device transform. A singular transform collapses
    /// the tile to its origin pixel.
    pub fn set_transform(&mut self, transform: &Affine) {
        self.inverse = transform
            .invert()
            .unwrap_or_else(|| Affine::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
    }

    pub(crate) fn shade_row(&self, x: i32, y: i32, out: &mut [u32]) {
        let inv = &self.inverse;
        let (u, v) = inv.apply(x as f64 + 0.5, y as f64 + 0.5);
        let mut u = to_fixed(u);
        let mut v = to_fixed(v);
        let du = to_fixed(inv.m00);
        let dv = to_fixed(inv.m10);
        for px in out {
            let tx = (u >> FRACTION_BITS).rem_euclid(self.width);
            let ty = (v >> FRACTION_BITS).rem_euclid(self.height);
            *px = self.pixels[ty as usize * self.width as usize + tx as usize];
            u = u.wrapping_add(du);
            v = v.wrapping_add(dv);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Pattern {
        Pattern::new(vec![1, 2, 3, 4], 2, 2).unwrap()
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(Pattern::new(vec![1, 2, 3], 2, 2).is_err());
        assert!(matches!(
            Pattern::new(vec![], 0, 2),
            Err(RasterError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_tile_repeats() {
        let p = checker();
        let mut row = [0u32; 5];
        p.shade_row(0, 0, &mut row);
        assert_eq!(row, [1, 2, 1, 2, 1]);
        p.shade_row(-1, 1, &mut row);
        assert_eq!(row, [4, 3, 4, 3, 4]);
    }

    #[test]
    fn test_scaled_tile() {
        let mut p = checker();
        p.set_transform(&Affine::from_scale(2.0, 2.0));
        let mut row = [0u32; 4];
        p.shade_row(0, 2, &mut row);
        assert_eq!(row, [3, 3, 4, 4]);
    }
}
