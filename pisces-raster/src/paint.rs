//! The paint capability consumed by the rasterizer.

use crate::color::Color;
use crate::gradient::LinearGradient;
use crate::pattern::Pattern;
use crate::transform::Affine;

/// Produces source colors for a device-space tile.
pub trait PaintSource {
    /// Fill `dst` with non-premultiplied ARGB for the tile at (x, y).
    ///
    /// Row `j` of the tile starts at `dst[offset + j * stride]`. Only columns
    /// `min_touched[j]..=max_touched[j]` (tile-relative) are written; a row
    /// whose max is below its min is skipped.
    #[allow(clippy::too_many_arguments)]
    fn paint(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        min_touched: &[i32],
        max_touched: &[i32],
        dst: &mut [u32],
        offset: usize,
        stride: usize,
    );
}

/// The closed set of paints.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    LinearGradient(LinearGradient),
    Pattern(Pattern),
}

impl Paint {
    /// Install the paint-to-device transform. Solid colors ignore it.
    pub fn set_transform(&mut self, transform: &Affine) {
        match self {
            Paint::Solid(_) => {}
            Paint::LinearGradient(g) => g.set_transform(transform),
            Paint::Pattern(p) => p.set_transform(transform),
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

impl PaintSource for Paint {
    fn paint(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        min_touched: &[i32],
        max_touched: &[i32],
        dst: &mut [u32],
        offset: usize,
        stride: usize,
    ) {
        let rows = height.max(0) as usize;
        for j in 0..rows.min(min_touched.len()).min(max_touched.len()) {
            let lo = min_touched[j].max(0);
            let hi = max_touched[j].min(width - 1);
            if hi < lo {
                continue;
            }
            let start = offset + j * stride + lo as usize;
            let end = offset + j * stride + hi as usize + 1;
            let Some(run) = dst.get_mut(start..end) else {
                continue;
            };
            match self {
                Paint::Solid(c) => run.fill(c.to_argb()),
                Paint::LinearGradient(g) => g.shade_row(x + lo, y + j as i32, run),
                Paint::Pattern(p) => p.shade_row(x + lo, y + j as i32, run),
            }
        }
    }
}
