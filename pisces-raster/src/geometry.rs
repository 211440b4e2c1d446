//! Rectangles and parameter structs for drawing operations.
//!
//! These structs replace long positional argument lists with named fields,
//! grouping semantically related parameters together.

use crate::style::ArcType;

/// An axis-aligned rectangle in double precision.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from min/max extents.
    pub fn from_extents(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// True when the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Intersection of two rectangles. May be empty.
    pub fn intersect(&self, other: &Bounds) -> Bounds {
        let min_x = self.x.max(other.x);
        let min_y = self.y.max(other.y);
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());
        Bounds::from_extents(min_x, min_y, max_x.max(min_x), max_y.max(min_y))
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && y >= self.y && x < self.max_x() && y < self.max_y()
    }
}

/// An integer pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest pixel rectangle covering `bounds`.
    pub fn covering(bounds: &Bounds) -> Self {
        if bounds.is_empty() {
            return Self::default();
        }
        let x0 = bounds.x.floor() as i32;
        let y0 = bounds.y.floor() as i32;
        let x1 = bounds.max_x().ceil() as i32;
        let y1 = bounds.max_y().ceil() as i32;
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Largest pixel rectangle inside `bounds`.
    pub fn within(bounds: &Bounds) -> Self {
        if bounds.is_empty() {
            return Self::default();
        }
        let x0 = bounds.x.ceil() as i32;
        let y0 = bounds.y.ceil() as i32;
        let x1 = bounds.max_x().floor() as i32;
        let y1 = bounds.max_y().floor() as i32;
        Self::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersection of two rectangles; empty results have zero size.
    pub fn intersect(&self, other: &PixelRect) -> PixelRect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x as i64 + self.width as i64).min(other.x as i64 + other.width as i64);
        let y1 = (self.y as i64 + self.height as i64).min(other.y as i64 + other.height as i64);
        let width = (x1 - x0 as i64).clamp(0, i32::MAX as i64) as i32;
        let height = (y1 - y0 as i64).clamp(0, i32::MAX as i64) as i32;
        PixelRect::new(x0, y0, width, height)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

impl From<PixelRect> for Bounds {
    fn from(r: PixelRect) -> Self {
        Bounds::new(r.x as f64, r.y as f64, r.width as f64, r.height as f64)
    }
}

/// Parameters for an elliptical arc inscribed in a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    /// X coordinate of the bounding rectangle.
    pub x: f64,
    /// Y coordinate of the bounding rectangle.
    pub y: f64,
    /// Width of the bounding rectangle.
    pub width: f64,
    /// Height of the bounding rectangle.
    pub height: f64,
    /// Starting angle in degrees, counterclockwise from 3 o'clock.
    pub start_angle: f64,
    /// Angular extent in degrees.
    pub arc_angle: f64,
    /// How the arc is closed.
    pub arc_type: ArcType,
}

/// Parameters for a rounded rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundRectParams {
    /// X coordinate of the rectangle origin.
    pub x: f64,
    /// Y coordinate of the rectangle origin.
    pub y: f64,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
    /// Horizontal diameter of the corner arcs.
    pub arc_width: f64,
    /// Vertical diameter of the corner arcs.
    pub arc_height: f64,
}

/// A block of pixels inside a caller-owned ARGB array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBlock {
    /// Index of the block's first pixel in the array.
    pub offset: usize,
    /// Row stride of the array, in pixels.
    pub scan: usize,
    /// X position on the surface.
    pub x: i32,
    /// Y position on the surface.
    pub y: i32,
    /// Width of the block.
    pub width: i32,
    /// Height of the block.
    pub height: i32,
}

impl PixelBlock {
    /// A tightly packed block whose array holds exactly `width * height` pixels.
    pub fn packed(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            offset: 0,
            scan: width.max(0) as usize,
            x,
            y,
            width,
            height,
        }
    }
}

/// Source region and destination for a surface blit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlitParams {
    pub src_x: i32,
    pub src_y: i32,
    pub dst_x: i32,
    pub dst_y: i32,
    pub width: i32,
    pub height: i32,
    /// Opacity in 0.0..=1.0.
    pub opacity: f32,
}
