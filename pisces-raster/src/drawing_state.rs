//! Stroke parameters and the per-context drawing state.

use crate::color::Color;
use crate::dasher::Dash;
use crate::geometry::PixelRect;
use crate::paint::Paint;
use crate::style::{DrawMode, LineCap, LineJoin};
use crate::transform::Affine;

/// Pen description for stroked primitives.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeParams {
    /// Line width in user units.
    pub width: f64,
    /// Cap style for open subpath ends.
    pub cap: LineCap,
    /// Join style for explicit corners.
    pub join: LineJoin,
    /// Miter length limit, as a multiple of half the line width.
    pub miter_limit: f64,
    /// Optional dash pattern.
    pub dash: Option<Dash>,
}

impl Default for StrokeParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 10.0,
            dash: None,
        }
    }
}

impl StrokeParams {
    pub fn new(width: f64, cap: LineCap, join: LineJoin, miter_limit: f64) -> Self {
        let mut params = Self::default();
        params.set_width(width);
        params.set_miter_limit(miter_limit);
        params.cap = cap;
        params.join = join;
        params
    }

    pub fn with_dash(mut self, dash: Dash) -> Self {
        self.dash = Some(dash);
        self
    }

    /// Ignores non-finite or negative widths.
    pub fn set_width(&mut self, width: f64) {
        if width.is_finite() && width >= 0.0 {
            self.width = width;
        }
    }

    /// Ignores non-finite or negative limits.
    pub fn set_miter_limit(&mut self, miter_limit: f64) {
        if miter_limit.is_finite() && miter_limit >= 0.0 {
            self.miter_limit = miter_limit;
        }
    }
}

/// Everything that decides how the next primitive is rendered.
#[derive(Debug, Clone)]
pub struct DrawingState {
    /// User to device transform.
    pub transform: Affine,
    /// Current stroke parameters.
    pub stroke: StrokeParams,
    /// Which pipeline primitive emitters feed.
    pub mode: DrawMode,
    /// Color used when no paint is set.
    pub color: Color,
    /// Active paint, already compounded with `transform`.
    pub paint: Option<Paint>,
    /// Transform the paint was given, relative to user space.
    pub paint_transform: Affine,
    /// Persistent clip in device pixels.
    pub clip: PixelRect,
}

impl DrawingState {
    /// Initial state for a surface of the given size.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            transform: Affine::identity(),
            stroke: StrokeParams::default(),
            mode: DrawMode::Fill,
            color: Color::TRANSPARENT,
            paint: None,
            paint_transform: Affine::identity(),
            clip: PixelRect::new(0, 0, width, height),
        }
    }
}
