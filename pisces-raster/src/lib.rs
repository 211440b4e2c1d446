//! Software 2D vector rasterizer core.
//!
//! Paths travel through a chain of sinks: a user to device transform, a curve
//! flattener, then for strokes an optional dasher and the stroker, ending in a
//! [`Rasterizer`] that computes coverage and composites onto an ARGB surface.
//! [`RenderContext`] owns the surface and the drawing state and builds those
//! chains lazily. It uses:
//! - `tiny-skia` to compute coverage masks in the reference rasterizer
//! - `png` to export surfaces
//! - `csscolorparser` to read CSS colors
//!
//! # Example
//!
//! ```rust
//! use pisces_raster::{Color, RenderContext};
//!
//! # fn main() -> Result<(), pisces_raster::RasterError> {
//! let mut ctx = RenderContext::builder(64, 48).antialiasing(false).build()?;
//! ctx.set_color(Color::parse("#ff0000")?);
//! ctx.fill_rect(8.0, 8.0, 32.0, 16.0)?;
//! ctx.set_line_width(2.0);
//! ctx.draw_oval(4.0, 4.0, 40.0, 30.0)?;
//! let png_data = ctx.to_png()?;
//! assert_eq!(&png_data[1..4], b"PNG");
//! # Ok(())
//! # }
//! ```

mod color;
mod config;
mod context;
mod dasher;
mod drawing_state;
mod error;
mod flattener;
mod geometry;
mod gradient;
mod math;
mod paint;
mod path;
mod path_store;
mod pattern;
mod pipeline;
mod rasterizer;
mod sink;
mod stroker;
mod style;
mod surface;
mod text;
mod transform;
mod transformer;

// Re-export public API
pub use color::Color;
pub use config::{RenderConfig, FILLER_FLATNESS_VAR, STROKE_XBIAS_VAR, STROKE_YBIAS_VAR};
pub use context::{
    RenderContext, RenderContextBuilder, COMMAND_CLOSE, COMMAND_CUBIC_TO, COMMAND_LINE_TO,
    COMMAND_MOVE_TO, COMMAND_QUAD_TO,
};
pub use dasher::{Dash, Dasher};
pub use drawing_state::{DrawingState, StrokeParams};
pub use error::{RasterError, RasterResult};
pub use flattener::{Flattener, MAX_CHORD_LENGTH_SQ, MIN_CHORD_LENGTH_SQ};
pub use geometry::{ArcParams, BlitParams, Bounds, PixelBlock, PixelRect, RoundRectParams};
pub use gradient::{GradientStop, LinearGradient};
pub use paint::{Paint, PaintSource};
pub use path::{Path, Polygon};
pub use path_store::{PathIter, PathStore, Segment};
pub use pattern::Pattern;
pub use pipeline::Pipeline;
pub use rasterizer::{MaskRasterizer, Rasterizer, RenderCache};
pub use sink::{LineSink, PathCommand, PathRecorder, PathSink};
pub use stroker::Stroker;
pub use style::{ArcType, CycleMethod, DrawMode, LineCap, LineJoin, WindingRule};
pub use surface::{
    source_over, ArgbSurface, GraySurface, ImageType, PixelData, Surface, SurfaceSink,
    MAX_DIMENSION,
};
pub use text::{layout, Font, FontKind, Glyph, GlyphBitmap, GlyphSet, GlyphShape, PlacedGlyph};
pub use transform::Affine;
pub use transformer::Transformer;
