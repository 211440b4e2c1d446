//! The render context: drawing state, cached pipelines and the backend.

mod drawing;
mod image_ops;
mod shapes;
mod text_rendering;
mod transform;

pub use drawing::{
    COMMAND_CLOSE, COMMAND_CUBIC_TO, COMMAND_LINE_TO, COMMAND_MOVE_TO, COMMAND_QUAD_TO,
};

use crate::color::Color;
use crate::config::RenderConfig;
use crate::drawing_state::{DrawingState, StrokeParams};
use crate::error::RasterResult;
use crate::geometry::PixelRect;
use crate::paint::Paint;
use crate::path_store::PathStore;
use crate::pipeline::Pipeline;
use crate::rasterizer::{MaskRasterizer, Rasterizer};
use crate::sink::{LineSink, PathSink};
use crate::style::{DrawMode, WindingRule};
use crate::surface::{ArgbSurface, Surface};
use crate::text::Font;
use crate::transform::Affine;
use std::rc::Rc;

/// The pipeline a primitive is fed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Consumer {
    Fill,
    TextFill,
    Stroke,
}

impl Consumer {
    /// Filled consumers get open subpaths closed for them.
    fn is_filled(self) -> bool {
        self != Consumer::Stroke
    }
}

impl From<DrawMode> for Consumer {
    fn from(mode: DrawMode) -> Self {
        match mode {
            DrawMode::Fill => Consumer::Fill,
            DrawMode::Stroke => Consumer::Stroke,
            DrawMode::TextFill => Consumer::TextFill,
        }
    }
}

/// Lazily built pipelines, dropped whenever their inputs change.
#[derive(Debug, Default)]
struct Pipelines {
    fill: Option<Pipeline>,
    text_fill: Option<Pipeline>,
    stroke: Option<Pipeline>,
}

impl Pipelines {
    fn get(
        &mut self,
        consumer: Consumer,
        state: &DrawingState,
        config: &RenderConfig,
        subpixel_lg: u32,
    ) -> &mut Pipeline {
        match consumer {
            Consumer::Fill => self.fill.get_or_insert_with(|| {
                log::trace!(target: "pisces", "building fill pipeline");
                Pipeline::fill(&state.transform, config)
            }),
            Consumer::TextFill => self.text_fill.get_or_insert_with(|| {
                log::trace!(target: "pisces", "building text fill pipeline");
                Pipeline::text_fill(&state.transform, config, subpixel_lg)
            }),
            Consumer::Stroke => self.stroke.get_or_insert_with(|| {
                log::trace!(target: "pisces", "building stroke pipeline");
                Pipeline::stroke(&state.transform, &state.stroke, config)
            }),
        }
    }

    fn invalidate(&mut self) {
        log::trace!(target: "pisces", "invalidating pipelines");
        *self = Self::default();
    }
}

/// Sits in front of a pipeline and closes subpaths left open in fill modes.
struct SubpathGuard<'a> {
    out: &'a mut dyn PathSink,
    filled: bool,
    in_subpath: bool,
}

impl<'a> SubpathGuard<'a> {
    fn new(out: &'a mut dyn PathSink, filled: bool) -> Self {
        Self {
            out,
            filled,
            in_subpath: false,
        }
    }
}

impl LineSink for SubpathGuard<'_> {
    fn move_to(&mut self, x0: f64, y0: f64) {
        if self.in_subpath && self.filled {
            self.out.close();
        }
        self.in_subpath = false;
        self.out.move_to(x0, y0);
    }

    fn line_join(&mut self) {
        self.out.line_join();
    }

    fn line_to(&mut self, x1: f64, y1: f64) {
        self.in_subpath = true;
        self.out.line_to(x1, y1);
    }

    fn close(&mut self) {
        self.in_subpath = false;
        self.out.close();
    }

    fn end(&mut self) {
        if self.in_subpath && self.filled {
            self.out.close();
        }
        self.in_subpath = false;
        self.out.end();
    }
}

impl PathSink for SubpathGuard<'_> {
    fn quad_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.in_subpath = true;
        self.out.quad_to(x1, y1, x2, y2);
    }

    fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.in_subpath = true;
        self.out.cubic_to(x1, y1, x2, y2, x3, y3);
    }
}

/// An open `begin_rendering` bracket.
#[derive(Debug, Clone, Copy)]
struct Bracket {
    bounds: Option<PixelRect>,
    rule: WindingRule,
}

/// Configures and builds a [`RenderContext`].
pub struct RenderContextBuilder {
    width: i32,
    height: i32,
    config: RenderConfig,
    antialiasing: bool,
    color: Color,
    rasterizer: Option<Box<dyn Rasterizer>>,
}

impl RenderContextBuilder {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            config: RenderConfig::default(),
            antialiasing: true,
            color: Color::TRANSPARENT,
            rasterizer: None,
        }
    }

    pub fn config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn antialiasing(mut self, on: bool) -> Self {
        self.antialiasing = on;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Replace the default [`MaskRasterizer`] backend.
    pub fn rasterizer(mut self, rasterizer: Box<dyn Rasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn build(self) -> RasterResult<RenderContext> {
        let surface = ArgbSurface::new(self.width, self.height)?;
        let mut rasterizer = self
            .rasterizer
            .unwrap_or_else(|| Box::new(MaskRasterizer::new()));
        rasterizer.set_antialiasing(if self.antialiasing {
            self.config.subpixel_lg
        } else {
            0
        });
        let mut state = DrawingState::new(self.width, self.height);
        state.color = self.color;

        Ok(RenderContext {
            surface,
            rasterizer,
            state,
            config: self.config,
            pipelines: Pipelines::default(),
            opacity: 1.0,
            antialiasing: self.antialiasing,
            paint_dirty: true,
            font: None,
            bracket: None,
            pending: PathStore::new(),
        })
    }
}

/// Draws primitives onto an owned ARGB surface.
pub struct RenderContext {
    /// Target pixels.
    pub(crate) surface: ArgbSurface,
    /// Backend receiving device-space lines.
    pub(crate) rasterizer: Box<dyn Rasterizer>,
    /// Current drawing state.
    pub(crate) state: DrawingState,
    pub(crate) config: RenderConfig,
    pipelines: Pipelines,
    /// Opacity applied when compositing primitives.
    pub(crate) opacity: f32,
    antialiasing: bool,
    /// The backend has not seen the current color or paint yet.
    paint_dirty: bool,
    pub(crate) font: Option<Rc<dyn Font>>,
    bracket: Option<Bracket>,
    /// Commands received inside the open bracket.
    pending: PathStore,
}

impl RenderContext {
    /// A context with default configuration, antialiasing on.
    pub fn new(width: i32, height: i32) -> RasterResult<Self> {
        RenderContextBuilder::new(width, height).build()
    }

    pub fn builder(width: i32, height: i32) -> RenderContextBuilder {
        RenderContextBuilder::new(width, height)
    }

    pub fn width(&self) -> i32 {
        self.surface.width()
    }

    pub fn height(&self) -> i32 {
        self.surface.height()
    }

    pub fn surface(&self) -> &ArgbSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut ArgbSurface {
        &mut self.surface
    }

    pub fn into_surface(self) -> ArgbSurface {
        self.surface
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    // --- State setters ---

    /// Replace all stroke parameters.
    pub fn set_stroke(&mut self, params: StrokeParams) {
        log::debug!(target: "pisces", "setStroke {:?}", params);
        self.state.stroke = params;
        self.pipelines.stroke = None;
    }

    pub fn stroke(&self) -> &StrokeParams {
        &self.state.stroke
    }

    /// Ignores non-finite or negative widths.
    pub fn set_line_width(&mut self, width: f64) {
        let before = self.state.stroke.width;
        self.state.stroke.set_width(width);
        if self.state.stroke.width != before {
            self.pipelines.stroke = None;
        }
    }

    pub fn set_antialiasing(&mut self, on: bool) {
        log::debug!(target: "pisces", "setAntialiasing {}", on);
        self.antialiasing = on;
        self.rasterizer
            .set_antialiasing(if on { self.config.subpixel_lg } else { 0 });
        self.pipelines.invalidate();
    }

    pub fn antialiasing(&self) -> bool {
        self.antialiasing
    }

    /// Paint with a solid color, dropping any paint.
    pub fn set_color(&mut self, color: Color) {
        log::debug!(target: "pisces", "setColor {}", color);
        self.state.color = color;
        self.state.paint = None;
        self.paint_dirty = true;
    }

    pub fn color(&self) -> Color {
        self.state.color
    }

    /// Paint with `paint`, placed in user space by `transform`.
    pub fn set_paint(&mut self, mut paint: Paint, transform: &Affine) {
        log::debug!(target: "pisces", "setPaint");
        self.state.paint_transform = *transform;
        paint.set_transform(&self.state.transform.pre_concat(transform));
        self.state.paint = Some(paint);
        self.paint_dirty = true;
    }

    pub fn paint(&self) -> Option<&Paint> {
        self.state.paint.as_ref()
    }

    /// Opacity used when compositing, clamped to 0..=1. Non-finite values are ignored.
    pub fn set_opacity(&mut self, opacity: f32) {
        if opacity.is_finite() {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    pub fn set_fill(&mut self) {
        self.state.mode = DrawMode::Fill;
    }

    pub fn set_stroke_mode(&mut self) {
        self.state.mode = DrawMode::Stroke;
    }

    pub fn set_text_fill(&mut self) {
        self.state.mode = DrawMode::TextFill;
    }

    pub fn mode(&self) -> DrawMode {
        self.state.mode
    }

    /// Restrict all later rendering to a device-space rectangle.
    pub fn set_clip(&mut self, x: i32, y: i32, width: i32, height: i32) {
        log::debug!(target: "pisces", "setClip {} {} {} {}", x, y, width, height);
        self.state.clip = PixelRect::new(x, y, width, height);
    }

    pub fn reset_clip(&mut self) {
        log::debug!(target: "pisces", "resetClip");
        self.state.clip = self.surface_rect();
    }

    pub fn clip(&self) -> PixelRect {
        self.state.clip
    }

    /// Pixels touched by the most recent primitive.
    pub fn bounding_box(&self) -> PixelRect {
        self.rasterizer.bounding_box()
    }

    // --- Rendering bracket ---

    /// Open a primitive clipped to the clip rectangle and the surface.
    ///
    /// Path commands sent to the context until [`RenderContext::end_rendering`]
    /// go through the pipeline of the current draw mode.
    pub fn begin_rendering(&mut self, rule: WindingRule) {
        self.open_bracket(None, rule);
    }

    /// Like [`RenderContext::begin_rendering`], additionally clipped to `bounds`.
    pub fn begin_rendering_in(&mut self, bounds: PixelRect, rule: WindingRule) {
        self.open_bracket(Some(bounds), rule);
    }

    fn open_bracket(&mut self, bounds: Option<PixelRect>, rule: WindingRule) {
        log::debug!(target: "pisces", "beginRendering {:?} {:?}", bounds, rule);
        self.pending.clear();
        self.bracket = Some(Bracket { bounds, rule });
    }

    /// Close the bracket and composite the primitive.
    pub fn end_rendering(&mut self) -> RasterResult<()> {
        let Some(bracket) = self.bracket.take() else {
            return Ok(());
        };
        log::debug!(target: "pisces", "endRendering");
        let pending = std::mem::take(&mut self.pending);
        let result = self.render(
            self.state.mode.into(),
            bracket.bounds,
            bracket.rule,
            None,
            |sink| pending.produce(sink),
        );
        self.pending = pending;
        self.pending.clear();
        result
    }

    fn surface_rect(&self) -> PixelRect {
        PixelRect::new(0, 0, self.surface.width(), self.surface.height())
    }

    /// Surface ∩ clip ∩ `bounds`.
    pub(crate) fn effective_clip(&self, bounds: Option<PixelRect>) -> PixelRect {
        let clip = self.surface_rect().intersect(&self.state.clip);
        match bounds {
            Some(bounds) => clip.intersect(&bounds),
            None => clip,
        }
    }

    fn sync_paint(&mut self) {
        if self.paint_dirty {
            let paint = match &self.state.paint {
                Some(paint) => paint.clone(),
                None => Paint::Solid(self.state.color),
            };
            self.rasterizer.set_paint(paint);
            self.paint_dirty = false;
        }
    }

    /// Render one primitive: `emit` feeds user-space commands to `consumer`.
    ///
    /// `pre` is applied to the commands before the current transform.
    pub(crate) fn render<R>(
        &mut self,
        consumer: Consumer,
        bounds: Option<PixelRect>,
        rule: WindingRule,
        pre: Option<&Affine>,
        emit: impl FnOnce(&mut dyn PathSink) -> R,
    ) -> RasterResult<R> {
        let clip = self.effective_clip(bounds);
        self.sync_paint();
        self.rasterizer.begin_rendering(clip, rule);

        let subpixel_lg = self.rasterizer.subpixel_lg();
        let pipeline = self
            .pipelines
            .get(consumer, &self.state, &self.config, subpixel_lg);
        let filled = consumer.is_filled();
        let result = pipeline.run(pre, &mut *self.rasterizer, |sink| {
            let mut guard = SubpathGuard::new(sink, filled);
            let result = emit(&mut guard);
            guard.end();
            result
        });

        self.rasterizer.end_rendering(&mut self.surface, self.opacity)?;
        Ok(result)
    }

    pub(crate) fn invalidate_pipelines(&mut self) {
        self.pipelines.invalidate();
    }

    pub(crate) fn mark_paint_dirty(&mut self) {
        self.paint_dirty = true;
    }
}

/// Path commands are collected while a bracket is open and ignored otherwise.
impl LineSink for RenderContext {
    fn move_to(&mut self, x0: f64, y0: f64) {
        if self.bracket.is_some() {
            self.pending.move_to(x0, y0);
        }
    }

    fn line_join(&mut self) {
        if self.bracket.is_some() {
            self.pending.line_join();
        }
    }

    fn line_to(&mut self, x1: f64, y1: f64) {
        if self.bracket.is_some() {
            self.pending.line_to(x1, y1);
        }
    }

    fn close(&mut self) {
        if self.bracket.is_some() {
            self.pending.close();
        }
    }

    fn end(&mut self) {
        if self.bracket.is_some() {
            self.pending.end();
        }
    }
}

impl PathSink for RenderContext {
    fn quad_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        if self.bracket.is_some() {
            self.pending.quad_to(x1, y1, x2, y2);
        }
    }

    fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        if self.bracket.is_some() {
            self.pending.cubic_to(x1, y1, x2, y2, x3, y3);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dasher::Dash;
    use crate::error::RasterError;
    use crate::surface::MAX_DIMENSION;
    use crate::style::{LineCap, LineJoin};

    const RED: u32 = 0xffff_0000;

    #[test]
    fn test_new_context_defaults() {
        let ctx = RenderContext::new(200, 150).unwrap();
        assert_eq!(ctx.width(), 200);
        assert_eq!(ctx.height(), 150);
        assert_eq!(ctx.stroke().width, 1.0);
        assert_eq!(ctx.mode(), DrawMode::Fill);
        assert_eq!(ctx.clip(), PixelRect::new(0, 0, 200, 150));
        assert!(ctx.antialiasing());
        assert!(ctx.paint().is_none());
        // surface starts fully transparent
        assert!(ctx.surface().pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_invalid_dimensions() {
        for (w, h) in [(0, 100), (100, 0), (-3, 5), (MAX_DIMENSION + 1, 1)] {
            assert!(matches!(
                RenderContext::new(w, h),
                Err(RasterError::InvalidDimensions { .. })
            ));
        }
    }

    #[test]
    fn test_builder_options() {
        let ctx = RenderContext::builder(10, 10)
            .antialiasing(false)
            .color(Color::RED)
            .build()
            .unwrap();
        assert!(!ctx.antialiasing());
        assert_eq!(ctx.color(), Color::RED);
        assert_eq!(ctx.rasterizer.subpixel_lg(), 0);
    }

    #[test]
    fn test_line_width_ignore_invalid() {
        let mut ctx = RenderContext::new(10, 10).unwrap();
        ctx.set_line_width(5.0);
        assert_eq!(ctx.stroke().width, 5.0);
        ctx.set_line_width(-1.0);
        ctx.set_line_width(f64::NAN);
        ctx.set_line_width(f64::INFINITY);
        assert_eq!(ctx.stroke().width, 5.0);
    }

    #[test]
    fn test_state_changes_drop_pipelines() {
        let mut ctx = RenderContext::new(10, 10).unwrap();
        ctx.set_color(Color::RED);
        ctx.fill_rect(0.0, 0.0, 1.0, 1.0).unwrap();
        ctx.draw_line(0.0, 0.0, 5.0, 0.0).unwrap();
        assert!(ctx.pipelines.fill.is_some());
        assert!(ctx.pipelines.stroke.is_some());

        ctx.set_stroke(StrokeParams::new(2.0, LineCap::Round, LineJoin::Round, 4.0));
        assert!(ctx.pipelines.stroke.is_none());
        assert!(ctx.pipelines.fill.is_some());

        ctx.set_antialiasing(false);
        assert!(ctx.pipelines.fill.is_none());
    }

    #[test]
    fn test_stroke_pipeline_tracks_dash() {
        let mut ctx = RenderContext::new(10, 10).unwrap();
        ctx.draw_line(0.0, 0.0, 5.0, 0.0).unwrap();
        assert!(matches!(ctx.pipelines.stroke, Some(Pipeline::Stroke(_))));
        let dashed = StrokeParams::default().with_dash(Dash::new(vec![1.0, 1.0], 0.0).unwrap());
        ctx.set_stroke(dashed);
        ctx.draw_line(0.0, 0.0, 5.0, 0.0).unwrap();
        assert!(matches!(ctx.pipelines.stroke, Some(Pipeline::DashedStroke(_))));
    }

    #[test]
    fn test_bracket_closes_open_fill() {
        let mut ctx = RenderContext::builder(10, 10)
            .antialiasing(false)
            .color(Color::RED)
            .build()
            .unwrap();
        ctx.begin_rendering(WindingRule::NonZero);
        ctx.move_to(2.0, 2.0);
        ctx.line_to(8.0, 2.0);
        ctx.line_to(8.0, 8.0);
        ctx.line_to(2.0, 8.0);
        // no explicit close
        ctx.end_rendering().unwrap();
        assert_eq!(ctx.surface().pixel(5, 5), Some(RED));
        assert_eq!(ctx.surface().pixel(1, 5), Some(0));
        assert_eq!(ctx.bounding_box(), PixelRect::new(2, 2, 6, 6));
    }

    #[test]
    fn test_commands_outside_bracket_are_ignored() {
        let mut ctx = RenderContext::builder(10, 10).color(Color::RED).build().unwrap();
        ctx.move_to(0.0, 0.0);
        ctx.line_to(10.0, 0.0);
        ctx.line_to(10.0, 10.0);
        ctx.end_rendering().unwrap();
        assert!(ctx.surface().pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_bracket_bounds_and_clip_intersect() {
        let mut ctx = RenderContext::builder(10, 10)
            .antialiasing(false)
            .color(Color::RED)
            .build()
            .unwrap();
        ctx.set_clip(0, 0, 6, 10);
        assert_eq!(
            ctx.effective_clip(Some(PixelRect::new(4, -5, 20, 8))),
            PixelRect::new(4, 0, 2, 3)
        );
        ctx.reset_clip();
        assert_eq!(ctx.effective_clip(None), PixelRect::new(0, 0, 10, 10));
    }

    #[test]
    fn test_paint_compound_follows_transform() {
        use crate::pattern::Pattern;
        let mut ctx = RenderContext::builder(4, 1)
            .antialiasing(false)
            .build()
            .unwrap();
        let tile = Pattern::new(vec![0xff00_0000, 0xffff_ffff], 2, 1).unwrap();
        ctx.set_paint(Paint::Pattern(tile), &Affine::identity());
        ctx.translate(1.0, 0.0);
        ctx.fill_rect(-1.0, 0.0, 4.0, 1.0).unwrap();
        // the paint moved with the transform, so device x=1 shows tile column 0
        assert_eq!(ctx.surface().pixel(1, 0), Some(0xff00_0000));
        assert_eq!(ctx.surface().pixel(2, 0), Some(0xffff_ffff));
    }
}
