//! Backend rasterizers: the sink at the end of every pipeline.
//!
//! [`MaskRasterizer`] collects device-space edges into a `tiny_skia` path,
//! turns them into a coverage mask over the clip rectangle, shades the touched
//! pixels with the active paint and composites the result onto the target.

use crate::color::Color;
use crate::error::{RasterError, RasterResult};
use crate::geometry::{PixelBlock, PixelRect};
use crate::paint::{Paint, PaintSource};
use crate::sink::LineSink;
use crate::style::WindingRule;
use crate::surface::SurfaceSink;
use tiny_skia::{Mask, PathBuilder, Transform};

/// Coverage of one rendered primitive, replayable with any paint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderCache {
    bbox: PixelRect,
    coverage: Vec<u8>,
    valid: bool,
}

impl RenderCache {
    /// An empty, invalid cache.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Force the next render to record again.
    pub fn invalidate(&mut self) {
        self.valid = false;
        self.coverage.clear();
        self.bbox = PixelRect::default();
    }

    pub fn bounding_box(&self) -> PixelRect {
        self.bbox
    }
}

/// Converts device-space line commands into composited pixels.
pub trait Rasterizer: LineSink {
    /// Start a primitive. Only pixels inside `clip` may be written.
    fn begin_rendering(&mut self, clip: PixelRect, rule: WindingRule);

    /// Finish the primitive and composite it onto `target`.
    fn end_rendering(&mut self, target: &mut dyn SurfaceSink, opacity: f32) -> RasterResult<()>;

    fn set_paint(&mut self, paint: Paint);

    /// Subpixel positions (lg); zero disables antialiasing.
    fn set_antialiasing(&mut self, subpixel_lg: u32);

    fn subpixel_lg(&self) -> u32;

    /// Pixels touched by the most recent primitive.
    fn bounding_box(&self) -> PixelRect;

    /// Record the coverage of subsequent primitives.
    fn set_cache_recording(&mut self, _recording: bool) {}

    /// Coverage recorded for the last primitive, if recording was on.
    fn take_cache(&mut self) -> Option<RenderCache> {
        None
    }

    /// Composite previously recorded coverage with the current paint.
    fn render_from_cache(
        &mut self,
        _cache: &RenderCache,
        _target: &mut dyn SurfaceSink,
        _opacity: f32,
    ) -> RasterResult<()> {
        Err(RasterError::Unsupported(
            "this rasterizer does not replay caches".to_string(),
        ))
    }
}

/// Reference backend computing coverage with a `tiny_skia::Mask`.
pub struct MaskRasterizer {
    builder: PathBuilder,
    clip: PixelRect,
    rule: WindingRule,
    paint: Paint,
    subpixel_lg: u32,
    bbox: PixelRect,
    recording: bool,
    cache: Option<RenderCache>,
    tile: Vec<u32>,
    min_touched: Vec<i32>,
    max_touched: Vec<i32>,
}

impl Default for MaskRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskRasterizer {
    pub fn new() -> Self {
        Self {
            builder: PathBuilder::new(),
            clip: PixelRect::default(),
            rule: WindingRule::NonZero,
            paint: Paint::Solid(Color::TRANSPARENT),
            subpixel_lg: 3,
            bbox: PixelRect::default(),
            recording: false,
            cache: None,
            tile: Vec::new(),
            min_touched: Vec::new(),
            max_touched: Vec::new(),
        }
    }

    fn local(&self, x: f64, y: f64) -> (f32, f32) {
        ((x - self.clip.x as f64) as f32, (y - self.clip.y as f64) as f32)
    }

    /// Crop `coverage` (clip-sized) to the touched pixels.
    fn touched(&self, coverage: &[u8]) -> (PixelRect, Vec<u8>) {
        let w = self.clip.width as usize;
        let (mut x0, mut y0, mut x1, mut y1) = (usize::MAX, usize::MAX, 0usize, 0usize);
        for (row, line) in coverage.chunks_exact(w).enumerate() {
            let first = line.iter().position(|c| *c != 0);
            let last = line.iter().rposition(|c| *c != 0);
            if let (Some(first), Some(last)) = (first, last) {
                x0 = x0.min(first);
                x1 = x1.max(last + 1);
                y0 = y0.min(row);
                y1 = y1.max(row + 1);
            }
        }
        if x0 == usize::MAX {
            return (PixelRect::default(), Vec::new());
        }
        let (bw, bh) = (x1 - x0, y1 - y0);
        let mut cropped = Vec::with_capacity(bw * bh);
        for row in y0..y1 {
            cropped.extend_from_slice(&coverage[row * w + x0..row * w + x1]);
        }
        let bbox = PixelRect::new(
            self.clip.x + x0 as i32,
            self.clip.y + y0 as i32,
            bw as i32,
            bh as i32,
        );
        (bbox, cropped)
    }

    /// Shade the touched pixels of `bbox` and composite them.
    fn composite(
        &mut self,
        bbox: PixelRect,
        coverage: &[u8],
        target: &mut dyn SurfaceSink,
        opacity: f32,
    ) -> RasterResult<()> {
        if bbox.is_empty() {
            return Ok(());
        }
        let (bw, bh) = (bbox.width as usize, bbox.height as usize);
        self.tile.clear();
        self.tile.try_reserve(bw * bh)?;
        self.tile.resize(bw * bh, 0);
        self.min_touched.clear();
        self.max_touched.clear();
        for line in coverage.chunks_exact(bw) {
            let first = line.iter().position(|c| *c != 0);
            let last = line.iter().rposition(|c| *c != 0);
            match (first, last) {
                (Some(first), Some(last)) => {
                    self.min_touched.push(first as i32);
                    self.max_touched.push(last as i32);
                }
                _ => {
                    self.min_touched.push(0);
                    self.max_touched.push(-1);
                }
            }
        }

        self.paint.paint(
            bbox.x,
            bbox.y,
            bbox.width,
            bbox.height,
            &self.min_touched,
            &self.max_touched,
            &mut self.tile,
            0,
            bw,
        );
        for (px, cov) in self.tile.iter_mut().zip(coverage) {
            let a = (*px >> 24) * *cov as u32;
            *px = (((a + 127) / 255) << 24) | (*px & 0x00ff_ffff);
        }

        target.blit_argb(
            &self.tile,
            PixelBlock::packed(bbox.x, bbox.y, bbox.width, bbox.height),
            opacity,
        )
    }
}

impl LineSink for MaskRasterizer {
    fn move_to(&mut self, x0: f64, y0: f64) {
        let (x, y) = self.local(x0, y0);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x1: f64, y1: f64) {
        let (x, y) = self.local(x1, y1);
        self.builder.line_to(x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }

    fn end(&mut self) {}
}

impl Rasterizer for MaskRasterizer {
    fn begin_rendering(&mut self, clip: PixelRect, rule: WindingRule) {
        self.builder = PathBuilder::new();
        self.clip = clip;
        self.rule = rule;
        self.bbox = PixelRect::default();
    }

    fn end_rendering(&mut self, target: &mut dyn SurfaceSink, opacity: f32) -> RasterResult<()> {
        let builder = std::mem::replace(&mut self.builder, PathBuilder::new());
        self.bbox = PixelRect::default();
        if self.clip.is_empty() {
            return Ok(());
        }
        let Some(path) = builder.finish() else {
            return Ok(());
        };
        let mut mask = Mask::new(self.clip.width as u32, self.clip.height as u32).ok_or_else(|| {
            RasterError::Allocation(format!(
                "coverage mask {}x{}",
                self.clip.width, self.clip.height
            ))
        })?;
        mask.fill_path(&path, self.rule.into(), self.subpixel_lg > 0, Transform::identity());

        let (bbox, coverage) = self.touched(mask.data());
        self.bbox = bbox;
        log::trace!(target: "pisces", "rasterized {:?} within {:?}", bbox, self.clip);
        if self.recording {
            self.cache = Some(RenderCache {
                bbox,
                coverage: coverage.clone(),
                valid: true,
            });
        }
        self.composite(bbox, &coverage, target, opacity)
    }

    fn set_paint(&mut self, paint: Paint) {
        self.paint = paint;
    }

    fn set_antialiasing(&mut self, subpixel_lg: u32) {
        self.subpixel_lg = subpixel_lg;
    }

    fn subpixel_lg(&self) -> u32 {
        self.subpixel_lg
    }

    fn bounding_box(&self) -> PixelRect {
        self.bbox
    }

    fn set_cache_recording(&mut self, recording: bool) {
        self.recording = recording;
        if !recording {
            self.cache = None;
        }
    }

    fn take_cache(&mut self) -> Option<RenderCache> {
        self.cache.take()
    }

    fn render_from_cache(
        &mut self,
        cache: &RenderCache,
        target: &mut dyn SurfaceSink,
        opacity: f32,
    ) -> RasterResult<()> {
        self.bbox = cache.bbox;
        self.composite(cache.bbox, &cache.coverage, target, opacity)
    }
}
