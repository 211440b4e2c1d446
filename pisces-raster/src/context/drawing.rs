//! Path filling, stroking and cached rendering for RenderContext.

use super::{Consumer, RenderContext};
use crate::error::RasterResult;
use crate::geometry::{Bounds, PixelRect};
use crate::path::Path;
use crate::rasterizer::RenderCache;
use crate::sink::PathSink;
use crate::style::{DrawMode, WindingRule};
use crate::transform::Affine;

/// Command codes read by [`RenderContext::render_path`].
pub const COMMAND_MOVE_TO: u8 = 0;
pub const COMMAND_LINE_TO: u8 = 1;
pub const COMMAND_QUAD_TO: u8 = 2;
pub const COMMAND_CUBIC_TO: u8 = 3;
pub const COMMAND_CLOSE: u8 = 4;

/// Replay packed commands. A command whose coordinates run past the end of
/// `coords` is skipped, as are unknown codes.
fn decode<S: PathSink + ?Sized>(sink: &mut S, commands: &[u8], coords: &[f64]) {
    let mut at = 0;
    for &cmd in commands {
        let arity = match cmd {
            COMMAND_MOVE_TO | COMMAND_LINE_TO => 2,
            COMMAND_QUAD_TO => 4,
            COMMAND_CUBIC_TO => 6,
            COMMAND_CLOSE => {
                sink.close();
                continue;
            }
            _ => continue,
        };
        let Some(c) = coords.get(at..at + arity) else {
            continue;
        };
        at += arity;
        match cmd {
            COMMAND_MOVE_TO => sink.move_to(c[0], c[1]),
            COMMAND_LINE_TO => sink.line_to(c[0], c[1]),
            COMMAND_QUAD_TO => sink.quad_to(c[0], c[1], c[2], c[3]),
            _ => sink.cubic_to(c[0], c[1], c[2], c[3], c[4], c[5]),
        }
    }
}

impl RenderContext {
    /// Fill a path with its own winding rule.
    pub fn fill(&mut self, path: &Path) -> RasterResult<()> {
        log::debug!(target: "pisces", "fill {} commands", path.len());
        self.render(Consumer::Fill, None, path.winding_rule, None, |s| path.produce(s))
    }

    /// Stroke a path with the current stroke parameters.
    pub fn draw(&mut self, path: &Path) -> RasterResult<()> {
        log::debug!(target: "pisces", "draw {} commands", path.len());
        self.render(Consumer::Stroke, None, path.winding_rule, None, |s| path.produce(s))
    }

    /// Fill a path placed in user space by `transform`.
    ///
    /// The extra transform is folded into the pipeline head, so the cached
    /// pipeline is reused as is.
    pub fn fill_transformed(&mut self, path: &Path, transform: &Affine) -> RasterResult<()> {
        log::debug!(target: "pisces", "fill {} commands {:?}", path.len(), transform);
        self.render(
            Consumer::Fill,
            None,
            path.winding_rule,
            Some(transform),
            |s| path.produce(s),
        )
    }

    /// Stroke a path placed in user space by `transform`.
    pub fn draw_transformed(&mut self, path: &Path, transform: &Affine) -> RasterResult<()> {
        log::debug!(target: "pisces", "draw {} commands {:?}", path.len(), transform);
        self.render(
            Consumer::Stroke,
            None,
            path.winding_rule,
            Some(transform),
            |s| path.produce(s),
        )
    }

    /// Render packed path data in the current draw mode.
    ///
    /// With a cache, a valid cache is composited with the current paint
    /// without touching the geometry; an invalid one is filled by this render.
    /// The cache is only meaningful while the transform, mode, stroke and
    /// winding rule stay the same; keeping track of that is up to the caller.
    pub fn render_path(
        &mut self,
        commands: &[u8],
        coords: &[f64],
        rule: WindingRule,
        cache: Option<&mut RenderCache>,
    ) -> RasterResult<()> {
        log::debug!(target: "pisces", "renderPath {} commands {:?}", commands.len(), rule);
        let consumer: Consumer = self.state.mode.into();
        match cache {
            Some(cache) if cache.is_valid() => {
                self.sync_paint();
                self.rasterizer
                    .render_from_cache(cache, &mut self.surface, self.opacity)
            }
            Some(cache) => {
                self.rasterizer.set_cache_recording(true);
                let result = self.render(consumer, None, rule, None, |s| decode(s, commands, coords));
                if let Some(recorded) = self.rasterizer.take_cache() {
                    *cache = recorded;
                }
                self.rasterizer.set_cache_recording(false);
                result
            }
            None => self.render(consumer, None, rule, None, |s| decode(s, commands, coords)),
        }
    }

    /// Reset a rectangle to transparent, within the clip.
    pub fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> RasterResult<()> {
        log::debug!(target: "pisces", "clearRect {} {} {} {}", x, y, w, h);
        let area = PixelRect::covering(&Bounds::new(x, y, w, h));
        let rect = self.effective_clip(Some(area));
        if rect.is_empty() {
            return Ok(());
        }
        let stride = self.width() as usize;
        let pixels = self.surface.pixels_mut();
        for row in rect.y..rect.y + rect.height {
            let start = row as usize * stride + rect.x as usize;
            pixels[start..start + rect.width as usize].fill(0);
        }
        Ok(())
    }

    /// Fill or stroke according to the current draw mode.
    pub fn render_shape(&mut self, path: &Path) -> RasterResult<()> {
        match self.state.mode {
            DrawMode::Fill => self.fill(path),
            DrawMode::Stroke => self.draw(path),
            DrawMode::TextFill => {
                self.render(Consumer::TextFill, None, path.winding_rule, None, |s| {
                    path.produce(s)
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::path::Polygon;
    use crate::sink::{PathCommand, PathRecorder};

    const RED: u32 = 0xffff_0000;
    const BLUE: u32 = 0xff00_00ff;

    fn context() -> RenderContext {
        RenderContext::builder(20, 20)
            .antialiasing(false)
            .color(Color::RED)
            .build()
            .unwrap()
    }

    #[test]
    fn test_decode_skips_short_commands() {
        let mut rec = PathRecorder::new();
        let cmds = [COMMAND_MOVE_TO, COMMAND_LINE_TO, 9, COMMAND_CLOSE, COMMAND_CUBIC_TO];
        decode(&mut rec, &cmds, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(
            rec.commands,
            vec![
                PathCommand::MoveTo(1.0, 2.0),
                PathCommand::LineTo(3.0, 4.0),
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn test_fill_path() {
        let mut ctx = context();
        ctx.fill(&Polygon::rect(5.0, 5.0, 4.0, 4.0)).unwrap();
        assert_eq!(ctx.surface().pixel(6, 6), Some(RED));
        assert_eq!(ctx.surface().pixel(10, 6), Some(0));
    }

    #[test]
    fn test_fill_transformed_keeps_transform() {
        let mut ctx = context();
        let square = Polygon::rect(0.0, 0.0, 2.0, 2.0);
        ctx.fill_transformed(&square, &Affine::from_translate(10.0, 10.0))
            .unwrap();
        assert_eq!(ctx.surface().pixel(11, 11), Some(RED));
        assert_eq!(ctx.surface().pixel(1, 1), Some(0));
        assert!(ctx.transform().is_identity());
    }

    #[test]
    fn test_draw_path_strokes_outline() {
        let mut ctx = context();
        ctx.set_line_width(2.0);
        ctx.draw(&Polygon::rect(4.0, 4.0, 10.0, 10.0)).unwrap();
        assert_eq!(ctx.surface().pixel(4, 9), Some(RED));
        assert_eq!(ctx.surface().pixel(9, 9), Some(0));
    }

    #[test]
    fn test_render_path_cache_replay() {
        let mut ctx = context();
        let cmds = [
            COMMAND_MOVE_TO,
            COMMAND_LINE_TO,
            COMMAND_LINE_TO,
            COMMAND_LINE_TO,
            COMMAND_CLOSE,
        ];
        let coords = [2.0, 2.0, 6.0, 2.0, 6.0, 6.0, 2.0, 6.0];
        let mut cache = RenderCache::new();
        ctx.render_path(&cmds, &coords, WindingRule::NonZero, Some(&mut cache))
            .unwrap();
        assert!(cache.is_valid());
        assert_eq!(cache.bounding_box(), PixelRect::new(2, 2, 4, 4));
        assert_eq!(ctx.surface().pixel(3, 3), Some(RED));

        // replay ignores the geometry entirely
        ctx.set_color(Color::BLUE);
        ctx.render_path(&[], &[], WindingRule::NonZero, Some(&mut cache))
            .unwrap();
        assert_eq!(ctx.surface().pixel(3, 3), Some(BLUE));
        assert_eq!(ctx.surface().pixel(7, 7), Some(0));
    }

    #[test]
    fn test_clear_rect_respects_clip() {
        let mut ctx = context();
        ctx.surface_mut().fill(RED);
        ctx.set_clip(0, 0, 10, 20);
        ctx.clear_rect(5.0, 5.0, 10.0, 2.0).unwrap();
        assert_eq!(ctx.surface().pixel(5, 5), Some(0));
        assert_eq!(ctx.surface().pixel(9, 6), Some(0));
        assert_eq!(ctx.surface().pixel(10, 5), Some(RED));
        assert_eq!(ctx.surface().pixel(5, 7), Some(RED));
    }

    #[test]
    fn test_render_shape_follows_mode() {
        let mut ctx = context();
        ctx.set_stroke_mode();
        ctx.set_line_width(2.0);
        ctx.render_shape(&Polygon::rect(4.0, 4.0, 10.0, 10.0)).unwrap();
        assert_eq!(ctx.surface().pixel(9, 9), Some(0));
        ctx.set_fill();
        ctx.render_shape(&Polygon::rect(4.0, 4.0, 10.0, 10.0)).unwrap();
        assert_eq!(ctx.surface().pixel(9, 9), Some(RED));
    }
}
