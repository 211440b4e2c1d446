//! Text rendering operations for RenderContext.

use super::{Consumer, RenderContext};
use crate::error::{RasterError, RasterResult};
use crate::geometry::PixelBlock;
use crate::style::WindingRule;
use crate::surface::SurfaceSink;
use crate::text::{layout, Font, FontKind, GlyphShape};
use crate::transform::Affine;
use std::rc::Rc;

impl RenderContext {
    pub fn set_font(&mut self, font: Rc<dyn Font>) {
        log::debug!(target: "pisces", "setFont {:?}", font.kind());
        self.font = Some(font);
    }

    pub fn font(&self) -> Option<&Rc<dyn Font>> {
        self.font.as_ref()
    }

    fn font_of_kind(&self, kind: FontKind, op: &str) -> RasterResult<Rc<dyn Font>> {
        let font = self
            .font
            .clone()
            .ok_or_else(|| RasterError::InvalidArgument("missing font".to_string()))?;
        if font.kind() != kind {
            return Err(RasterError::Unsupported(format!(
                "{op} with a {:?} font",
                font.kind()
            )));
        }
        Ok(font)
    }

    /// Fill vector glyph outlines with the current paint.
    ///
    /// (x, y) is the top left of the first glyph box.
    pub fn draw_string(&mut self, text: &str, x: f64, y: f64) -> RasterResult<()> {
        log::debug!(target: "pisces", "drawString {:?} {} {}", text, x, y);
        let font = self.font_of_kind(FontKind::Vector, "drawString")?;
        for placed in layout(&*font, text, x, y) {
            if let GlyphShape::Outline(path) = &placed.glyph.shape {
                let at = Affine::from_translate(placed.x, placed.y);
                self.render(
                    Consumer::TextFill,
                    None,
                    WindingRule::NonZero,
                    Some(&at),
                    |s| path.produce(s),
                )?;
            }
        }
        Ok(())
    }

    /// Composite bitmap glyphs tinted with the current color.
    ///
    /// Glyph positions are rounded to whole pixels and the transform is not applied.
    pub fn blit_string(&mut self, text: &str, x: f64, y: f64, opacity: f32) -> RasterResult<()> {
        log::debug!(target: "pisces", "blitString {:?} {} {} op {}", text, x, y, opacity);
        let font = self.font_of_kind(FontKind::Bitmap, "blitString")?;
        let color = self.state.color;
        for placed in layout(&*font, text, x, y) {
            if let GlyphShape::Bitmap(bitmap) = &placed.glyph.shape {
                let block = PixelBlock::packed(
                    placed.x.round() as i32,
                    placed.y.round() as i32,
                    bitmap.width(),
                    bitmap.height(),
                );
                self.surface.blit_argb(&bitmap.tinted(color), block, opacity)?;
            }
        }
        Ok(())
    }
}
