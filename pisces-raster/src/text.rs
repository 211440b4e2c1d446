//! Glyph collections and simple left-to-right text layout.
//!
//! Fonts are collaborators: the rasterizer only needs a glyph's box size and
//! either its outline (drawn through the text-fill pipeline) or its coverage
//! bitmap (composited straight onto the surface). Glyph coordinates are
//! relative to the top left of the glyph box, not to a baseline.

use crate::color::Color;
use crate::error::{RasterError, RasterResult};
use crate::path_store::PathStore;
use std::collections::HashMap;

/// How a font's glyphs reach the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    /// Outlines, rendered through the path pipeline.
    Vector,
    /// Coverage bitmaps, composited directly.
    Bitmap,
}

/// An 8-bit coverage bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBitmap {
    width: i32,
    height: i32,
    coverage: Vec<u8>,
}

impl GlyphBitmap {
    pub fn new(coverage: Vec<u8>, width: i32, height: i32) -> RasterResult<Self> {
        if width < 0 || height < 0 {
            return Err(RasterError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }
        if coverage.len() != width as usize * height as usize {
            return Err(RasterError::InvalidArgument(format!(
                "Glyph bitmap holds {} samples, expected {}x{}",
                coverage.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            coverage,
        })
    }

    /// Build from 1-bit rows, most significant bit first, `stride` bytes per row.
    pub fn from_bits(bits: &[u8], stride: usize, width: i32, height: i32) -> RasterResult<Self> {
        let needed = stride * height.max(0) as usize;
        if stride * 8 < width.max(0) as usize || bits.len() < needed {
            return Err(RasterError::InvalidArgument(format!(
                "Glyph bits too short for {width}x{height} with stride {stride}"
            )));
        }
        let mut coverage = Vec::with_capacity(width.max(0) as usize * height.max(0) as usize);
        for row in bits.chunks(stride.max(1)).take(height.max(0) as usize) {
            for x in 0..width.max(0) as usize {
                let set = row[x / 8] & (0x80 >> (x % 8)) != 0;
                coverage.push(if set { 0xff } else { 0 });
            }
        }
        Self::new(coverage, width, height)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn coverage(&self) -> &[u8] {
        &self.coverage
    }

    /// Non-premultiplied ARGB pixels of the bitmap tinted with `color`.
    pub fn tinted(&self, color: Color) -> Vec<u32> {
        let rgb = color.to_argb() & 0x00ff_ffff;
        let alpha = color.alpha as u32;
        self.coverage
            .iter()
            .map(|c| {
                let a = (alpha * *c as u32 + 127) / 255;
                (a << 24) | rgb
            })
            .collect()
    }
}

/// The renderable part of a glyph.
#[derive(Debug, Clone, PartialEq)]
pub enum GlyphShape {
    Outline(PathStore),
    Bitmap(GlyphBitmap),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub id: char,
    /// Advance width of the glyph box.
    pub width: f64,
    pub height: f64,
    pub shape: GlyphShape,
}

impl Glyph {
    pub fn outline(id: char, width: f64, height: f64, path: PathStore) -> Self {
        Self {
            id,
            width,
            height,
            shape: GlyphShape::Outline(path),
        }
    }

    /// A bitmap glyph whose box is the bitmap itself.
    pub fn bitmap(id: char, bitmap: GlyphBitmap) -> Self {
        Self {
            id,
            width: bitmap.width as f64,
            height: bitmap.height as f64,
            shape: GlyphShape::Bitmap(bitmap),
        }
    }

    pub fn kind(&self) -> FontKind {
        match self.shape {
            GlyphShape::Outline(_) => FontKind::Vector,
            GlyphShape::Bitmap(_) => FontKind::Bitmap,
        }
    }
}

/// A collection of glyphs of one kind.
pub trait Font {
    fn kind(&self) -> FontKind;

    fn glyph(&self, ch: char) -> Option<&Glyph>;

    /// Widest glyph box; the advance used for missing glyphs.
    fn max_width(&self) -> f64;

    /// Tallest glyph box; the line height.
    fn max_height(&self) -> f64;
}

/// In-memory [`Font`] keyed by character.
#[derive(Debug, Clone)]
pub struct GlyphSet {
    kind: FontKind,
    glyphs: HashMap<char, Glyph>,
    max_width: f64,
    max_height: f64,
}

impl GlyphSet {
    pub fn new(kind: FontKind) -> Self {
        Self {
            kind,
            glyphs: HashMap::new(),
            max_width: 0.0,
            max_height: 0.0,
        }
    }

    /// Add or replace a glyph. Its kind must match the set's.
    pub fn insert(&mut self, glyph: Glyph) -> RasterResult<()> {
        if glyph.kind() != self.kind {
            return Err(RasterError::Unsupported(format!(
                "{:?} glyph '{}' in a {:?} font",
                glyph.kind(),
                glyph.id,
                self.kind
            )));
        }
        self.max_width = self.max_width.max(glyph.width);
        self.max_height = self.max_height.max(glyph.height);
        self.glyphs.insert(glyph.id, glyph);
        Ok(())
    }

    pub fn with_glyph(mut self, glyph: Glyph) -> RasterResult<Self> {
        self.insert(glyph)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl Font for GlyphSet {
    fn kind(&self) -> FontKind {
        self.kind
    }

    fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    fn max_width(&self) -> f64 {
        self.max_width
    }

    fn max_height(&self) -> f64 {
        self.max_height
    }
}

/// A glyph positioned by [`layout`], at the top left of its box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedGlyph<'a> {
    pub glyph: &'a Glyph,
    pub x: f64,
    pub y: f64,
}

/// Place the glyphs of `text` starting at (x, y).
///
/// Spaces advance by the space glyph's width; `'\n'` returns to `x` and moves
/// down one line; `'\r'` only returns to `x`. Characters the font lacks advance
/// by the maximum glyph width and place nothing.
pub fn layout<'a, F: Font + ?Sized>(font: &'a F, text: &str, x: f64, y: f64) -> Vec<PlacedGlyph<'a>> {
    let mut placed = Vec::with_capacity(text.len());
    let (mut px, mut py) = (x, y);
    for ch in text.chars() {
        match ch {
            ' ' => px += font.glyph(' ').map_or(font.max_width(), |g| g.width),
            '\n' => {
                px = x;
                py += font.max_height();
            }
            '\r' => px = x,
            _ => match font.glyph(ch) {
                Some(glyph) => {
                    placed.push(PlacedGlyph { glyph, x: px, y: py });
                    px += glyph.width;
                }
                None => px += font.max_width(),
            },
        }
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Polygon;

    fn block(id: char, width: f64) -> Glyph {
        Glyph::outline(id, width, 10.0, Polygon::rect(0.0, 0.0, width, 10.0).into_store())
    }

    fn vector_font() -> GlyphSet {
        let mut font = GlyphSet::new(FontKind::Vector);
        font.insert(block('a', 4.0)).unwrap();
        font.insert(block('b', 6.0)).unwrap();
        font
    }

    #[test]
    fn test_glyph_set_tracks_max_box() {
        let font = vector_font();
        assert_eq!(font.len(), 2);
        assert_eq!(font.max_width(), 6.0);
        assert_eq!(font.max_height(), 10.0);
        assert!(font.glyph('c').is_none());
    }

    #[test]
    fn test_glyphs_compare_by_outline() {
        assert_eq!(block('a', 4.0), block('a', 4.0));
        let mut wider = block('a', 4.0);
        wider.shape = GlyphShape::Outline(Polygon::rect(0.0, 0.0, 5.0, 10.0).into_store());
        assert_ne!(block('a', 4.0), wider);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let mut font = GlyphSet::new(FontKind::Bitmap);
        let err = font.insert(block('a', 4.0)).unwrap_err();
        assert!(matches!(err, RasterError::Unsupported(_)));
    }

    #[test]
    fn test_layout_advances() {
        let font = vector_font();
        let placed = layout(&font, "ab a", 1.0, 2.0);
        let xs: Vec<f64> = placed.iter().map(|p| p.x).collect();
        // no space glyph: the space advances by the widest box
        assert_eq!(xs, vec![1.0, 5.0, 17.0]);
        assert!(placed.iter().all(|p| p.y == 2.0));
    }

    #[test]
    fn test_layout_line_breaks() {
        let font = vector_font();
        let placed = layout(&font, "ab\na\rb?a", 0.0, 0.0);
        let at: Vec<(char, f64, f64)> = placed.iter().map(|p| (p.glyph.id, p.x, p.y)).collect();
        assert_eq!(
            at,
            vec![
                ('a', 0.0, 0.0),
                ('b', 4.0, 0.0),
                ('a', 0.0, 10.0),
                ('b', 0.0, 10.0),
                ('a', 12.0, 10.0),
            ]
        );
    }

    #[test]
    fn test_bitmap_from_bits() {
        let bitmap = GlyphBitmap::from_bits(&[0b1010_0000, 0b0100_0000], 1, 3, 2).unwrap();
        assert_eq!(bitmap.coverage(), &[255, 0, 255, 0, 255, 0]);
        assert!(GlyphBitmap::from_bits(&[0], 1, 3, 2).is_err());
    }

    #[test]
    fn test_bitmap_tint() {
        let bitmap = GlyphBitmap::new(vec![0, 255, 128], 3, 1).unwrap();
        let px = bitmap.tinted(Color::RED);
        assert_eq!(px, vec![0x00ff_0000, 0xffff_0000, 0x80ff_0000]);
    }
}
