//! Non-premultiplied 8-bit ARGB colors.

use crate::error::{RasterError, RasterResult};
use std::fmt;
use std::str::FromStr;

/// An ARGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub alpha: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const LIGHT_GRAY: Color = Color::rgb(192, 192, 192);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const DARK_GRAY: Color = Color::rgb(64, 64, 64);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const PINK: Color = Color::rgb(255, 175, 175);
    pub const ORANGE: Color = Color::rgb(255, 200, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    /// Transparent black.
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self {
            alpha,
            red,
            green,
            blue,
        }
    }

    /// An opaque color.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::new(255, red, green, blue)
    }

    /// The same color with alpha zero.
    pub const fn transparent(self) -> Self {
        Self::new(0, self.red, self.green, self.blue)
    }

    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self::new(alpha, self.red, self.green, self.blue)
    }

    /// Unpack `0xAARRGGBB`.
    ///
    /// An alpha byte of zero reads as opaque, so `0xRRGGBB` literals give
    /// the color they spell. Use [`Color::new`] for transparent colors.
    pub fn from_argb(argb: u32) -> Self {
        let [a, r, g, b] = argb.to_be_bytes();
        Self::new(if a == 0 { 255 } else { a }, r, g, b)
    }

    /// Pack as `0xAARRGGBB`.
    pub const fn to_argb(self) -> u32 {
        u32::from_be_bytes([self.alpha, self.red, self.green, self.blue])
    }

    pub fn is_opaque(&self) -> bool {
        self.alpha == 255
    }

    /// Parse any CSS color string.
    pub fn parse(s: &str) -> RasterResult<Self> {
        let parsed = csscolorparser::parse(s)
            .map_err(|e| RasterError::ColorParseError(format!("{}: {}", s, e)))?;
        let [r, g, b, a] = parsed.to_rgba8();
        Ok(Self::new(a, r, g, b))
    }
}

impl FromStr for Color {
    type Err = RasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Red:{} Green:{} Blue:{} Alpha:{}}}",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

impl From<Color> for u32 {
    fn from(c: Color) -> u32 {
        c.to_argb()
    }
}
