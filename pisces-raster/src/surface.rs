//! Pixel surfaces and the source-over compositor.
//!
//! Every block copy is clamped against both the surface and the caller's
//! array before a single pixel is touched. Out of range rows and columns are
//! dropped; a caller array too short for the clamped block is an error.

use crate::error::{RasterError, RasterResult};
use crate::geometry::{BlitParams, PixelBlock};

/// Largest accepted surface side.
pub const MAX_DIMENSION: i32 = 32767;

/// Pixel layout codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ImageType {
    IntRgb = 1,
    IntArgb = 2,
    IntArgbPre = 3,
    Ushort565Rgb = 8,
    ByteGray = 10,
}

impl ImageType {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Borrowed view of a surface's backing store.
#[derive(Debug, Clone, Copy)]
pub enum PixelData<'a> {
    Int(&'a [u32]),
    Short(&'a [u16]),
    Byte(&'a [u8]),
}

/// A readable and writable pixel buffer.
pub trait Surface {
    fn width(&self) -> i32;

    fn height(&self) -> i32;

    fn data_type(&self) -> ImageType;

    fn data(&self) -> PixelData<'_>;

    /// Copy the surface region `block` into `dst` as ARGB.
    fn get_rgb(&self, dst: &mut [u32], block: PixelBlock) -> RasterResult<()>;

    /// Overwrite the surface region `block` with ARGB pixels from `src`.
    fn set_rgb(&mut self, src: &[u32], block: PixelBlock) -> RasterResult<()>;
}

/// A surface that can composite onto itself.
pub trait SurfaceSink: Surface {
    /// Composite a region of another surface.
    fn blit(&mut self, src: &dyn Surface, params: BlitParams) -> RasterResult<()>;

    /// Composite ARGB pixels from a caller array.
    fn blit_argb(&mut self, src: &[u32], block: PixelBlock, opacity: f32) -> RasterResult<()>;
}

fn validate_dimensions(width: i32, height: i32) -> RasterResult<()> {
    if width <= 0 || height <= 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(RasterError::InvalidDimensions {
            width: width as i64,
            height: height as i64,
        });
    }
    Ok(())
}

/// Clamp `block` to a `width` x `height` surface, moving the array offset
/// past any rows and columns that fall off the top or left.
pub(crate) fn clip_block(block: PixelBlock, width: i32, height: i32) -> Option<PixelBlock> {
    let mut x = block.x as i64;
    let mut y = block.y as i64;
    let mut w = block.width as i64;
    let mut h = block.height as i64;
    let mut skip_x = 0i64;
    let mut skip_y = 0i64;
    if x < 0 {
        skip_x = -x;
        w += x;
        x = 0;
    }
    if y < 0 {
        skip_y = -y;
        h += y;
        y = 0;
    }
    if x + w > width as i64 {
        w = width as i64 - x;
    }
    if y + h > height as i64 {
        h = height as i64 - y;
    }
    if w <= 0 || h <= 0 {
        return None;
    }
    Some(PixelBlock {
        offset: block.offset + skip_y as usize * block.scan + skip_x as usize,
        scan: block.scan,
        x: x as i32,
        y: y as i32,
        width: w as i32,
        height: h as i32,
    })
}

/// Check that a caller array holds every pixel of a clipped block.
pub(crate) fn check_span(len: usize, block: &PixelBlock) -> RasterResult<()> {
    let w = block.width as usize;
    let h = block.height as usize;
    if h > 1 && block.scan < w {
        return Err(RasterError::InvalidArgument(format!(
            "Scan length {} is shorter than block width {}",
            block.scan, w
        )));
    }
    let needed = block.offset + (h - 1) * block.scan + w;
    if needed > len {
        return Err(RasterError::InvalidArgument(format!(
            "Pixel array too short: need {} pixels, got {}",
            needed, len
        )));
    }
    Ok(())
}

/// Porter-Duff source-over of one non-premultiplied ARGB pixel.
///
/// `op` is the opacity in 0..=256. Channels are weighted by a fixed-point
/// reciprocal of the output alpha and rounded to nearest.
#[inline]
pub fn source_over(src: u32, dst: u32, op: u32) -> u32 {
    let src_a = ((src >> 24) & 0xff) * op;
    if src_a == 0xff00 {
        return src;
    }
    if src_a == 0 {
        return dst;
    }
    let dst_a = ((dst >> 24) & 0xff) as u64;
    let anom = 255 * src_a as u64;
    let bnom = dst_a * (0xff00 - src_a) as u64;
    let denom = anom + bnom;
    let recip = (1u64 << 32) / denom;
    let fa = anom * recip;
    let fb = bnom * recip;
    let channel = |shift: u32| -> u32 {
        let cs = ((src >> shift) & 0xff) as u64;
        let cd = ((dst >> shift) & 0xff) as u64;
        ((fa * cs + fb * cd + (1 << 31)) >> 32) as u32
    };
    let alpha = ((257 * denom + (1 << 23)) >> 24) as u32 & 0xff;
    (alpha << 24) | (channel(16) << 16) | (channel(8) << 8) | channel(0)
}

/// Opacity as a 0..=256 fixed-point factor.
pub fn opacity_factor(opacity: f32) -> u32 {
    (256.0 * opacity.clamp(0.0, 1.0)) as u32
}

#[allow(clippy::too_many_arguments)]
fn copy_rows(
    dst: &mut [u32],
    dst_offset: usize,
    dst_scan: usize,
    src: &[u32],
    src_offset: usize,
    src_scan: usize,
    width: usize,
    height: usize,
) {
    for row in 0..height {
        let d = dst_offset + row * dst_scan;
        let s = src_offset + row * src_scan;
        dst[d..d + width].copy_from_slice(&src[s..s + width]);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_rows(
    dst: &mut [u32],
    dst_offset: usize,
    dst_scan: usize,
    src: &[u32],
    src_offset: usize,
    src_scan: usize,
    width: usize,
    height: usize,
    op: u32,
) {
    for row in 0..height {
        let d = dst_offset + row * dst_scan;
        let s = src_offset + row * src_scan;
        for (dp, sp) in dst[d..d + width].iter_mut().zip(&src[s..s + width]) {
            *dp = source_over(*sp, *dp, op);
        }
    }
}

/// Row-major, unpadded, non-premultiplied ARGB pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgbSurface {
    width: i32,
    height: i32,
    data: Vec<u32>,
}

impl ArgbSurface {
    /// A fully transparent surface.
    pub fn new(width: i32, height: i32) -> RasterResult<Self> {
        validate_dimensions(width, height)?;
        let mut data = Vec::new();
        data.try_reserve_exact(width as usize * height as usize)?;
        data.resize(width as usize * height as usize, 0);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap an existing buffer; its length must be exactly `width * height`.
    pub fn from_data(data: Vec<u32>, width: i32, height: i32) -> RasterResult<Self> {
        validate_dimensions(width, height)?;
        if data.len() != width as usize * height as usize {
            return Err(RasterError::InvalidArgument(format!(
                "Pixel buffer holds {} pixels, expected {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn pixels(&self) -> &[u32] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    pub fn into_pixels(self) -> Vec<u32> {
        self.data
    }

    /// The pixel at (x, y), if inside the surface.
    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Set every pixel to `argb`.
    pub fn fill(&mut self, argb: u32) {
        self.data.fill(argb);
    }

    /// Encode as an 8-bit RGBA PNG.
    pub fn to_png(&self) -> RasterResult<Vec<u8>> {
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.width as u32, self.height as u32);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;

            let mut rgba = Vec::with_capacity(self.data.len() * 4);
            for argb in &self.data {
                let [a, r, g, b] = argb.to_be_bytes();
                rgba.extend_from_slice(&[r, g, b, a]);
            }
            writer.write_image_data(&rgba)?;
        }
        Ok(buf)
    }
}

impl Surface for ArgbSurface {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn data_type(&self) -> ImageType {
        ImageType::IntArgb
    }

    fn data(&self) -> PixelData<'_> {
        PixelData::Int(&self.data)
    }

    fn get_rgb(&self, dst: &mut [u32], block: PixelBlock) -> RasterResult<()> {
        let Some(b) = clip_block(block, self.width, self.height) else {
            return Ok(());
        };
        check_span(dst.len(), &b)?;
        copy_rows(
            dst,
            b.offset,
            b.scan,
            &self.data,
            b.y as usize * self.width as usize + b.x as usize,
            self.width as usize,
            b.width as usize,
            b.height as usize,
        );
        Ok(())
    }

    fn set_rgb(&mut self, src: &[u32], block: PixelBlock) -> RasterResult<()> {
        let Some(b) = clip_block(block, self.width, self.height) else {
            return Ok(());
        };
        check_span(src.len(), &b)?;
        let offset = b.y as usize * self.width as usize + b.x as usize;
        let scan = self.width as usize;
        copy_rows(
            &mut self.data,
            offset,
            scan,
            src,
            b.offset,
            b.scan,
            b.width as usize,
            b.height as usize,
        );
        Ok(())
    }
}

impl SurfaceSink for ArgbSurface {
    fn blit(&mut self, src: &dyn Surface, params: BlitParams) -> RasterResult<()> {
        let BlitParams {
            mut src_x,
            mut src_y,
            mut dst_x,
            mut dst_y,
            mut width,
            mut height,
            opacity,
        } = params;
        let src_w = src.width();
        let src_h = src.height();

        if src_x < 0 {
            dst_x -= src_x;
            width += src_x;
            src_x = 0;
        }
        if src_y < 0 {
            dst_y -= src_y;
            height += src_y;
            src_y = 0;
        }
        if src_x + width > src_w {
            width = src_w - src_x;
        }
        if src_y + height > src_h {
            height = src_h - src_y;
        }
        if width < 0 || height < 0 || opacity == 0.0 {
            return Ok(());
        }

        if let (ImageType::IntArgb, PixelData::Int(pixels)) = (src.data_type(), src.data()) {
            let block = PixelBlock {
                offset: src_y as usize * src_w as usize + src_x as usize,
                scan: src_w as usize,
                x: dst_x,
                y: dst_y,
                width,
                height,
            };
            return self.blit_argb(pixels, block, opacity);
        }

        // other layouts are converted through a temporary ARGB block
        if dst_x < 0 {
            src_x -= dst_x;
            width += dst_x;
            dst_x = 0;
        }
        if dst_y < 0 {
            src_y -= dst_y;
            height += dst_y;
            dst_y = 0;
        }
        if dst_x + width > self.width {
            width = self.width - dst_x;
        }
        if dst_y + height > self.height {
            height = self.height - dst_y;
        }
        if width > 0 && height > 0 {
            let mut tmp = Vec::new();
            tmp.try_reserve_exact(width as usize * height as usize)?;
            tmp.resize(width as usize * height as usize, 0);
            src.get_rgb(&mut tmp, PixelBlock::packed(src_x, src_y, width, height))?;
            self.blit_argb(&tmp, PixelBlock::packed(dst_x, dst_y, width, height), opacity)?;
        }
        Ok(())
    }

    fn blit_argb(&mut self, src: &[u32], block: PixelBlock, opacity: f32) -> RasterResult<()> {
        let Some(b) = clip_block(block, self.width, self.height) else {
            return Ok(());
        };
        check_span(src.len(), &b)?;
        let op = opacity_factor(opacity);
        if op == 0 {
            return Ok(());
        }
        let offset = b.y as usize * self.width as usize + b.x as usize;
        let scan = self.width as usize;
        draw_rows(
            &mut self.data,
            offset,
            scan,
            src,
            b.offset,
            b.scan,
            b.width as usize,
            b.height as usize,
            op,
        );
        Ok(())
    }
}

/// Row-major 8-bit grayscale pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct GraySurface {
    width: i32,
    height: i32,
    data: Vec<u8>,
}

impl GraySurface {
    pub fn new(width: i32, height: i32) -> RasterResult<Self> {
        validate_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        })
    }

    pub fn from_data(data: Vec<u8>, width: i32, height: i32) -> RasterResult<Self> {
        validate_dimensions(width, height)?;
        if data.len() != width as usize * height as usize {
            return Err(RasterError::InvalidArgument(format!(
                "Gray buffer holds {} pixels, expected {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }
}

/// Rec. 601 luma in 8.8 fixed point.
fn luma(argb: u32) -> u8 {
    let r = (argb >> 16) & 0xff;
    let g = (argb >> 8) & 0xff;
    let b = argb & 0xff;
    ((77 * r + 150 * g + 29 * b + 128) >> 8) as u8
}

impl Surface for GraySurface {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn data_type(&self) -> ImageType {
        ImageType::ByteGray
    }

    fn data(&self) -> PixelData<'_> {
        PixelData::Byte(&self.data)
    }

    fn get_rgb(&self, dst: &mut [u32], block: PixelBlock) -> RasterResult<()> {
        let Some(b) = clip_block(block, self.width, self.height) else {
            return Ok(());
        };
        check_span(dst.len(), &b)?;
        let w = b.width as usize;
        for row in 0..b.height as usize {
            let s = (b.y as usize + row) * self.width as usize + b.x as usize;
            let d = b.offset + row * b.scan;
            for (out, g) in dst[d..d + w].iter_mut().zip(&self.data[s..s + w]) {
                let g = *g as u32;
                *out = 0xff00_0000 | (g << 16) | (g << 8) | g;
            }
        }
        Ok(())
    }

    fn set_rgb(&mut self, src: &[u32], block: PixelBlock) -> RasterResult<()> {
        let Some(b) = clip_block(block, self.width, self.height) else {
            return Ok(());
        };
        check_span(src.len(), &b)?;
        let w = b.width as usize;
        for row in 0..b.height as usize {
            let d = (b.y as usize + row) * self.width as usize + b.x as usize;
            let s = b.offset + row * b.scan;
            for (out, argb) in self.data[d..d + w].iter_mut().zip(&src[s..s + w]) {
                *out = luma(*argb);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn blit(src_x: i32, src_y: i32, dst_x: i32, dst_y: i32, w: i32, h: i32) -> BlitParams {
        BlitParams {
            src_x,
            src_y,
            dst_x,
            dst_y,
            width: w,
            height: h,
            opacity: 1.0,
        }
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            ArgbSurface::new(0, 10),
            Err(RasterError::InvalidDimensions { .. })
        ));
        assert!(ArgbSurface::new(MAX_DIMENSION + 1, 1).is_err());
        assert!(ArgbSurface::from_data(vec![0; 5], 2, 2).is_err());
        assert!(GraySurface::new(-1, 1).is_err());
    }

    #[test]
    fn test_image_type_codes() {
        assert_eq!(ImageType::IntRgb.code(), 1);
        assert_eq!(ImageType::IntArgb.code(), 2);
        assert_eq!(ImageType::IntArgbPre.code(), 3);
        assert_eq!(ImageType::Ushort565Rgb.code(), 8);
        assert_eq!(ImageType::ByteGray.code(), 10);
    }

    #[rstest]
    #[case(0xff12_3456, 0x0000_0000)]
    #[case(0xff12_3456, 0x80ab_cdef)]
    #[case(0xff00_0000, 0xffff_ffff)]
    fn test_opaque_source_replaces(#[case] src: u32, #[case] dst: u32) {
        assert_eq!(source_over(src, dst, 256), src);
    }

    #[test]
    fn test_half_red_over_blue() {
        assert_eq!(source_over(0x80ff_0000, 0xff00_00ff, 256), 0xff80_007f);
    }

    #[test]
    fn test_translucent_over_transparent_keeps_color() {
        assert_eq!(source_over(0x80ff_ffff, 0x0000_0000, 256), 0x80ff_ffff);
    }

    #[test]
    fn test_transparent_source_leaves_destination() {
        assert_eq!(source_over(0x00ff_ffff, 0xff10_2030, 256), 0xff10_2030);
        assert_eq!(source_over(0xffff_ffff, 0xff10_2030, 0), 0xff10_2030);
    }

    #[test]
    fn test_opaque_destination_stays_opaque() {
        for a in [1u32, 64, 128, 254] {
            let out = source_over((a << 24) | 0x0080_8080, 0xff00_0000, 256);
            assert_eq!(out >> 24, 0xff, "alpha {}", a);
        }
    }

    #[test]
    fn test_get_set_rgb_round_trip_with_clipping() {
        let mut surface = ArgbSurface::new(4, 4).unwrap();
        let block: Vec<u32> = (1..=9).collect();
        // 3x3 block hanging off the top-left corner by one pixel
        surface
            .set_rgb(&block, PixelBlock::packed(-1, -1, 3, 3))
            .unwrap();
        assert_eq!(surface.pixel(0, 0), Some(5));
        assert_eq!(surface.pixel(1, 0), Some(6));
        assert_eq!(surface.pixel(0, 1), Some(8));
        assert_eq!(surface.pixel(1, 1), Some(9));
        assert_eq!(surface.pixel(2, 0), Some(0));

        let mut out = vec![0u32; 4];
        surface
            .get_rgb(&mut out, PixelBlock::packed(0, 0, 2, 2))
            .unwrap();
        assert_eq!(out, vec![5, 6, 8, 9]);
    }

    #[test]
    fn test_over_wide_span_is_clamped() {
        let mut surface = ArgbSurface::new(3, 2).unwrap();
        let src = vec![7u32; 20];
        surface
            .set_rgb(
                &src,
                PixelBlock {
                    offset: 0,
                    scan: 10,
                    x: 1,
                    y: 1,
                    width: 10,
                    height: 2,
                },
            )
            .unwrap();
        assert_eq!(surface.pixels(), &[0, 0, 0, 0, 7, 7]);
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let mut surface = ArgbSurface::new(4, 4).unwrap();
        let result = surface.set_rgb(&[1, 2, 3], PixelBlock::packed(0, 0, 2, 2));
        assert!(matches!(result, Err(RasterError::InvalidArgument(_))));
        let mut out = [0u32; 2];
        assert!(surface
            .get_rgb(&mut out, PixelBlock::packed(0, 0, 2, 2))
            .is_err());
    }

    #[test]
    fn test_fully_outside_block_is_noop() {
        let mut surface = ArgbSurface::new(2, 2).unwrap();
        surface
            .set_rgb(&[], PixelBlock::packed(5, 5, 2, 2))
            .unwrap();
        assert!(surface.pixels().iter().all(|p| *p == 0));
    }

    #[test]
    fn test_blit_surface_with_negative_source_origin() {
        let src = ArgbSurface::from_data(vec![0xff00_00ff; 4], 2, 2).unwrap();
        let mut dst = ArgbSurface::new(4, 4).unwrap();
        dst.blit(&src, blit(-1, 0, 1, 1, 2, 2)).unwrap();
        // one source column is cut off, the rest shifts right
        assert_eq!(dst.pixel(1, 1), Some(0));
        assert_eq!(dst.pixel(2, 1), Some(0xff00_00ff));
        assert_eq!(dst.pixel(3, 1), Some(0));
        assert_eq!(dst.pixel(2, 2), Some(0xff00_00ff));
    }

    #[test]
    fn test_blit_zero_opacity_is_noop() {
        let src = ArgbSurface::from_data(vec![0xffff_ffff; 4], 2, 2).unwrap();
        let mut dst = ArgbSurface::new(2, 2).unwrap();
        let mut params = blit(0, 0, 0, 0, 2, 2);
        params.opacity = 0.0;
        dst.blit(&src, params).unwrap();
        assert!(dst.pixels().iter().all(|p| *p == 0));
    }

    #[test]
    fn test_blit_gray_source_converts() {
        let src = GraySurface::from_data(vec![0, 128, 255, 64], 2, 2).unwrap();
        let mut dst = ArgbSurface::new(3, 3).unwrap();
        dst.blit(&src, blit(0, 0, -1, 1, 2, 2)).unwrap();
        assert_eq!(dst.pixel(0, 1), Some(0xff80_8080));
        assert_eq!(dst.pixel(0, 2), Some(0xff40_4040));
        assert_eq!(dst.pixel(1, 1), Some(0));
    }

    #[test]
    fn test_gray_set_rgb_uses_luma() {
        let mut gray = GraySurface::new(2, 1).unwrap();
        gray.set_rgb(&[0xffff_ffff, 0xff00_0000], PixelBlock::packed(0, 0, 2, 1))
            .unwrap();
        assert_eq!(gray.pixels(), &[255, 0]);
    }

    #[test]
    fn test_to_png_signature() {
        let mut surface = ArgbSurface::new(3, 2).unwrap();
        surface.fill(0xff33_6699);
        let png = surface.to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
