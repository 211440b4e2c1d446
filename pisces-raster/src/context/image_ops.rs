//! Pixel transfer and export operations for RenderContext.
//!
//! Blits composite straight onto the surface; they are bounded by the surface
//! but not by the clip rectangle.

use super::RenderContext;
use crate::error::RasterResult;
use crate::geometry::{BlitParams, PixelBlock};
use crate::surface::{Surface, SurfaceSink};

impl RenderContext {
    /// Composite a region of another surface with source-over.
    pub fn blit(&mut self, src: &dyn Surface, params: BlitParams) -> RasterResult<()> {
        log::debug!(
            target: "pisces",
            "blit {}x{} from {} {} to {} {} op {}",
            params.width, params.height, params.src_x, params.src_y, params.dst_x, params.dst_y, params.opacity
        );
        self.surface.blit(src, params)
    }

    /// Composite caller ARGB pixels with source-over.
    pub fn blit_argb(&mut self, src: &[u32], block: PixelBlock, opacity: f32) -> RasterResult<()> {
        log::debug!(
            target: "pisces",
            "blitARGB {}x{} at {} {} op {}",
            block.width, block.height, block.x, block.y, opacity
        );
        self.surface.blit_argb(src, block, opacity)
    }

    /// Copy surface pixels into `dst`.
    pub fn get_rgb(&self, dst: &mut [u32], block: PixelBlock) -> RasterResult<()> {
        self.surface.get_rgb(dst, block)
    }

    /// Overwrite surface pixels from `src`, without blending.
    pub fn set_rgb(&mut self, src: &[u32], block: PixelBlock) -> RasterResult<()> {
        log::debug!(
            target: "pisces",
            "setRGB {}x{} at {} {}",
            block.width, block.height, block.x, block.y
        );
        self.surface.set_rgb(src, block)
    }

    /// Encode the surface as an RGBA PNG.
    pub fn to_png(&self) -> RasterResult<Vec<u8>> {
        log::debug!(target: "pisces", "toPNG {}x{}", self.width(), self.height());
        self.surface.to_png()
    }
}
