//! Transform operations for RenderContext.

use super::RenderContext;
use crate::transform::Affine;

impl RenderContext {
    /// Replace the user to device transform.
    pub fn set_transform(&mut self, transform: Affine) {
        log::debug!(target: "pisces", "setTransform {:?}", transform);
        self.state.transform = transform;
        if let Some(paint) = self.state.paint.as_mut() {
            paint.set_transform(&transform.pre_concat(&self.state.paint_transform));
            self.mark_paint_dirty();
        }
        self.invalidate_pipelines();
    }

    pub fn transform(&self) -> &Affine {
        &self.state.transform
    }

    pub fn reset_transform(&mut self) {
        self.set_transform(Affine::identity());
    }

    /// Apply `other` to user coordinates before the current transform.
    pub fn concat(&mut self, other: &Affine) {
        self.set_transform(self.state.transform.pre_concat(other));
    }

    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.set_transform(self.state.transform.pre_translate(tx, ty));
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.set_transform(self.state.transform.pre_scale(sx, sy));
    }

    /// Rotate by `angle` radians.
    pub fn rotate(&mut self, angle: f64) {
        self.set_transform(self.state.transform.pre_rotate(angle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_composition() {
        let mut ctx = RenderContext::new(10, 10).unwrap();
        ctx.translate(10.0, 20.0);
        ctx.scale(2.0, 3.0);
        assert_eq!(ctx.transform().apply(1.0, 1.0), (12.0, 23.0));
        ctx.reset_transform();
        assert!(ctx.transform().is_identity());
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let mut ctx = RenderContext::new(10, 10).unwrap();
        ctx.rotate(std::f64::consts::FRAC_PI_2);
        let (x, y) = ctx.transform().apply(1.0, 0.0);
        assert!(x.abs() < 1e-12);
        assert!((y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_change_rebuilds_pipelines() {
        let mut ctx = RenderContext::new(10, 10).unwrap();
        ctx.fill_rect(0.0, 0.0, 2.0, 2.0).unwrap();
        assert!(ctx.pipelines.fill.is_some());
        ctx.translate(1.0, 0.0);
        assert!(ctx.pipelines.fill.is_none());
    }
}
