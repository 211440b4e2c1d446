//! Head stage mapping user coordinates to device space.

use crate::sink::{LineStage, PathSink, PathStage};
use crate::transform::Affine;

/// Applies an affine transform to every coordinate before forwarding it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformer {
    m: Affine,
    scale_translate: bool,
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new(&Affine::identity())
    }
}

impl Transformer {
    pub fn new(transform: &Affine) -> Self {
        Self {
            m: *transform,
            scale_translate: transform.is_scale_translate(),
        }
    }

    /// A single stage equivalent to `pre` followed by `downstream`.
    ///
    /// Two adjacent transformers never appear in a pipeline; an extra
    /// transform is folded into the head instead.
    pub fn chained(pre: &Affine, downstream: &Transformer) -> Self {
        Self::new(&downstream.m.pre_concat(pre))
    }

    pub fn set_transform(&mut self, transform: &Affine) {
        *self = Self::new(transform);
    }

    pub fn transform(&self) -> &Affine {
        &self.m
    }

    #[inline]
    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.m;
        if self.scale_translate {
            (m.m00 * x + m.m02, m.m11 * y + m.m12)
        } else {
            (m.m00 * x + m.m01 * y + m.m02, m.m10 * x + m.m11 * y + m.m12)
        }
    }
}

impl<S: PathSink + ?Sized> LineStage<S> for Transformer {
    fn move_to(&mut self, out: &mut S, x0: f64, y0: f64) {
        let (x, y) = self.map(x0, y0);
        out.move_to(x, y);
    }

    fn line_join(&mut self, out: &mut S) {
        out.line_join();
    }

    fn line_to(&mut self, out: &mut S, x1: f64, y1: f64) {
        let (x, y) = self.map(x1, y1);
        out.line_to(x, y);
    }

    fn close(&mut self, out: &mut S) {
        out.close();
    }

    fn end(&mut self, out: &mut S) {
        out.end();
    }
}

impl<S: PathSink + ?Sized> PathStage<S> for Transformer {
    fn quad_to(&mut self, out: &mut S, x1: f64, y1: f64, x2: f64, y2: f64) {
        let (tx1, ty1) = self.map(x1, y1);
        let (tx2, ty2) = self.map(x2, y2);
        out.quad_to(tx1, ty1, tx2, ty2);
    }

    fn cubic_to(&mut self, out: &mut S, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        let (tx1, ty1) = self.map(x1, y1);
        let (tx2, ty2) = self.map(x2, y2);
        let (tx3, ty3) = self.map(x3, y3);
        out.cubic_to(tx1, ty1, tx2, ty2, tx3, ty3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{Chain, LineSink, PathCommand, PathRecorder};

    fn run(t: &mut Transformer, f: impl FnOnce(&mut dyn PathSink)) -> Vec<PathCommand> {
        let mut rec = PathRecorder::new();
        f(&mut Chain::new(t, &mut rec));
        rec.commands
    }

    #[test]
    fn test_scale_translate_fast_path() {
        let mut t = Transformer::new(&Affine::new(2.0, 0.0, 5.0, 0.0, 3.0, -1.0));
        assert!(t.scale_translate);
        let cmds = run(&mut t, |s| {
            s.move_to(1.0, 1.0);
            s.quad_to(2.0, 2.0, 3.0, 3.0);
            s.close();
        });
        assert_eq!(cmds[0], PathCommand::MoveTo(7.0, 2.0));
        assert_eq!(cmds[1], PathCommand::QuadTo(9.0, 5.0, 11.0, 8.0));
        assert_eq!(cmds[2], PathCommand::Close);
    }

    #[test]
    fn test_general_transform_matches_affine() {
        let m = Affine::from_rotate(0.7).pre_translate(3.0, -2.0);
        let mut t = Transformer::new(&m);
        let cmds = run(&mut t, |s| {
            s.move_to(0.0, 0.0);
            s.cubic_to(1.0, 0.0, 1.0, 1.0, 0.0, 1.0);
        });
        let (x, y) = cmds[1].end_point().unwrap();
        let (ex, ey) = m.apply(0.0, 1.0);
        assert!((x - ex).abs() < 1e-12 && (y - ey).abs() < 1e-12);
    }

    #[test]
    fn test_chained_equals_sequential() {
        let pre = Affine::from_translate(10.0, 4.0).pre_scale(0.5, 2.0);
        let head = Transformer::new(&Affine::from_rotate(0.3).pre_scale(3.0, 3.0));
        let mut collapsed = Transformer::chained(&pre, &head);
        let cmds = run(&mut collapsed, |s| s.move_to(1.5, -2.5));

        let mut first = Transformer::new(&pre);
        let mut second = head;
        let mut rec = PathRecorder::new();
        {
            let mut chain = Chain::new(&mut first, Chain::new(&mut second, &mut rec));
            chain.move_to(1.5, -2.5);
        }
        let (a, b) = (cmds[0].end_point().unwrap(), rec.commands[0].end_point().unwrap());
        assert!((a.0 - b.0).abs() < 1e-12 && (a.1 - b.1).abs() < 1e-12);
    }
}
