//! Adaptive curve flattening.
//!
//! Quadratic and cubic segments are bisected (De Casteljau at t = 0.5) until
//! each piece passes a flatness test, then the piece's control points are
//! emitted as `line_to` calls. The test compares squared cross products against
//! the squared chord length scaled by the squared tolerance, so no square roots
//! are taken per piece.

use crate::sink::{LineSink, LineStage, PathStage};

/// Chords longer than this (squared) are always subdivided.
pub const MAX_CHORD_LENGTH_SQ: f64 = 16.0;

/// Pieces whose chord and control box are both smaller than this (squared) are
/// accepted without a flatness test.
pub const MIN_CHORD_LENGTH_SQ: f64 = 0.25;

/// Default cap on subdivision depth.
pub const DEFAULT_MAX_DEPTH: u32 = 32;

/// Pipeline stage turning curves into line segments.
#[derive(Debug, Clone)]
pub struct Flattener {
    flatness: f64,
    flatness_sq: f64,
    max_depth: u32,
    x0: f64,
    y0: f64,
    /// No segment emitted since the last move or close.
    at_subpath_start: bool,
    quads: Vec<([f64; 6], u32)>,
    cubics: Vec<([f64; 8], u32)>,
}

impl Default for Flattener {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Flattener {
    pub fn new(flatness: f64) -> Self {
        Self {
            flatness,
            flatness_sq: flatness * flatness,
            max_depth: DEFAULT_MAX_DEPTH,
            x0: 0.0,
            y0: 0.0,
            at_subpath_start: true,
            quads: Vec::new(),
            cubics: Vec::new(),
        }
    }

    pub fn flatness(&self) -> f64 {
        self.flatness
    }

    pub fn set_flatness(&mut self, flatness: f64) {
        self.flatness = flatness;
        self.flatness_sq = flatness * flatness;
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Pieces at this depth are emitted whether or not they are flat.
    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.max_depth = max_depth;
    }

    fn quad_flat_enough(&self, p: &[f64; 6]) -> bool {
        let [x0, y0, x1, y1, x2, y2] = *p;
        let dx = x2 - x0;
        let dy = y2 - y0;
        let denom2 = dx * dx + dy * dy;
        if denom2 > MAX_CHORD_LENGTH_SQ {
            return false;
        }
        if denom2 < MIN_CHORD_LENGTH_SQ {
            let w = x0.max(x1).max(x2) - x0.min(x1).min(x2);
            let h = y0.max(y1).max(y2) - y0.min(y1).min(y2);
            if w * w + h * h < MIN_CHORD_LENGTH_SQ {
                return true;
            }
        }
        let num = -dy * x1 + dx * y1 + (x0 * y2 - x2 * y0);
        num * num < denom2 * self.flatness_sq
    }

    fn cubic_flat_enough(&self, p: &[f64; 8]) -> bool {
        let [x0, y0, x1, y1, x2, y2, x3, y3] = *p;
        let dx = x3 - x0;
        let dy = y3 - y0;
        let denom2 = dx * dx + dy * dy;
        if denom2 > MAX_CHORD_LENGTH_SQ {
            return false;
        }
        if denom2 < MIN_CHORD_LENGTH_SQ {
            let w = x0.max(x1).max(x2).max(x3) - x0.min(x1).min(x2).min(x3);
            let h = y0.max(y1).max(y2).max(y3) - y0.min(y1).min(y2).min(y3);
            if w * w + h * h < MIN_CHORD_LENGTH_SQ {
                return true;
            }
        }
        let df2 = denom2 * self.flatness_sq;
        let cross = x0 * y3 - x3 * y0;
        let num1 = dx * y1 - dy * x1 + cross;
        if num1 * num1 > df2 {
            return false;
        }
        let num2 = dx * y2 - dy * x2 + cross;
        num2 * num2 < df2
    }

    /// Forward a join hint, except before the first segment of a subpath.
    fn join_hint<S: LineSink + ?Sized>(&mut self, out: &mut S) {
        if !std::mem::replace(&mut self.at_subpath_start, false) {
            out.line_join();
        }
    }

    fn flatten_quad<S: LineSink + ?Sized>(&mut self, out: &mut S, x1: f64, y1: f64, x2: f64, y2: f64) {
        let mut stack = std::mem::take(&mut self.quads);
        stack.push(([self.x0, self.y0, x1, y1, x2, y2], 0));
        while let Some((p, depth)) = stack.pop() {
            if depth >= self.max_depth || self.quad_flat_enough(&p) {
                out.line_to(p[2], p[3]);
                out.line_to(p[4], p[5]);
                continue;
            }
            let [x0, y0, x1, y1, x2, y2] = p;
            let x01 = (x0 + x1) / 2.0;
            let y01 = (y0 + y1) / 2.0;
            let x12 = (x1 + x2) / 2.0;
            let y12 = (y1 + y2) / 2.0;
            let x012 = (x01 + x12) / 2.0;
            let y012 = (y01 + y12) / 2.0;
            // right half first so the left half is emitted first
            stack.push(([x012, y012, x12, y12, x2, y2], depth + 1));
            stack.push(([x0, y0, x01, y01, x012, y012], depth + 1));
        }
        self.quads = stack;
        self.x0 = x2;
        self.y0 = y2;
    }

    #[allow(clippy::too_many_arguments)]
    fn flatten_cubic<S: LineSink + ?Sized>(
        &mut self,
        out: &mut S,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
    ) {
        let mut stack = std::mem::take(&mut self.cubics);
        stack.push(([self.x0, self.y0, x1, y1, x2, y2, x3, y3], 0));
        while let Some((p, depth)) = stack.pop() {
            if depth >= self.max_depth || self.cubic_flat_enough(&p) {
                out.line_to(p[2], p[3]);
                out.line_to(p[4], p[5]);
                out.line_to(p[6], p[7]);
                continue;
            }
            let [x0, y0, x1, y1, x2, y2, x3, y3] = p;
            let x01 = (x0 + x1) / 2.0;
            let y01 = (y0 + y1) / 2.0;
            let x12 = (x1 + x2) / 2.0;
            let y12 = (y1 + y2) / 2.0;
            let x23 = (x2 + x3) / 2.0;
            let y23 = (y2 + y3) / 2.0;
            let x012 = (x01 + x12) / 2.0;
            let y012 = (y01 + y12) / 2.0;
            let x123 = (x12 + x23) / 2.0;
            let y123 = (y12 + y23) / 2.0;
            let x0123 = (x012 + x123) / 2.0;
            let y0123 = (y012 + y123) / 2.0;
            stack.push(([x0123, y0123, x123, y123, x23, y23, x3, y3], depth + 1));
            stack.push(([x0, y0, x01, y01, x012, y012, x0123, y0123], depth + 1));
        }
        self.cubics = stack;
        self.x0 = x3;
        self.y0 = y3;
    }
}

impl<S: LineSink + ?Sized> LineStage<S> for Flattener {
    fn move_to(&mut self, out: &mut S, x0: f64, y0: f64) {
        out.move_to(x0, y0);
        self.x0 = x0;
        self.y0 = y0;
        self.at_subpath_start = true;
    }

    fn line_join(&mut self, out: &mut S) {
        out.line_join();
    }

    fn line_to(&mut self, out: &mut S, x1: f64, y1: f64) {
        self.join_hint(out);
        out.line_to(x1, y1);
        self.x0 = x1;
        self.y0 = y1;
    }

    fn close(&mut self, out: &mut S) {
        self.join_hint(out);
        out.close();
        self.at_subpath_start = true;
    }

    fn end(&mut self, out: &mut S) {
        out.end();
    }
}

impl<S: LineSink + ?Sized> PathStage<S> for Flattener {
    fn quad_to(&mut self, out: &mut S, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.join_hint(out);
        self.flatten_quad(out, x1, y1, x2, y2);
    }

    fn cubic_to(&mut self, out: &mut S, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.join_hint(out);
        self.flatten_cubic(out, x1, y1, x2, y2, x3, y3);
    }
}
