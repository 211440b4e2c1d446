//! Centerline to outline conversion.
//!
//! The stroker receives device-space line segments (curves are flattened
//! upstream) and emits a closed polygon per subpath that the fill rasterizer
//! can consume directly. One side of the offset outline is emitted as it is
//! produced; the other side is buffered in `reverse` and replayed backwards
//! when the subpath is finished or closed.
//!
//! Pen offsets are computed through the linear part of the transform that was
//! applied to the incoming points, so a circular pen in user space stays an
//! ellipse of the right shape in device space.

use crate::math::eeq;
use crate::sink::{LineSink, LineStage};
use crate::style::{LineCap, LineJoin};
use crate::transform::Affine;
use std::f64::consts::PI;

/// Squared device distance below which two offsets are treated as the same
/// direction for an explicit round join.
const ROUND_JOIN_THRESHOLD: f64 = 1.0e3 / 4_294_967_296.0;

/// Same, for the implicit joins between pieces of a flattened curve.
const ROUND_JOIN_INTERNAL_THRESHOLD: f64 = 1.0e9 / 4_294_967_296.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    MoveTo,
    LineTo,
    Close,
}

/// Pipeline stage turning a centerline into a fillable outline.
#[derive(Debug, Clone)]
pub struct Stroker {
    cap: LineCap,
    join: LineJoin,

    m00: f64,
    m01: f64,
    m10: f64,
    m11: f64,
    m00_2_m01_2: f64,
    m10_2_m11_2: f64,
    m00_m10_m01_m11: f64,
    det: f64,

    lw2: f64,
    scaled_lw2: f64,
    miter_limit_sq: f64,

    pen: Vec<(f64, f64)>,
    pen_included: Vec<bool>,
    join_points: Vec<(f64, f64)>,
    reverse: Vec<(f64, f64)>,

    prev: Prev,
    started: bool,
    line_to_origin: bool,
    join_to_origin: bool,
    join_segment: bool,

    sx0: f64,
    sy0: f64,
    sx1: f64,
    sy1: f64,
    x0: f64,
    y0: f64,
    px0: f64,
    py0: f64,
    mx0: f64,
    my0: f64,
    omx: f64,
    omy: f64,
}

impl Stroker {
    pub fn new(
        line_width: f64,
        cap: LineCap,
        join: LineJoin,
        miter_limit: f64,
        transform: &Affine,
    ) -> Self {
        let mut stroker = Self {
            cap,
            join,
            m00: 1.0,
            m01: 0.0,
            m10: 0.0,
            m11: 1.0,
            m00_2_m01_2: 1.0,
            m10_2_m11_2: 1.0,
            m00_m10_m01_m11: 0.0,
            det: 1.0,
            lw2: 0.5,
            scaled_lw2: 0.5,
            miter_limit_sq: 0.0,
            pen: Vec::new(),
            pen_included: Vec::new(),
            join_points: Vec::new(),
            reverse: Vec::with_capacity(50),
            prev: Prev::Close,
            started: false,
            line_to_origin: false,
            join_to_origin: false,
            join_segment: false,
            sx0: 0.0,
            sy0: 0.0,
            sx1: 0.0,
            sy1: 0.0,
            x0: 0.0,
            y0: 0.0,
            px0: 0.0,
            py0: 0.0,
            mx0: 0.0,
            my0: 0.0,
            omx: 0.0,
            omy: 0.0,
        };
        stroker.set_parameters(line_width, cap, join, miter_limit, transform);
        stroker
    }

    /// Reconfigure the pen and reset all per-subpath state.
    pub fn set_parameters(
        &mut self,
        line_width: f64,
        cap: LineCap,
        join: LineJoin,
        miter_limit: f64,
        transform: &Affine,
    ) {
        self.cap = cap;
        self.join = join;
        self.lw2 = line_width / 2.0;
        self.scaled_lw2 = transform.m00 * self.lw2;

        self.m00 = transform.m00;
        self.m01 = transform.m01;
        self.m10 = transform.m10;
        self.m11 = transform.m11;
        self.m00_2_m01_2 = self.m00 * self.m00 + self.m01 * self.m01;
        self.m10_2_m11_2 = self.m10 * self.m10 + self.m11 * self.m11;
        self.m00_m10_m01_m11 = self.m00 * self.m10 + self.m01 * self.m11;
        self.det = transform.determinant();

        if join == LineJoin::Miter {
            let limit = miter_limit * self.lw2 * self.det;
            self.miter_limit_sq = limit * limit;
        }

        let segments = (PI * line_width).max(0.0) as usize;
        self.pen.clear();
        for i in 0..segments {
            let theta = i as f64 * 2.0 * PI / segments as f64;
            let (sin, cos) = theta.sin_cos();
            self.pen.push((
                self.lw2 * (self.m00 * cos + self.m01 * sin),
                self.lw2 * (self.m10 * cos + self.m11 * sin),
            ));
        }
        self.pen_included.resize(segments, false);

        self.prev = Prev::Close;
        self.reverse.clear();
        self.started = false;
        self.line_to_origin = false;
    }

    /// Number of vertices of the pen polygon.
    pub fn pen_segments(&self) -> usize {
        self.pen.len()
    }

    fn compute_offset(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> (f64, f64) {
        let lx = x1 - x0;
        let ly = y1 - y0;

        if self.m00 > 0.0 && self.m00 == self.m11 && self.m01 == 0.0 && self.m10 == 0.0 {
            let len = lx.hypot(ly);
            if len == 0.0 {
                (0.0, 0.0)
            } else {
                (ly * self.scaled_lw2 / len, -(lx * self.scaled_lw2) / len)
            }
        } else {
            let sdet = if self.det > 0.0 { 1.0 } else { -1.0 };
            let a = ly * self.m00 - lx * self.m10;
            let b = ly * self.m01 - lx * self.m11;
            let dh = a.hypot(b);
            if dh == 0.0 {
                return (0.0, 0.0);
            }
            let div = sdet * self.lw2 / dh;
            let ddx = ly * self.m00_2_m01_2 - lx * self.m00_m10_m01_m11;
            let ddy = ly * self.m00_m10_m01_m11 - lx * self.m10_2_m11_2;
            (ddx * div, ddy * div)
        }
    }

    /// Emit forward, or queue on the reverse side.
    fn emit<S: LineSink + ?Sized>(&mut self, out: &mut S, x: f64, y: f64, rev: bool) {
        if rev {
            self.reverse.push((x, y));
        } else {
            out.line_to(x, y);
        }
    }

    fn flush_reverse<S: LineSink + ?Sized>(&mut self, out: &mut S) {
        for &(x, y) in self.reverse.iter().rev() {
            out.line_to(x, y);
        }
    }

    /// Collect the pen vertices between offsets `a` and `b` into `join_points`.
    ///
    /// Joins take the arc on the far side of the chord from the center. Caps
    /// take the vertices on the negative side of the chord.
    #[allow(clippy::too_many_arguments)]
    fn compute_round_join(
        &mut self,
        cx: f64,
        cy: f64,
        xa: f64,
        ya: f64,
        xb: f64,
        yb: f64,
        cap: bool,
    ) {
        self.join_points.clear();
        let n = self.pen.len();
        if n == 0 {
            return;
        }

        let center_side = cap || side(cx, cy, xa, ya, xb, yb);
        for (i, &(dx, dy)) in self.pen.iter().enumerate() {
            self.pen_included[i] = side(cx + dx, cy + dy, xa, ya, xb, yb) != center_side;
        }

        let mut start = None;
        let mut end = None;
        for i in 0..n {
            if self.pen_included[i] {
                if !self.pen_included[(i + n - 1) % n] {
                    start = Some(i);
                }
                if !self.pen_included[(i + 1) % n] {
                    end = Some(i);
                }
            }
        }
        let (Some(start), Some(mut end)) = (start, end) else {
            return;
        };
        if end < start {
            end += n;
        }

        let (sdx, sdy) = self.pen[start];
        let dxa = cx + sdx - xa;
        let dya = cy + sdy - ya;
        let dxb = cx + sdx - xb;
        let dyb = cy + sdy - yb;
        let rev = dxa * dxa + dya * dya > dxb * dxb + dyb * dyb;

        for k in 0..=(end - start) {
            let i = if rev { end - k } else { start + k };
            let (dx, dy) = self.pen[i % n];
            self.join_points.push((cx + dx, cy + dy));
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_round_join<S: LineSink + ?Sized>(
        &mut self,
        out: &mut S,
        x: f64,
        y: f64,
        (mut omx, mut omy): (f64, f64),
        (mut mx, mut my): (f64, f64),
        cap: bool,
        rev: bool,
        threshold: f64,
    ) {
        if (omx == 0.0 && omy == 0.0) || (mx == 0.0 && my == 0.0) {
            return;
        }
        let domx = omx - mx;
        let domy = omy - my;
        if domx * domx + domy * domy < threshold {
            return;
        }
        if rev {
            omx = -omx;
            omy = -omy;
            mx = -mx;
            my = -my;
        }
        self.compute_round_join(x, y, x + omx, y + omy, x + mx, y + my, cap);
        for i in 0..self.join_points.len() {
            let (px, py) = self.join_points[i];
            self.emit(out, px, py, rev);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_miter<S: LineSink + ?Sized>(
        &mut self,
        out: &mut S,
        (px0, py0): (f64, f64),
        (x0, y0): (f64, f64),
        (x1, y1): (f64, f64),
        (mut omx, mut omy): (f64, f64),
        (mut mx, mut my): (f64, f64),
        rev: bool,
    ) {
        if (mx == omx && my == omy) || (px0 == x0 && py0 == y0) || (x0 == x1 && y0 == y1) {
            return;
        }
        if rev {
            omx = -omx;
            omy = -omy;
            mx = -mx;
            my = -my;
        }
        let (mitx, mity) = compute_miter(
            (px0 + omx, py0 + omy),
            (x0 + omx, y0 + omy),
            (x0 + mx, y0 + my),
            (x1 + mx, y1 + my),
        );
        // miter length in user units
        let dx = mitx - x0;
        let dy = mity - y0;
        let a = dy * self.m00 - dx * self.m10;
        let b = dy * self.m01 - dx * self.m11;
        if a * a + b * b < self.miter_limit_sq {
            self.emit(out, mitx, mity, rev);
        }
    }

    /// Explicit join at (x0, y0), or an internal round join between flattened pieces.
    #[allow(clippy::too_many_arguments)]
    fn draw_join<S: LineSink + ?Sized>(
        &mut self,
        out: &mut S,
        explicit: bool,
        p0: (f64, f64),
        x: (f64, f64),
        x1: (f64, f64),
        om: (f64, f64),
        m: (f64, f64),
        ccw: bool,
    ) {
        if explicit {
            match self.join {
                LineJoin::Miter => self.draw_miter(out, p0, x, x1, om, m, ccw),
                LineJoin::Round => {
                    self.draw_round_join(out, x.0, x.1, om, m, false, ccw, ROUND_JOIN_THRESHOLD)
                }
                LineJoin::Bevel => {}
            }
        } else {
            self.draw_round_join(
                out,
                x.0,
                x.1,
                om,
                m,
                false,
                ccw,
                ROUND_JOIN_INTERNAL_THRESHOLD,
            );
        }
    }

    fn line_to_impl<S: LineSink + ?Sized>(&mut self, out: &mut S, x1: f64, y1: f64, join: bool) {
        let (mx, my) = self.compute_offset(self.x0, self.y0, x1, y1);
        let (x0, y0) = (self.x0, self.y0);

        if !self.started {
            out.move_to(x0 + mx, y0 + my);
            self.sx1 = x1;
            self.sy1 = y1;
            self.mx0 = mx;
            self.my0 = my;
            self.started = true;
        } else {
            let p0 = (self.px0, self.py0);
            let ccw = is_ccw(p0.0, p0.1, x0, y0, x1, y1);
            let om = (self.omx, self.omy);
            self.draw_join(out, join, p0, (x0, y0), (x1, y1), om, (mx, my), ccw);
            self.emit(out, x0, y0, !ccw);
        }

        out.line_to(x0 + mx, y0 + my);
        out.line_to(x1 + mx, y1 + my);
        self.reverse.push((x0 - mx, y0 - my));
        self.reverse.push((x1 - mx, y1 - my));

        self.omx = mx;
        self.omy = my;
        self.px0 = x0;
        self.py0 = y0;
        self.x0 = x1;
        self.y0 = y1;
        self.prev = Prev::LineTo;
    }

    /// User-space length of a device vector.
    fn line_length(&self, ldx: f64, ldy: f64) -> f64 {
        let la = (ldy * self.m00 - ldx * self.m10) / self.det;
        let lb = (ldy * self.m01 - ldx * self.m11) / self.det;
        la.hypot(lb)
    }

    /// Scale factor extending a vector of this device length by half a line width.
    fn cap_scale(&self, ldx: f64, ldy: f64) -> f64 {
        let len = self.line_length(ldx, ldy);
        if len > 0.0 && len.is_finite() {
            self.lw2 / len
        } else {
            0.0
        }
    }

    /// Cap both ends of an open subpath and close its outline.
    fn finish<S: LineSink + ?Sized>(&mut self, out: &mut S) {
        let (x0, y0) = (self.x0, self.y0);
        let (omx, omy) = (self.omx, self.omy);
        match self.cap {
            LineCap::Round => self.draw_round_join(
                out,
                x0,
                y0,
                (omx, omy),
                (-omx, -omy),
                true,
                false,
                ROUND_JOIN_THRESHOLD,
            ),
            LineCap::Square => {
                let ldx = self.px0 - x0;
                let ldy = self.py0 - y0;
                let s = self.cap_scale(ldx, ldy);
                let capx = x0 - ldx * s;
                let capy = y0 - ldy * s;
                out.line_to(capx + omx, capy + omy);
                out.line_to(capx - omx, capy - omy);
            }
            LineCap::Butt => {}
        }

        self.flush_reverse(out);

        let (sx0, sy0) = (self.sx0, self.sy0);
        let (mx0, my0) = (self.mx0, self.my0);
        match self.cap {
            LineCap::Round => self.draw_round_join(
                out,
                sx0,
                sy0,
                (-mx0, -my0),
                (mx0, my0),
                true,
                false,
                ROUND_JOIN_THRESHOLD,
            ),
            LineCap::Square => {
                let ldx = self.sx1 - sx0;
                let ldy = self.sy1 - sy0;
                let s = self.cap_scale(ldx, ldy);
                let capx = sx0 - ldx * s;
                let capy = sy0 - ldy * s;
                out.line_to(capx - mx0, capy - my0);
                out.line_to(capx + mx0, capy + my0);
            }
            LineCap::Butt => {}
        }

        out.close();
        self.join_segment = false;
    }

    fn flush_line_to_origin<S: LineSink + ?Sized>(&mut self, out: &mut S) {
        if self.line_to_origin {
            let (sx0, sy0, join) = (self.sx0, self.sy0, self.join_to_origin);
            self.line_to_impl(out, sx0, sy0, join);
            self.line_to_origin = false;
        }
    }
}

impl<S: LineSink + ?Sized> LineStage<S> for Stroker {
    fn move_to(&mut self, out: &mut S, x0: f64, y0: f64) {
        self.flush_line_to_origin(out);
        if self.prev == Prev::LineTo {
            self.finish(out);
        }
        self.sx0 = x0;
        self.x0 = x0;
        self.sy0 = y0;
        self.y0 = y0;
        self.reverse.clear();
        self.started = false;
        self.join_segment = false;
        self.prev = Prev::MoveTo;
    }

    fn line_join(&mut self, _out: &mut S) {
        self.join_segment = true;
    }

    fn line_to(&mut self, out: &mut S, x1: f64, y1: f64) {
        if self.line_to_origin {
            if eeq(x1, self.sx0) && eeq(y1, self.sy0) {
                // still sitting on the start point
                return;
            }
            self.flush_line_to_origin(out);
        } else if eeq(x1, self.x0) && eeq(y1, self.y0) {
            return;
        } else if eeq(x1, self.sx0) && eeq(y1, self.sy0) {
            // might be the closing segment; decided by the next command
            self.line_to_origin = true;
            self.join_to_origin = self.join_segment;
            self.join_segment = false;
            return;
        }

        let join = self.join_segment;
        self.line_to_impl(out, x1, y1, join);
        self.join_segment = false;
    }

    fn close(&mut self, out: &mut S) {
        self.line_to_origin = false;
        if !self.started {
            return;
        }

        let (x0, y0) = (self.x0, self.y0);
        let (sx0, sy0) = (self.sx0, self.sy0);
        let (sx1, sy1) = (self.sx1, self.sy1);
        let m = self.compute_offset(x0, y0, sx0, sy0);
        let m0 = (self.mx0, self.my0);
        let (mx, my) = m;
        let (mx0, my0) = m0;

        // penultimate join, at the last point before the start
        let p0 = (self.px0, self.py0);
        let ccw = is_ccw(p0.0, p0.1, x0, y0, sx0, sy0);
        let om = (self.omx, self.omy);
        let explicit = self.join_segment;
        self.draw_join(out, explicit, p0, (x0, y0), (sx0, sy0), om, m, ccw);

        out.line_to(x0 + mx, y0 + my);
        out.line_to(sx0 + mx, sy0 + my);

        // final join at the start point, outside first
        let ccw = is_ccw(x0, y0, sx0, sy0, sx1, sy1);
        if !ccw {
            match self.join {
                LineJoin::Miter => {
                    self.draw_miter(out, (x0, y0), (sx0, sy0), (sx1, sy1), m, m0, false)
                }
                LineJoin::Round => self.draw_round_join(
                    out,
                    sx0,
                    sy0,
                    m,
                    m0,
                    false,
                    false,
                    ROUND_JOIN_THRESHOLD,
                ),
                LineJoin::Bevel => {}
            }
        }

        out.line_to(sx0 + mx0, sy0 + my0);
        out.line_to(sx0 - mx0, sy0 - my0);

        if ccw {
            match self.join {
                LineJoin::Miter => self.draw_miter(
                    out,
                    (x0, y0),
                    (sx0, sy0),
                    (sx1, sy1),
                    (-mx, -my),
                    (-mx0, -my0),
                    false,
                ),
                LineJoin::Round => self.draw_round_join(
                    out,
                    sx0,
                    sy0,
                    (-mx, -my),
                    (-mx0, -my0),
                    false,
                    false,
                    ROUND_JOIN_THRESHOLD,
                ),
                LineJoin::Bevel => {}
            }
        }

        out.line_to(sx0 - mx, sy0 - my);
        out.line_to(x0 - mx, y0 - my);
        self.flush_reverse(out);

        self.join_segment = false;
        self.prev = Prev::Close;
        out.close();

        // a following line_to starts a fresh outline from the subpath start
        self.reverse.clear();
        self.started = false;
        self.x0 = sx0;
        self.y0 = sy0;
    }

    fn end(&mut self, out: &mut S) {
        self.flush_line_to_origin(out);
        if self.prev == Prev::LineTo {
            self.finish(out);
        }
        out.end();
        self.join_segment = false;
        self.prev = Prev::MoveTo;
    }
}

/// True when the turn p0 -> p1 -> p2 is counter-clockwise in device space (y down).
fn is_ccw(x0: f64, y0: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
    let dx0 = x1 - x0;
    let dy0 = y1 - y0;
    let dx1 = x2 - x1;
    let dy1 = y2 - y1;
    dx0 * dy1 < dy0 * dx1
}

/// Half-plane test of (x, y) against the line through (x0, y0) and (x1, y1).
fn side(x: f64, y: f64, x0: f64, y0: f64, x1: f64, y1: f64) -> bool {
    0.0 < (y0 - y1) * x + (x1 - x0) * y + (x0 * y1 - x1 * y0)
}

/// Intersection of the lines a0-a1 and b0-b1, or `a0` when parallel.
fn compute_miter(
    (x0, y0): (f64, f64),
    (x1, y1): (f64, f64),
    (x0p, y0p): (f64, f64),
    (x1p, y1p): (f64, f64),
) -> (f64, f64) {
    let x10 = x1 - x0;
    let y10 = y1 - y0;
    let x10p = x1p - x0p;
    let y10p = y1p - y0p;

    let den = x10 * y10p - x10p * y10;
    if den == 0.0 {
        return (x0, y0);
    }
    let t = x1p * (y0 - y0p) - x0 * y10p + x0p * (y1p - y0);
    (x0 + t * x10 / den, y0 + t * y10 / den)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{Chain, PathCommand, PathRecorder};
    use rstest::rstest;

    fn stroke(
        width: f64,
        cap: LineCap,
        join: LineJoin,
        t: &Affine,
        f: impl FnOnce(&mut dyn LineSink),
    ) -> PathRecorder {
        let mut stroker = Stroker::new(width, cap, join, 10.0, t);
        let mut rec = PathRecorder::new();
        {
            let mut chain = Chain::new(&mut stroker, &mut rec);
            f(&mut chain);
        }
        rec
    }

    fn points(rec: &PathRecorder) -> Vec<(f64, f64)> {
        rec.commands.iter().filter_map(|c| c.end_point()).collect()
    }

    fn extent(rec: &PathRecorder) -> (f64, f64, f64, f64) {
        points(rec).iter().fold(
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        )
    }

    fn has_point(rec: &PathRecorder, x: f64, y: f64) -> bool {
        points(rec)
            .iter()
            .any(|&(px, py)| (px - x).abs() < 1e-9 && (py - y).abs() < 1e-9)
    }

    fn square(s: &mut dyn LineSink) {
        s.move_to(0.0, 0.0);
        s.line_to(10.0, 0.0);
        s.line_join();
        s.line_to(10.0, 10.0);
        s.line_join();
        s.line_to(0.0, 10.0);
        s.line_join();
        s.line_to(0.0, 0.0);
        s.line_join();
        s.close();
        s.end();
    }

    #[test]
    fn test_butt_line_outline() {
        let rec = stroke(2.0, LineCap::Butt, LineJoin::Miter, &Affine::identity(), |s| {
            s.move_to(0.0, 0.0);
            s.line_to(10.0, 0.0);
            s.end();
        });
        assert_eq!(
            rec.commands,
            vec![
                PathCommand::MoveTo(0.0, -1.0),
                PathCommand::LineTo(0.0, -1.0),
                PathCommand::LineTo(10.0, -1.0),
                PathCommand::LineTo(10.0, 1.0),
                PathCommand::LineTo(0.0, 1.0),
                PathCommand::Close,
                PathCommand::End,
            ]
        );
    }

    #[test]
    fn test_square_cap_extends_both_ends() {
        let rec = stroke(2.0, LineCap::Square, LineJoin::Miter, &Affine::identity(), |s| {
            s.move_to(0.0, 0.0);
            s.line_to(10.0, 0.0);
            s.end();
        });
        assert_eq!(extent(&rec), (-1.0, -1.0, 11.0, 1.0));
    }

    #[test]
    fn test_round_cap_adds_pen_points() {
        let butt = stroke(8.0, LineCap::Butt, LineJoin::Round, &Affine::identity(), |s| {
            s.move_to(0.0, 0.0);
            s.line_to(10.0, 0.0);
            s.end();
        });
        let round = stroke(8.0, LineCap::Round, LineJoin::Round, &Affine::identity(), |s| {
            s.move_to(0.0, 0.0);
            s.line_to(10.0, 0.0);
            s.end();
        });
        assert!(round.commands.len() > butt.commands.len());
        let (x0, _, x1, _) = extent(&round);
        assert!(x0 < -3.5 && x1 > 13.5);
        // round cap points stay on the pen circle
        for (x, y) in points(&round) {
            let cx = x.clamp(0.0, 10.0);
            assert!(((x - cx).hypot(y) - 4.0).abs() < 1e-9 || y.abs() == 4.0);
        }
    }

    #[test]
    fn test_closed_square_miter_outline() {
        let rec = stroke(2.0, LineCap::Butt, LineJoin::Miter, &Affine::identity(), square);
        assert_eq!(extent(&rec), (-1.0, -1.0, 11.0, 11.0));
        for (x, y) in [(-1.0, -1.0), (11.0, -1.0), (11.0, 11.0), (-1.0, 11.0)] {
            assert!(has_point(&rec, x, y), "missing outer corner ({}, {})", x, y);
        }
        // nothing lands in the hole
        assert!(points(&rec)
            .iter()
            .all(|&(x, y)| !(x > 1.0 && x < 9.0 && y > 1.0 && y < 9.0)));
        let subpaths = rec.subpaths();
        assert_eq!(subpaths.len(), 1);
        assert_eq!(subpaths[0].last(), Some(&PathCommand::Close));
    }

    #[test]
    fn test_bevel_has_no_miter_point() {
        let rec = stroke(2.0, LineCap::Butt, LineJoin::Bevel, &Affine::identity(), square);
        assert!(!has_point(&rec, 11.0, -1.0));
        assert!(has_point(&rec, 11.0, 0.0));
    }

    #[test]
    fn test_miter_limit_drops_sharp_spike() {
        let spike = |s: &mut dyn LineSink| {
            s.move_to(0.0, 0.0);
            s.line_to(100.0, 0.0);
            s.line_join();
            s.line_to(0.0, 1.0);
            s.end();
        };
        let mut stroker = Stroker::new(2.0, LineCap::Butt, LineJoin::Miter, 2.0, &Affine::identity());
        let mut rec = PathRecorder::new();
        spike(&mut Chain::new(&mut stroker, &mut rec));
        let (_, _, x1, _) = extent(&rec);
        assert!(x1 < 102.0, "miter spike not limited: {}", x1);
    }

    #[rstest]
    #[case(LineJoin::Miter)]
    #[case(LineJoin::Round)]
    #[case(LineJoin::Bevel)]
    fn test_closed_input_gives_closed_outline(#[case] join: LineJoin) {
        let rec = stroke(3.0, LineCap::Round, join, &Affine::identity(), |s| {
            s.move_to(0.0, 0.0);
            s.line_to(20.0, 5.0);
            s.line_join();
            s.line_to(5.0, 20.0);
            s.line_join();
            s.close();
            s.move_to(40.0, 40.0);
            s.line_to(50.0, 40.0);
            s.line_join();
            s.line_to(45.0, 50.0);
            s.line_join();
            s.close();
            s.end();
        });
        for subpath in rec.subpaths() {
            assert_eq!(subpath.last(), Some(&PathCommand::Close));
            assert_eq!(
                subpath.iter().filter(|c| **c == PathCommand::Close).count(),
                1
            );
        }
        assert_eq!(rec.commands.last(), Some(&PathCommand::End));
    }

    #[test]
    fn test_degenerate_input_is_absorbed() {
        let rec = stroke(2.0, LineCap::Round, LineJoin::Round, &Affine::identity(), |s| {
            s.move_to(5.0, 5.0);
            s.line_to(5.0, 5.0);
            s.close();
            s.end();
        });
        assert_eq!(rec.commands, vec![PathCommand::End]);
    }

    #[test]
    fn test_line_back_to_start_then_away_is_not_a_close() {
        let rec = stroke(2.0, LineCap::Butt, LineJoin::Bevel, &Affine::identity(), |s| {
            s.move_to(0.0, 0.0);
            s.line_to(10.0, 0.0);
            s.line_to(0.0, 0.0);
            s.line_to(0.0, 10.0);
            s.end();
        });
        // the deferred segment back to the origin is drawn before continuing
        assert!(has_point(&rec, 0.0, 1.0) || has_point(&rec, 0.0, -1.0));
        let (_, _, _, y1) = extent(&rec);
        assert_eq!(y1, 10.0);
    }

    #[test]
    fn test_offset_under_non_uniform_scale() {
        let t = Affine::from_scale(2.0, 1.0);
        let stroker = Stroker::new(2.0, LineCap::Butt, LineJoin::Miter, 10.0, &t);
        // vertical device line: pen half-width 1 user unit is 2 device units in x
        let (dx, dy) = stroker.compute_offset(0.0, 0.0, 0.0, 10.0);
        assert!((dx - 2.0).abs() < 1e-12 && dy.abs() < 1e-12);
        let (dx, dy) = stroker.compute_offset(0.0, 0.0, 10.0, 0.0);
        assert!(dx.abs() < 1e-12 && (dy + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pen_segment_count() {
        let stroker = Stroker::new(10.0, LineCap::Round, LineJoin::Round, 10.0, &Affine::identity());
        assert_eq!(stroker.pen_segments(), 31);
    }

    #[test]
    fn test_compute_miter_intersection() {
        let m = compute_miter((0.0, -1.0), (10.0, -1.0), (11.0, 0.0), (11.0, 10.0));
        assert!((m.0 - 11.0).abs() < 1e-12 && (m.1 + 1.0).abs() < 1e-12);
        assert_eq!(compute_miter((0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)), (0.0, 0.0));
    }
}
