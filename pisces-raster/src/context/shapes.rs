//! Rectangle, oval, arc and rounded rectangle primitives for RenderContext.
//!
//! Every shape is emitted as plain sink commands. Strokes of mitered
//! rectangles, undashed ovals and undashed circular-cornered round rects are
//! built directly as a filled ring (outer contour plus reversed inner contour)
//! instead of going through the stroker.

use super::{Consumer, RenderContext};
use crate::error::RasterResult;
use crate::geometry::{ArcParams, RoundRectParams};
use crate::math::{eeq, ege, SQRT_TWO, ZERO};
use crate::sink::PathSink;
use crate::style::{ArcType, LineJoin, WindingRule};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Cubic control distance, as a fraction of the corner arc diameter, that
/// approximates a quarter ellipse.
const ACV: f64 = 0.22385762508460333;

fn emit_rect<S: PathSink + ?Sized>(sink: &mut S, x0: f64, y0: f64, x1: f64, y1: f64) {
    sink.move_to(x0, y0);
    sink.line_to(x1, y0);
    sink.line_to(x1, y1);
    sink.line_to(x0, y1);
    sink.close();
}

/// Line to each quarter-arc point, reflected into all four quadrants.
///
/// `points` holds interleaved x, y offsets from the center for one quadrant.
fn emit_quadrants<S: PathSink + ?Sized>(sink: &mut S, cx: f64, cy: f64, points: &[f64]) {
    let n = points.len() / 2;
    if n == 0 {
        return;
    }
    for (xs, ys) in [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)] {
        let forward = xs * ys > 0.0;
        for k in 0..n {
            let i = if forward { k } else { n - 1 - k };
            sink.line_to(cx + xs * points[2 * i], cy + ys * points[2 * i + 1]);
        }
    }
}

/// An ellipse with `np` points around, rounded down to a multiple of four
/// so the quadrants meet.
fn emit_oval<S: PathSink + ?Sized>(
    sink: &mut S,
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    np: i32,
    reverse: bool,
) {
    let quarter = (np >> 2).max(0) as usize;
    let n = (quarter * 4) as f64;
    let (mut a, step) = if reverse { (n - 1.0, -1.0) } else { (1.0, 1.0) };
    sink.move_to(cx + rx, cy);
    let mut points = Vec::with_capacity(quarter * 2);
    for _ in 0..quarter {
        let (sin, cos) = (a * TAU / n).sin_cos();
        points.push(rx * cos);
        points.push(ry * sin);
        a += step;
    }
    emit_quadrants(sink, cx, cy, &points);
    sink.close();
}

/// The outline of an ellipse offset outward (or inward) by a pen radius.
///
/// This is the exact boundary swept by a circular pen of radius `lw2`
/// along the ellipse, which is generally not an ellipse itself.
#[allow(clippy::too_many_arguments)]
fn emit_offset_oval<S: PathSink + ?Sized>(
    sink: &mut S,
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    lw2: f64,
    np: i32,
    inside: bool,
) {
    let quarter = (np >> 2).max(0) as usize;
    let (mut a, step) = if inside {
        ((quarter * 4) as f64 - 1.0, -1.0)
    } else {
        (1.0, 1.0)
    };
    sink.move_to(cx + rx + lw2 * step, cy);
    if quarter == 0 {
        sink.close();
        return;
    }
    let arc = FRAC_PI_2 / quarter as f64;
    let mut points = Vec::with_capacity(quarter * 2);
    for _ in 0..quarter {
        let (sin, cos) = (a * arc).sin_cos();
        let rx_sin = rx * sin;
        let ry_cos = ry * cos;
        let den = lw2 / (rx_sin * rx_sin + ry_cos * ry_cos).sqrt();
        points.push(cos * (rx + step * ry * den));
        points.push(sin * (ry + step * rx * den));
        a += step;
    }
    emit_quadrants(sink, cx, cy, &points);
    sink.close();
}

/// `np` points from `start` to `end` radians; y grows downward so angles
/// turn counterclockwise on screen.
#[allow(clippy::too_many_arguments)]
fn emit_arc<S: PathSink + ?Sized>(
    sink: &mut S,
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    start: f64,
    end: f64,
    np: i32,
) {
    let step = (end - start) / (np - 1) as f64;
    for i in 0..np {
        let (sin, cos) = (start + i as f64 * step).sin_cos();
        let (x, y) = (cx + rx * cos, cy - ry * sin);
        if i == 0 {
            sink.move_to(x, y);
        } else {
            sink.line_to(x, y);
        }
    }
}

/// A rounded rectangle starting on the left edge; `reverse` runs clockwise.
#[allow(clippy::too_many_arguments)]
fn emit_round_rect<S: PathSink + ?Sized>(
    sink: &mut S,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    aw: f64,
    ah: f64,
    reverse: bool,
) {
    let (xw, yh) = (x + w, y + h);
    let (aw2, ah2) = (aw / 2.0, ah / 2.0);
    let (cw, ch) = (ACV * aw, ACV * ah);

    sink.move_to(x, y + ah2);
    if reverse {
        sink.cubic_to(x, y + ch, x + cw, y, x + aw2, y);
        sink.line_to(xw - aw2, y);
        sink.cubic_to(xw - cw, y, xw, y + ch, xw, y + ah2);
        sink.line_to(xw, yh - ah2);
        sink.cubic_to(xw, yh - ch, xw - cw, yh, xw - aw2, yh);
        sink.line_to(x + aw2, yh);
        sink.cubic_to(x + cw, yh, x, yh - ch, x, yh - ah2);
    } else {
        sink.line_to(x, yh - ah2);
        sink.cubic_to(x, yh - ch, x + cw, yh, x + aw2, yh);
        sink.line_to(xw - aw2, yh);
        sink.cubic_to(xw - cw, yh, xw, yh - ch, xw, yh - ah2);
        sink.line_to(xw, y + ah2);
        sink.cubic_to(xw, y + ch, xw - cw, y, xw - aw2, y);
        sink.line_to(x + aw2, y);
        sink.cubic_to(x + cw, y, x, y + ch, x, y + ah2);
    }
    sink.close();
}

/// Most points spent on one ellipse, whatever its radius.
const MAX_ELLIPSE_POINTS: f64 = 4096.0;

/// Points used to approximate an ellipse with radii up to `r`.
fn point_count(r: f64) -> i32 {
    r.max(16.0).min(MAX_ELLIPSE_POINTS) as i32
}

impl RenderContext {
    /// Stroke a single segment.
    pub fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> RasterResult<()> {
        log::debug!(target: "pisces", "drawLine {} {} {} {}", x0, y0, x1, y1);
        self.render(Consumer::Stroke, None, WindingRule::NonZero, None, |s| {
            s.move_to(x0, y0);
            s.line_to(x1, y1);
        })
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> RasterResult<()> {
        log::debug!(target: "pisces", "fillRect {} {} {} {}", x, y, w, h);
        if w <= 0.0 || h <= 0.0 {
            return Ok(());
        }
        self.render(Consumer::Fill, None, WindingRule::NonZero, None, |s| {
            emit_rect(s, x, y, x + w, y + h)
        })
    }

    /// Stroke a rectangle outline.
    ///
    /// Undashed mitered strokes whose miter limit admits square corners are
    /// filled as two nested rectangles; the inner one is left out when the
    /// rectangle is not wider and taller than the line width.
    pub fn draw_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> RasterResult<()> {
        log::debug!(target: "pisces", "drawRect {} {} {} {}", x, y, w, h);
        if w <= 0.0 || h <= 0.0 {
            return Ok(());
        }
        let stroke = &self.state.stroke;
        if stroke.dash.is_none()
            && stroke.join == LineJoin::Miter
            && ege(stroke.miter_limit, SQRT_TWO)
        {
            let x0 = x + self.config.stroke_x_bias;
            let y0 = y + self.config.stroke_y_bias;
            let (x1, y1) = (x0 + w, y0 + h);
            let lw = stroke.width;
            let m = lw / 2.0;
            return self.render(Consumer::Fill, None, WindingRule::NonZero, None, |s| {
                emit_rect(s, x0 - m, y0 - m, x1 + m, y1 + m);
                if x1 - x0 > lw && y1 - y0 > lw {
                    s.move_to(x0 + m, y0 + m);
                    s.line_to(x0 + m, y1 - m);
                    s.line_to(x1 - m, y1 - m);
                    s.line_to(x1 - m, y0 + m);
                    s.close();
                }
            });
        }
        self.render(Consumer::Stroke, None, WindingRule::NonZero, None, |s| {
            emit_rect(s, x, y, x + w, y + h)
        })
    }

    pub fn fill_oval(&mut self, x: f64, y: f64, w: f64, h: f64) -> RasterResult<()> {
        log::debug!(target: "pisces", "fillOval {} {} {} {}", x, y, w, h);
        self.fill_or_draw_oval(x, y, w, h, false)
    }

    pub fn draw_oval(&mut self, x: f64, y: f64, w: f64, h: f64) -> RasterResult<()> {
        log::debug!(target: "pisces", "drawOval {} {} {} {}", x, y, w, h);
        self.fill_or_draw_oval(x, y, w, h, true)
    }

    fn fill_or_draw_oval(&mut self, x: f64, y: f64, w: f64, h: f64, hollow: bool) -> RasterResult<()> {
        if w <= 0.0 || h <= 0.0 {
            return Ok(());
        }
        let (w2, h2) = (w / 2.0, h / 2.0);
        let (mut cx, cy) = (x + w2, y + h2);
        let lw2 = if hollow { self.state.stroke.width / 2.0 } else { 0.0 };
        let (wl, hl) = (w2 + lw2, h2 + lw2);
        let np = point_count(wl.max(hl));

        if hollow && self.state.stroke.dash.is_some() {
            return self.render(Consumer::Stroke, None, WindingRule::NonZero, None, |s| {
                emit_oval(s, cx, cy, w2, h2, np, false)
            });
        }
        if !self.antialiasing() {
            cx += self.config.stroke_x_bias;
        }
        let circle = eeq(w, h);
        self.render(Consumer::Fill, None, WindingRule::NonZero, None, |s| {
            if circle {
                emit_oval(s, cx, cy, wl, hl, np, false);
            } else {
                emit_offset_oval(s, cx, cy, w2, h2, lw2, np, false);
            }
            if hollow && w2 - lw2 > 0.0 && h2 - lw2 > 0.0 {
                if circle {
                    emit_oval(s, cx, cy, w2 - lw2, h2 - lw2, np, true);
                } else {
                    emit_offset_oval(s, cx, cy, w2, h2, lw2, np, true);
                }
            }
        })
    }

    pub fn fill_arc(&mut self, arc: &ArcParams) -> RasterResult<()> {
        log::debug!(target: "pisces", "fillArc {:?}", arc);
        self.fill_or_draw_arc(arc, false)
    }

    pub fn draw_arc(&mut self, arc: &ArcParams) -> RasterResult<()> {
        log::debug!(target: "pisces", "drawArc {:?}", arc);
        self.fill_or_draw_arc(arc, true)
    }

    fn fill_or_draw_arc(&mut self, arc: &ArcParams, stroke: bool) -> RasterResult<()> {
        if arc.width < ZERO || arc.height < ZERO {
            return Ok(());
        }
        let (w2, h2) = (arc.width / 2.0, arc.height / 2.0);
        let (cx, cy) = (arc.x + w2, arc.y + h2);
        let start = arc.start_angle.to_radians();
        let end = start + arc.arc_angle.to_radians();
        let np = point_count(w2.max(h2));
        let arc_type = arc.arc_type;
        let consumer = if stroke { Consumer::Stroke } else { Consumer::Fill };

        self.render(consumer, None, WindingRule::NonZero, None, |s| {
            emit_arc(s, cx, cy, w2, h2, start, end, np);
            if arc_type == ArcType::Pie {
                s.line_to(cx, cy);
            }
            if !stroke || arc_type != ArcType::Open {
                s.close();
            }
        })
    }

    pub fn fill_round_rect(&mut self, rect: &RoundRectParams) -> RasterResult<()> {
        log::debug!(target: "pisces", "fillRoundRect {:?}", rect);
        self.fill_or_draw_round_rect(rect, false)
    }

    pub fn draw_round_rect(&mut self, rect: &RoundRectParams) -> RasterResult<()> {
        log::debug!(target: "pisces", "drawRoundRect {:?}", rect);
        self.fill_or_draw_round_rect(rect, true)
    }

    fn fill_or_draw_round_rect(&mut self, rect: &RoundRectParams, stroke: bool) -> RasterResult<()> {
        let RoundRectParams {
            x,
            y,
            width: w,
            height: h,
            ..
        } = *rect;
        if w < ZERO || h < ZERO {
            return Ok(());
        }
        let aw = rect.arc_width.abs().min(w);
        let ah = rect.arc_height.abs().min(h);

        if stroke && self.state.stroke.dash.is_none() && eeq(aw, ah) {
            let lw = self.state.stroke.width;
            let lw2 = lw / 2.0;
            let x = x + self.config.stroke_x_bias;
            let y = y + self.config.stroke_y_bias;
            return self.render(Consumer::Fill, None, WindingRule::NonZero, None, |s| {
                emit_round_rect(s, x - lw2, y - lw2, w + lw, h + lw, aw + lw, ah + lw, false);
                let (iw, ih) = (w - lw, h - lw);
                if iw > 0.0 && ih > 0.0 {
                    emit_round_rect(s, x + lw2, y + lw2, iw, ih, aw - lw, ah - lw, true);
                }
            });
        }
        let consumer = if stroke { Consumer::Stroke } else { Consumer::Fill };
        self.render(consumer, None, WindingRule::NonZero, None, |s| {
            emit_round_rect(s, x, y, w, h, aw, ah, false)
        })
    }
}
