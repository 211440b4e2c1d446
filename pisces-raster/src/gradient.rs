//! Linear gradient paint.

use crate::color::Color;
use crate::math::{to_fixed, ONE};
use crate::style::CycleMethod;
use crate::transform::Affine;

/// Entries in the color lookup table.
const LUT_SIZE: usize = 256;

/// A color stop in a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Offset position (0.0 to 1.0).
    pub offset: f64,
    /// Color at this stop.
    pub color: Color,
}

/// Linear gradient from (x0, y0) to (x1, y1) in paint space.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    stops: Vec<GradientStop>,
    cycle: CycleMethod,
    lut: Vec<u32>,
    // gradient parameter as an affine function of device x, y
    tx: f64,
    ty: f64,
    t0: f64,
    degenerate: bool,
}

impl LinearGradient {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64, cycle: CycleMethod) -> Self {
        let mut gradient = Self {
            x0,
            y0,
            x1,
            y1,
            stops: Vec::new(),
            cycle,
            lut: vec![0; LUT_SIZE],
            tx: 0.0,
            ty: 0.0,
            t0: 0.0,
            degenerate: true,
        };
        gradient.set_transform(&Affine::identity());
        gradient
    }

    /// Add a color stop. Offsets are clamped to 0..=1; stops stay sorted,
    /// ties keeping insertion order.
    pub fn add_color_stop(&mut self, offset: f64, color: Color) {
        let offset = if offset.is_finite() {
            offset.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.stops.push(GradientStop { offset, color });
        self.stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        self.build_lut();
    }

    pub fn with_stop(mut self, offset: f64, color: Color) -> Self {
        self.add_color_stop(offset, color);
        self
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn cycle_method(&self) -> CycleMethod {
        self.cycle
    }

    /// Install the paint-to-device transform.
    pub fn set_transform(&mut self, transform: &Affine) {
        let dx = self.x1 - self.x0;
        let dy = self.y1 - self.y0;
        let len_sq = dx * dx + dy * dy;
        match transform.invert() {
            Some(inv) if len_sq > 0.0 => {
                self.tx = (inv.m00 * dx + inv.m10 * dy) / len_sq;
                self.ty = (inv.m01 * dx + inv.m11 * dy) / len_sq;
                self.t0 = ((inv.m02 - self.x0) * dx + (inv.m12 - self.y0) * dy) / len_sq;
                self.degenerate = false;
            }
            _ => self.degenerate = true,
        }
    }

    fn build_lut(&mut self) {
        let stops = &self.stops;
        for (i, entry) in self.lut.iter_mut().enumerate() {
            let t = i as f64 / (LUT_SIZE - 1) as f64;
            *entry = match stops.iter().position(|s| s.offset >= t) {
                None => stops.last().map_or(0, |s| s.color.to_argb()),
                Some(0) => stops[0].color.to_argb(),
                Some(k) => {
                    let (a, b) = (&stops[k - 1], &stops[k]);
                    let span = b.offset - a.offset;
                    let f = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
                    lerp_argb(a.color.to_argb(), b.color.to_argb(), f)
                }
            };
        }
    }

    /// Map a S15.16 gradient parameter to a LUT index.
    fn index(&self, t: i32) -> usize {
        let t = match self.cycle {
            CycleMethod::Pad => t.clamp(0, ONE - 1),
            CycleMethod::Repeat => t & (ONE - 1),
            CycleMethod::Reflect => {
                let t = t.rem_euclid(2 * ONE);
                if t >= ONE {
                    2 * ONE - 1 - t
                } else {
                    t
                }
            }
        };
        (t >> 8) as usize
    }

    pub(crate) fn shade_row(&self, x: i32, y: i32, out: &mut [u32]) {
        if self.degenerate {
            out.fill(self.lut[LUT_SIZE - 1]);
            return;
        }
        let mut t = to_fixed(self.tx * (x as f64 + 0.5) + self.ty * (y as f64 + 0.5) + self.t0);
        let dt = to_fixed(self.tx);
        for px in out {
            *px = self.lut[self.index(t)];
            t = t.saturating_add(dt);
        }
    }
}

fn lerp_argb(a: u32, b: u32, f: f64) -> u32 {
    let ca = a.to_be_bytes();
    let cb = b.to_be_bytes();
    let mut out = [0u8; 4];
    for i in 0..4 {
        let v = ca[i] as f64 + (cb[i] as f64 - ca[i] as f64) * f;
        out[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    u32::from_be_bytes(out)
}
