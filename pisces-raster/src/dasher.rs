//! Dash pattern stage.
//!
//! Sits after the flattener, so it only ever sees straight segments. Dash
//! lengths are measured in user space: segment lengths are pulled back through
//! the inverse of the linear part of the active transform.

use crate::error::{RasterError, RasterResult};
use crate::math::z1;
use crate::sink::{LineSink, LineStage};
use crate::transform::Affine;

/// A validated dash array and phase.
#[derive(Debug, Clone, PartialEq)]
pub struct Dash {
    array: Vec<f64>,
    phase: f64,
}

impl Dash {
    /// Alternating on/off lengths starting with "on", and the distance into the
    /// pattern at which each subpath starts.
    pub fn new(array: Vec<f64>, phase: f64) -> RasterResult<Self> {
        if !(phase >= 0.0) || !phase.is_finite() {
            return Err(RasterError::InvalidArgument(format!(
                "Dash phase must be finite and >= 0, got {}",
                phase
            )));
        }
        if array.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(RasterError::InvalidArgument(
                "Dash lengths must be finite and >= 0".to_string(),
            ));
        }
        if !array.iter().any(|d| *d > 0.0) {
            return Err(RasterError::InvalidArgument(
                "Dash array must contain a positive length".to_string(),
            ));
        }
        Ok(Self { array, phase })
    }

    pub fn array(&self) -> &[f64] {
        &self.array
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }
}

/// Pipeline stage splitting lines into dashes.
#[derive(Debug, Clone)]
pub struct Dasher {
    dash: Vec<f64>,
    start_phase: f64,
    start_idx: usize,
    idx: usize,
    phase: f64,
    sx: f64,
    sy: f64,
    x0: f64,
    y0: f64,
    m00: f64,
    m01: f64,
    m10: f64,
    m11: f64,
    det: f64,
    symmetric: bool,
    first_dash_on: bool,
    starting: bool,
    sx1: f64,
    sy1: f64,
}

impl Dasher {
    pub fn new(dash: &Dash, transform: &Affine) -> Self {
        let mut dasher = Self {
            dash: Vec::new(),
            start_phase: 0.0,
            start_idx: 0,
            idx: 0,
            phase: 0.0,
            sx: 0.0,
            sy: 0.0,
            x0: 0.0,
            y0: 0.0,
            m00: 1.0,
            m01: 0.0,
            m10: 0.0,
            m11: 1.0,
            det: 1.0,
            symmetric: true,
            first_dash_on: false,
            starting: false,
            sx1: 0.0,
            sy1: 0.0,
        };
        dasher.set_parameters(dash, transform);
        dasher
    }

    /// Install a new pattern and transform.
    ///
    /// The phase is normalised here by walking whole dash entries, so every
    /// subpath starts inside entry `start_idx`.
    pub fn set_parameters(&mut self, dash: &Dash, transform: &Affine) {
        let array = dash.array();
        let mut phase = dash.phase();
        let mut idx = 0;
        while phase >= array[idx] {
            phase -= array[idx];
            idx = (idx + 1) % array.len();
        }
        self.dash.clear();
        self.dash.extend_from_slice(array);
        self.start_phase = phase;
        self.phase = phase;
        self.start_idx = idx;
        self.idx = idx;

        self.m00 = transform.m00;
        self.m01 = transform.m01;
        self.m10 = transform.m10;
        self.m11 = transform.m11;
        self.det = z1(transform.determinant());
        self.symmetric = self.m00 == self.m11 && self.m10 == -self.m01;
    }

    /// Length of a device-space vector in user space.
    fn user_length(&self, lx: f64, ly: f64) -> f64 {
        if self.symmetric {
            // uniform scale + rotation: |det| is the squared scale factor
            lx.hypot(ly) / self.det.abs().sqrt()
        } else {
            let la = (ly * self.m00 - lx * self.m10) / self.det;
            let lb = (ly * self.m01 - lx * self.m11) / self.det;
            la.hypot(lb)
        }
    }

    fn go_to<S: LineSink + ?Sized>(&mut self, out: &mut S, x1: f64, y1: f64) {
        if self.idx % 2 == 0 {
            if self.starting {
                self.sx1 = x1;
                self.sy1 = y1;
                self.first_dash_on = true;
                self.starting = false;
            }
            out.line_to(x1, y1);
        } else {
            if self.starting {
                self.first_dash_on = false;
                self.starting = false;
            }
            out.move_to(x1, y1);
        }
        self.x0 = x1;
        self.y0 = y1;
    }
}

impl<S: LineSink + ?Sized> LineStage<S> for Dasher {
    fn move_to(&mut self, out: &mut S, x0: f64, y0: f64) {
        out.move_to(x0, y0);
        self.idx = self.start_idx;
        self.phase = self.start_phase;
        self.sx = x0;
        self.x0 = x0;
        self.sy = y0;
        self.y0 = y0;
        self.starting = true;
    }

    fn line_join(&mut self, out: &mut S) {
        out.line_join();
    }

    fn line_to(&mut self, out: &mut S, x1: f64, y1: f64) {
        loop {
            let d = self.dash[self.idx] - self.phase;
            let lx = x1 - self.x0;
            let ly = y1 - self.y0;
            let l = self.user_length(lx, ly);

            if l < d || !l.is_finite() {
                self.go_to(out, x1, y1);
                self.phase += l;
                return;
            }
            // a zero-length entry ends where it starts, even on a zero-length segment
            let t = if d > 0.0 { d / l } else { 0.0 };
            let xsplit = self.x0 + t * lx;
            let ysplit = self.y0 + t * ly;
            self.go_to(out, xsplit, ysplit);
            self.idx = (self.idx + 1) % self.dash.len();
            self.phase = 0.0;
        }
    }

    fn close(&mut self, out: &mut S) {
        let (sx, sy) = (self.sx, self.sy);
        LineStage::line_to(self, out, sx, sy);
        if self.first_dash_on {
            out.line_to(self.sx1, self.sy1);
        }
    }

    fn end(&mut self, out: &mut S) {
        out.end();
    }
}
