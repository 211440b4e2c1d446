//! Paths with a winding rule, and polygon constructors.

use crate::error::{RasterError, RasterResult};
use crate::path_store::PathStore;
use crate::sink::LineSink;
use crate::style::WindingRule;
use std::ops::{Deref, DerefMut};

/// A path store tagged with the winding rule used to fill it.
#[derive(Debug, Clone, Default)]
pub struct Path {
    store: PathStore,
    pub winding_rule: WindingRule,
}

impl Path {
    /// Create an empty path with the non-zero winding rule.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_winding_rule(winding_rule: WindingRule) -> Self {
        Self {
            store: PathStore::new(),
            winding_rule,
        }
    }

    pub fn into_store(self) -> PathStore {
        self.store
    }
}

impl From<PathStore> for Path {
    fn from(store: PathStore) -> Self {
        Self {
            store,
            winding_rule: WindingRule::default(),
        }
    }
}

impl Deref for Path {
    type Target = PathStore;

    fn deref(&self) -> &PathStore {
        &self.store
    }
}

impl DerefMut for Path {
    fn deref_mut(&mut self) -> &mut PathStore {
        &mut self.store
    }
}

/// Closed polygon constructors.
pub struct Polygon;

impl Polygon {
    /// Axis-aligned rectangle traced (x0,y0) → (x0,y1) → (x1,y1) → (x1,y0).
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Path {
        let (x0, x1, y0, y1) = (x, x + width, y, y + height);
        let mut path = Path::new();
        path.move_to(x0, y0);
        path.line_to(x0, y1);
        path.line_to(x1, y1);
        path.line_to(x1, y0);
        path.close();
        path
    }

    pub fn square(x: f64, y: f64, side: f64) -> Path {
        Self::rect(x, y, side, side)
    }

    /// Closed polygon through parallel coordinate arrays.
    ///
    /// Empty arrays give an empty path.
    pub fn from_points(xs: &[f64], ys: &[f64]) -> RasterResult<Path> {
        if xs.len() != ys.len() {
            return Err(RasterError::InvalidArgument(format!(
                "Polygon coordinate arrays differ in length: {} vs {}",
                xs.len(),
                ys.len()
            )));
        }
        let mut path = Path::new();
        let mut points = xs.iter().zip(ys);
        if let Some((&x, &y)) = points.next() {
            path.move_to(x, y);
            for (&x, &y) in points {
                path.line_to(x, y);
            }
            path.close();
        }
        Ok(path)
    }
}
