//! Affine transform type shared by every pipeline stage.

/// A 2D affine transform.
///
/// The matrix is represented as:
/// ```text
/// | m00 m01 m02 |
/// | m10 m11 m12 |
/// |  0   0   1  |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    /// Scale X component.
    pub m00: f64,
    /// Shear X component (x' contribution of y).
    pub m01: f64,
    /// Translate X component.
    pub m02: f64,
    /// Shear Y component (y' contribution of x).
    pub m10: f64,
    /// Scale Y component.
    pub m11: f64,
    /// Translate Y component.
    pub m12: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    /// Create a new transform with the specified components.
    pub fn new(m00: f64, m01: f64, m02: f64, m10: f64, m11: f64, m12: f64) -> Self {
        Self {
            m00,
            m01,
            m02,
            m10,
            m11,
            m12,
        }
    }

    /// Create an identity transform.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    pub fn from_translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, tx, 0.0, 1.0, ty)
    }

    pub fn from_scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    /// Rotation by `angle` radians (positive turns +x toward +y).
    pub fn from_rotate(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, -sin, 0.0, sin, cos, 0.0)
    }

    pub fn from_shear(shx: f64, shy: f64) -> Self {
        Self::new(1.0, shx, 0.0, shy, 1.0, 0.0)
    }

    /// Determinant of the linear part.
    pub fn determinant(&self) -> f64 {
        self.m00 * self.m11 - self.m01 * self.m10
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// True when the transform has no rotation or shear terms.
    pub fn is_scale_translate(&self) -> bool {
        self.m01 == 0.0 && self.m10 == 0.0
    }

    /// Returns `self * other`: `other` is applied first, then `self`.
    pub fn pre_concat(&self, other: &Affine) -> Affine {
        Affine {
            m00: self.m00 * other.m00 + self.m01 * other.m10,
            m01: self.m00 * other.m01 + self.m01 * other.m11,
            m02: self.m00 * other.m02 + self.m01 * other.m12 + self.m02,
            m10: self.m10 * other.m00 + self.m11 * other.m10,
            m11: self.m10 * other.m01 + self.m11 * other.m11,
            m12: self.m10 * other.m02 + self.m11 * other.m12 + self.m12,
        }
    }

    /// Returns `other * self`: `self` is applied first, then `other`.
    pub fn post_concat(&self, other: &Affine) -> Affine {
        other.pre_concat(self)
    }

    pub fn pre_translate(&self, tx: f64, ty: f64) -> Affine {
        self.pre_concat(&Affine::from_translate(tx, ty))
    }

    pub fn pre_scale(&self, sx: f64, sy: f64) -> Affine {
        self.pre_concat(&Affine::from_scale(sx, sy))
    }

    pub fn pre_rotate(&self, angle: f64) -> Affine {
        self.pre_concat(&Affine::from_rotate(angle))
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Affine> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let m00 = self.m11 / det;
        let m01 = -self.m01 / det;
        let m10 = -self.m10 / det;
        let m11 = self.m00 / det;
        Some(Affine {
            m00,
            m01,
            m02: -(m00 * self.m02 + m01 * self.m12),
            m10,
            m11,
            m12: -(m10 * self.m02 + m11 * self.m12),
        })
    }

    /// Map a point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.m00 * x + self.m01 * y + self.m02,
            self.m10 * x + self.m11 * y + self.m12,
        )
    }

    /// Map a vector (no translation).
    pub fn apply_vector(&self, dx: f64, dy: f64) -> (f64, f64) {
        (self.m00 * dx + self.m01 * dy, self.m10 * dx + self.m11 * dy)
    }
}

impl From<Affine> for tiny_skia::Transform {
    fn from(m: Affine) -> Self {
        tiny_skia::Transform::from_row(
            m.m00 as f32,
            m.m10 as f32,
            m.m01 as f32,
            m.m11 as f32,
            m.m02 as f32,
            m.m12 as f32,
        )
    }
}

impl From<tiny_skia::Transform> for Affine {
    fn from(t: tiny_skia::Transform) -> Self {
        Affine::new(
            t.sx as f64,
            t.kx as f64,
            t.tx as f64,
            t.ky as f64,
            t.sy as f64,
            t.ty as f64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: (f64, f64), b: (f64, f64)) {
        assert!((a.0 - b.0).abs() < 1e-9, "{:?} != {:?}", a, b);
        assert!((a.1 - b.1).abs() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_pre_concat_order() {
        let t = Affine::from_translate(10.0, 0.0).pre_concat(&Affine::from_scale(2.0, 2.0));
        // scale first, then translate
        assert_close(t.apply(1.0, 1.0), (12.0, 2.0));
        let u = Affine::from_translate(10.0, 0.0).post_concat(&Affine::from_scale(2.0, 2.0));
        assert_close(u.apply(1.0, 1.0), (22.0, 2.0));
    }

    #[test]
    fn test_invert_round_trip() {
        let t = Affine::new(2.0, 0.5, 3.0, -1.0, 1.5, 7.0);
        let inv = t.invert().unwrap();
        let (x, y) = t.apply(4.0, -2.0);
        assert_close(inv.apply(x, y), (4.0, -2.0));
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Affine::from_scale(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn test_classification() {
        assert!(Affine::from_scale(3.0, 2.0).is_scale_translate());
        assert!(!Affine::from_rotate(0.3).is_scale_translate());
        assert!(Affine::default().is_identity());
    }

    #[test]
    fn test_tiny_skia_conversion() {
        let t = Affine::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let ts: tiny_skia::Transform = t.into();
        assert_eq!(ts.sx, 1.0);
        assert_eq!(ts.kx, 2.0);
        assert_eq!(ts.ky, 4.0);
        assert_eq!(Affine::from(ts), t);
    }
}
