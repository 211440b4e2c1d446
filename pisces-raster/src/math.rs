//! Epsilon-scaled comparisons and S15.16 fixed point helpers.
//!
//! Every near-zero or near-equal decision in the pipeline goes through these
//! functions so that tolerances scale with the magnitude of the operands.

/// Base tolerance.
pub const EPS: f64 = 1e-8;
const EPS_D2: f64 = EPS / 2.0;
const EPS_1D2: f64 = 1.0 - EPS_D2;

/// Smallest value treated as strictly positive.
pub const ZERO: f64 = 0.0 + EPS;

pub const SQRT_TWO: f64 = std::f64::consts::SQRT_2;

/// Number of fractional bits in an S15.16 value.
pub const FRACTION_BITS: u32 = 16;

/// 1.0 in S15.16.
pub const ONE: i32 = 1 << FRACTION_BITS;

const MAX_FIXED_DOUBLE: f64 = 32767.999992370602;
const MIN_FIXED_DOUBLE: f64 = -32768.0;

/// Tolerance for comparing `u` and `v`: `EPS * max(1, |u|, |v|)`.
pub fn eps_scale(u: f64, v: f64) -> f64 {
    EPS * 1.0f64.max(u.abs()).max(v.abs())
}

/// `a == b` within tolerance. False when either side is NaN.
pub fn eeq(a: f64, b: f64) -> bool {
    let d = a - b;
    if d.is_nan() {
        false
    } else {
        d.abs() <= eps_scale(a, b)
    }
}

/// `a >= b` within tolerance.
pub fn ege(a: f64, b: f64) -> bool {
    let d = a - b;
    d.abs() <= eps_scale(a, b) || d > 0.0
}

/// Snap values within `EPS` of zero to zero and magnitudes just below one to
/// exactly ±1.
pub fn z1(v: f64) -> f64 {
    let av = v.abs();
    if av < EPS {
        return 0.0;
    }
    let over = av - EPS_1D2;
    if 0.0 < over && over < EPS_D2 {
        if v < 0.0 {
            -1.0
        } else {
            1.0
        }
    } else {
        v
    }
}

/// Convert to S15.16, saturating outside the representable range.
pub fn to_fixed(n: f64) -> i32 {
    if n > MAX_FIXED_DOUBLE {
        i32::MAX
    } else if n < MIN_FIXED_DOUBLE {
        i32::MIN
    } else {
        // round half up
        (n * ONE as f64 + 0.5).floor() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_eeq_scales_with_magnitude() {
        assert!(eeq(1.0, 1.0 + 5e-9));
        assert!(!eeq(1.0, 1.0 + 5e-8));
        assert!(eeq(1e6, 1e6 + 5e-3));
        assert!(!eeq(f64::NAN, f64::NAN));
    }

    #[rstest]
    #[case(1.0, 2.0, false)]
    #[case(2.0, 1.0, true)]
    #[case(1.0, 1.0 + 1e-9, true)]
    #[case(1e6, 1e6 + 5e-3, true)]
    fn test_ege(#[case] a: f64, #[case] b: f64, #[case] ge: bool) {
        assert_eq!(ege(a, b), ge);
    }

    #[test]
    fn test_z1() {
        assert_eq!(z1(-1e-9), 0.0);
        assert_eq!(z1(1.0 - 3e-9), 1.0);
        assert_eq!(z1(-(1.0 - 3e-9)), -1.0);
        assert_eq!(z1(0.75), 0.75);
        assert_eq!(z1(2.0), 2.0);
    }

    #[test]
    fn test_fixed_point_conversions() {
        assert_eq!(to_fixed(1.0), ONE);
        assert_eq!(to_fixed(-0.5), -(ONE / 2));
        assert_eq!(to_fixed(40000.0), i32::MAX);
        assert_eq!(to_fixed(-40000.0), i32::MIN);
        assert_eq!(to_fixed(1.25), ONE + ONE / 4);
    }
}
