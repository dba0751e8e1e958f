//! # Comparison Tolerance
//!
//! An explicit value threaded into every routine that compares floats,
//! so the engine-wide epsilon comes from configuration rather than a
//! hidden constant.

use serde::{Deserialize, Serialize};

use crate::scalar::Scalar;

/// Absolute/relative epsilon pair.
///
/// Two values `a` and `b` are equal when `|a - b| <= absolute` or
/// `|a - b| <= relative * max(|a|, |b|)`. A value is zero when
/// `|v| <= absolute`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Absolute epsilon.
    pub absolute: f64,
    /// Relative epsilon, scaled by the larger magnitude.
    pub relative: f64,
}

impl Tolerance {
    /// Default for single precision.
    pub const F32: Self = Self::new(1e-5, 1e-5);

    /// Default for double precision.
    pub const F64: Self = Self::new(1e-10, 1e-10);

    /// Creates a tolerance.
    #[inline]
    #[must_use]
    pub const fn new(absolute: f64, relative: f64) -> Self {
        Self { absolute, relative }
    }

    /// Default tolerance for a scalar type.
    #[inline]
    #[must_use]
    pub const fn of<T: Scalar>() -> Self {
        T::DEFAULT_TOLERANCE
    }

    /// Compares two scalars.
    #[inline]
    #[must_use]
    pub fn approx_eq<T: Scalar>(self, a: T, b: T) -> bool {
        let a = a.to_f64();
        let b = b.to_f64();
        if a == b {
            return true;
        }
        let diff = (a - b).abs();
        if !diff.is_finite() {
            return false;
        }
        diff <= self.absolute || diff <= self.relative * a.abs().max(b.abs())
    }

    /// Checks whether a scalar is indistinguishable from zero.
    #[inline]
    #[must_use]
    pub fn is_zero<T: Scalar>(self, value: T) -> bool {
        value.to_f64().abs() <= self.absolute
    }

    /// Checks whether `value` is zero next to `scale`, the largest magnitude
    /// it was derived from. A zero `scale` falls back to the absolute epsilon.
    #[inline]
    #[must_use]
    pub fn is_negligible<T: Scalar>(self, value: T, scale: T) -> bool {
        let value = value.to_f64().abs();
        let scale = scale.to_f64().abs();
        if scale == 0.0 {
            value <= self.absolute
        } else {
            value <= self.relative * scale
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::F32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_comparison() {
        let tol = Tolerance::new(1e-3, 0.0);
        assert!(tol.approx_eq(1.0_f32, 1.0005));
        assert!(!tol.approx_eq(1.0_f32, 1.01));
    }

    #[test]
    fn test_relative_comparison_scales() {
        let tol = Tolerance::new(1e-9, 1e-6);
        assert!(tol.approx_eq(1.0e9_f64, 1.0e9 + 100.0));
        assert!(!tol.approx_eq(1.0_f64, 1.0 + 1e-4));
    }

    #[test]
    fn test_nan_never_equal() {
        assert!(!Tolerance::F64.approx_eq(f64::NAN, f64::NAN));
        assert!(!Tolerance::F64.approx_eq(f64::NAN, 0.0));
    }

    #[test]
    fn test_is_zero() {
        assert!(Tolerance::F32.is_zero(1e-7_f32));
        assert!(!Tolerance::F32.is_zero(1e-3_f32));
    }

    #[test]
    fn test_negligible_is_scale_relative() {
        assert!(!Tolerance::F32.is_negligible(1e-7_f32, 1e-7));
        assert!(Tolerance::F32.is_negligible(1e-3_f32, 1e3));
        assert!(Tolerance::F32.is_negligible(0.0_f32, 0.0));
    }
}
