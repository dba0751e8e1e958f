//! # Scalar Trait
//!
//! The numeric element type shared by vectors and matrices.

use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use bytemuck::Pod;

use crate::tolerance::Tolerance;

/// Floating point element of a `Vector` or `Matrix`.
///
/// Implemented for `f32` and `f64`. `Pod` lets whole matrices be handed to
/// a GPU upload as bytes.
pub trait Scalar:
    Copy
    + Default
    + PartialOrd
    + Debug
    + Display
    + Pod
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;
    /// Tolerance used by `PartialEq` and by callers without a configured one.
    const DEFAULT_TOLERANCE: Tolerance;

    /// Converts from `f64`, rounding if needed.
    fn from_f64(value: f64) -> Self;
    /// Widens to `f64`.
    fn to_f64(self) -> f64;

    /// Absolute value.
    fn abs(self) -> Self;
    /// Square root.
    fn sqrt(self) -> Self;
    /// Sine of an angle in radians.
    fn sin(self) -> Self;
    /// Cosine of an angle in radians.
    fn cos(self) -> Self;
    /// Tangent of an angle in radians.
    fn tan(self) -> Self;

    /// Degrees to radians.
    #[inline]
    #[must_use]
    fn to_radians(self) -> Self {
        Self::from_f64(self.to_f64().to_radians())
    }

    /// Radians to degrees.
    #[inline]
    #[must_use]
    fn to_degrees(self) -> Self {
        Self::from_f64(self.to_f64().to_degrees())
    }

    /// The larger of two values.
    #[inline]
    #[must_use]
    fn max_of(self, other: Self) -> Self {
        if self >= other {
            self
        } else {
            other
        }
    }

    /// The smaller of two values.
    #[inline]
    #[must_use]
    fn min_of(self, other: Self) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }
}

macro_rules! impl_scalar {
    ($ty:ty, $tolerance:expr) => {
        impl Scalar for $ty {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const DEFAULT_TOLERANCE: Tolerance = $tolerance;

            #[inline]
            #[allow(clippy::cast_possible_truncation)]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            #[inline]
            fn to_f64(self) -> f64 {
                f64::from(self)
            }

            #[inline]
            fn abs(self) -> Self {
                <$ty>::abs(self)
            }

            #[inline]
            fn sqrt(self) -> Self {
                <$ty>::sqrt(self)
            }

            #[inline]
            fn sin(self) -> Self {
                <$ty>::sin(self)
            }

            #[inline]
            fn cos(self) -> Self {
                <$ty>::cos(self)
            }

            #[inline]
            fn tan(self) -> Self {
                <$ty>::tan(self)
            }
        }
    };
}

impl_scalar!(f32, Tolerance::F32);
impl_scalar!(f64, Tolerance::F64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_conversion() {
        assert!((180.0_f32.to_radians() - std::f32::consts::PI).abs() < 1e-6);
        assert!((Scalar::to_degrees(std::f64::consts::FRAC_PI_2) - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(2.0_f32.max_of(3.0), 3.0);
        assert_eq!(2.0_f64.min_of(-1.0), -1.0);
    }
}
