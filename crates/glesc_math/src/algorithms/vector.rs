//! Vector algorithms over `[T; N]`.

use std::array;

use crate::error::{MathError, MathResult};
use crate::scalar::Scalar;
use crate::tolerance::Tolerance;

/// Elementwise sum.
#[inline]
#[must_use]
pub fn add<T: Scalar, const N: usize>(a: &[T; N], b: &[T; N]) -> [T; N] {
    array::from_fn(|i| a[i] + b[i])
}

/// Elementwise difference.
#[inline]
#[must_use]
pub fn sub<T: Scalar, const N: usize>(a: &[T; N], b: &[T; N]) -> [T; N] {
    array::from_fn(|i| a[i] - b[i])
}

/// Multiplies every element by `factor`.
#[inline]
#[must_use]
pub fn scale<T: Scalar, const N: usize>(a: &[T; N], factor: T) -> [T; N] {
    array::from_fn(|i| a[i] * factor)
}

/// Divides every element by `divisor`. The caller owns the zero check.
#[inline]
#[must_use]
pub fn divide<T: Scalar, const N: usize>(a: &[T; N], divisor: T) -> [T; N] {
    array::from_fn(|i| a[i] / divisor)
}

/// Negates every element.
#[inline]
#[must_use]
pub fn negate<T: Scalar, const N: usize>(a: &[T; N]) -> [T; N] {
    array::from_fn(|i| -a[i])
}

/// Dot product.
#[inline]
#[must_use]
pub fn dot<T: Scalar, const N: usize>(a: &[T; N], b: &[T; N]) -> T {
    a.iter().zip(b.iter()).fold(T::ZERO, |acc, (&x, &y)| acc + x * y)
}

/// Squared Euclidean length (avoids sqrt).
#[inline]
#[must_use]
pub fn length_squared<T: Scalar, const N: usize>(a: &[T; N]) -> T {
    dot(a, a)
}

/// Euclidean length.
#[inline]
#[must_use]
pub fn length<T: Scalar, const N: usize>(a: &[T; N]) -> T {
    length_squared(a).sqrt()
}

/// Distance between two points.
#[inline]
#[must_use]
pub fn distance<T: Scalar, const N: usize>(a: &[T; N], b: &[T; N]) -> T {
    length(&sub(a, b))
}

/// Right-handed cross product.
#[inline]
#[must_use]
pub fn cross<T: Scalar>(a: &[T; 3], b: &[T; 3]) -> [T; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Scales `a` to unit length.
///
/// # Errors
///
/// Returns [`MathError::ZeroLengthVector`] when the length is zero within
/// `tolerance`. There is no silent zero-vector fallback.
#[inline]
pub fn normalize<T: Scalar, const N: usize>(a: &[T; N], tolerance: Tolerance) -> MathResult<[T; N]> {
    let len = length(a);
    if tolerance.is_zero(len) || !len.to_f64().is_finite() {
        return Err(MathError::ZeroLengthVector {
            length: len.to_f64(),
        });
    }
    Ok(divide(a, len))
}

/// Linear interpolation, `t = 0` gives `a`, `t = 1` gives `b`.
#[inline]
#[must_use]
pub fn lerp<T: Scalar, const N: usize>(a: &[T; N], b: &[T; N], t: T) -> [T; N] {
    array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}

/// Reflects `v` about the plane with unit `normal`.
#[inline]
#[must_use]
pub fn reflect<T: Scalar, const N: usize>(v: &[T; N], normal: &[T; N]) -> [T; N] {
    let twice = dot(v, normal) * (T::ONE + T::ONE);
    array::from_fn(|i| v[i] - normal[i] * twice)
}

/// Elementwise comparison within `tolerance`.
#[inline]
#[must_use]
pub fn approx_eq<T: Scalar, const N: usize>(a: &[T; N], b: &[T; N], tolerance: Tolerance) -> bool {
    a.iter().zip(b.iter()).all(|(&x, &y)| tolerance.approx_eq(x, y))
}
