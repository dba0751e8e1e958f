//! # Vector
//!
//! Fixed-dimension vector value type. Arithmetic operators return new
//! values; compound-assignment operators mutate in place.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::algorithms::vector as alg;
use crate::error::{MathError, MathResult};
use crate::scalar::Scalar;
use crate::tolerance::Tolerance;

/// N-dimensional vector of `T`.
///
/// Equality (`==`) is tolerance-based using `T::DEFAULT_TOLERANCE`; use
/// [`Vector::approx_eq`] to compare with a configured tolerance.
#[derive(Clone, Copy, Debug)]
#[repr(transparent)]
pub struct Vector<T, const N: usize> {
    data: [T; N],
}

/// 2D single-precision vector.
pub type Vec2F = Vector<f32, 2>;
/// 3D single-precision vector.
pub type Vec3F = Vector<f32, 3>;
/// 4D single-precision vector.
pub type Vec4F = Vector<f32, 4>;
/// 2D double-precision vector.
pub type Vec2D = Vector<f64, 2>;
/// 3D double-precision vector.
pub type Vec3D = Vector<f64, 3>;
/// 4D double-precision vector.
pub type Vec4D = Vector<f64, 4>;

impl<T: Scalar, const N: usize> Vector<T, N> {
    /// Wraps an array.
    #[inline]
    #[must_use]
    pub const fn from_array(data: [T; N]) -> Self {
        Self { data }
    }

    /// All components zero.
    #[inline]
    #[must_use]
    pub fn zero() -> Self {
        Self::splat(T::ZERO)
    }

    /// All components equal to `value`.
    #[inline]
    #[must_use]
    pub fn splat(value: T) -> Self {
        Self { data: [value; N] }
    }

    /// Copies out the components.
    #[inline]
    #[must_use]
    pub fn to_array(self) -> [T; N] {
        self.data
    }

    /// Borrows the components.
    #[inline]
    #[must_use]
    pub const fn as_array(&self) -> &[T; N] {
        &self.data
    }

    /// Raw bytes, for GPU upload.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Dot product.
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &Self) -> T {
        alg::dot(&self.data, &other.data)
    }

    /// Euclidean length.
    #[inline]
    #[must_use]
    pub fn length(&self) -> T {
        alg::length(&self.data)
    }

    /// Squared length (avoids sqrt).
    #[inline]
    #[must_use]
    pub fn length_squared(&self) -> T {
        alg::length_squared(&self.data)
    }

    /// Distance to another point.
    #[inline]
    #[must_use]
    pub fn distance(&self, other: &Self) -> T {
        alg::distance(&self.data, &other.data)
    }

    /// Unit vector in the same direction.
    ///
    /// # Errors
    ///
    /// [`MathError::ZeroLengthVector`] when the length is zero within
    /// `tolerance`.
    #[inline]
    pub fn normalize(&self, tolerance: Tolerance) -> MathResult<Self> {
        alg::normalize(&self.data, tolerance).map(Self::from_array)
    }

    /// Linear interpolation towards `other`.
    #[inline]
    #[must_use]
    pub fn lerp(&self, other: &Self, t: T) -> Self {
        Self::from_array(alg::lerp(&self.data, &other.data, t))
    }

    /// Reflection about the plane with unit `normal`.
    #[inline]
    #[must_use]
    pub fn reflect(&self, normal: &Self) -> Self {
        Self::from_array(alg::reflect(&self.data, &normal.data))
    }

    /// Applies `f` to every component.
    #[inline]
    #[must_use]
    pub fn map(&self, f: impl FnMut(T) -> T) -> Self {
        Self::from_array(self.data.map(f))
    }

    /// Compares with an explicit tolerance.
    #[inline]
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        alg::approx_eq(&self.data, &other.data, tolerance)
    }

    /// Converts every component from degrees to radians.
    #[inline]
    #[must_use]
    pub fn to_radians(&self) -> Self {
        self.map(Scalar::to_radians)
    }

    /// Converts every component from radians to degrees.
    #[inline]
    #[must_use]
    pub fn to_degrees(&self) -> Self {
        self.map(Scalar::to_degrees)
    }

    /// Iterates over the components.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T: Scalar> Vector<T, 2> {
    /// Creates a 2D vector.
    #[inline]
    #[must_use]
    pub const fn new(x: T, y: T) -> Self {
        Self { data: [x, y] }
    }

    /// X component.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> T {
        self.data[0]
    }

    /// Y component.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> T {
        self.data[1]
    }
}

impl<T: Scalar> Vector<T, 3> {
    /// Creates a 3D vector.
    #[inline]
    #[must_use]
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { data: [x, y, z] }
    }

    /// X component.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> T {
        self.data[0]
    }

    /// Y component.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> T {
        self.data[1]
    }

    /// Z component.
    #[inline]
    #[must_use]
    pub const fn z(&self) -> T {
        self.data[2]
    }

    /// Right-handed cross product.
    #[inline]
    #[must_use]
    pub fn cross(&self, other: &Self) -> Self {
        Self::from_array(alg::cross(&self.data, &other.data))
    }

    /// Point with `w = 1`.
    #[inline]
    #[must_use]
    pub fn homogenize(&self) -> Vector<T, 4> {
        Vector::<T, 4>::new(self.data[0], self.data[1], self.data[2], T::ONE)
    }
}

impl<T: Scalar> Vector<T, 4> {
    /// Creates a 4D vector.
    #[inline]
    #[must_use]
    pub const fn new(x: T, y: T, z: T, w: T) -> Self {
        Self { data: [x, y, z, w] }
    }

    /// X component.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> T {
        self.data[0]
    }

    /// Y component.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> T {
        self.data[1]
    }

    /// Z component.
    #[inline]
    #[must_use]
    pub const fn z(&self) -> T {
        self.data[2]
    }

    /// W component.
    #[inline]
    #[must_use]
    pub const fn w(&self) -> T {
        self.data[3]
    }

    /// Divides by `w` to get back a 3D point.
    ///
    /// # Errors
    ///
    /// [`MathError::PointAtInfinity`] when `w` is zero within `tolerance`.
    pub fn dehomogenize(&self, tolerance: Tolerance) -> MathResult<Vector<T, 3>> {
        let w = self.data[3];
        if tolerance.is_zero(w) {
            return Err(MathError::PointAtInfinity);
        }
        Ok(Vector::<T, 3>::new(self.data[0] / w, self.data[1] / w, self.data[2] / w))
    }

    /// Drops `w` without dividing.
    #[inline]
    #[must_use]
    pub fn truncate(&self) -> Vector<T, 3> {
        Vector::<T, 3>::new(self.data[0], self.data[1], self.data[2])
    }
}

impl<T: Scalar, const N: usize> Default for Vector<T, N> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Scalar, const N: usize> From<[T; N]> for Vector<T, N> {
    fn from(data: [T; N]) -> Self {
        Self { data }
    }
}

impl<T: Scalar, const N: usize> From<Vector<T, N>> for [T; N] {
    fn from(v: Vector<T, N>) -> Self {
        v.data
    }
}

impl<T: Scalar, const N: usize> PartialEq for Vector<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, T::DEFAULT_TOLERANCE)
    }
}

impl<T: Scalar, const N: usize> Index<usize> for Vector<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T: Scalar, const N: usize> IndexMut<usize> for Vector<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

impl<T: Scalar, const N: usize> Add for Vector<T, N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_array(alg::add(&self.data, &rhs.data))
    }
}

impl<T: Scalar, const N: usize> Sub for Vector<T, N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::from_array(alg::sub(&self.data, &rhs.data))
    }
}

impl<T: Scalar, const N: usize> Neg for Vector<T, N> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_array(alg::negate(&self.data))
    }
}

impl<T: Scalar, const N: usize> Mul<T> for Vector<T, N> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self::from_array(alg::scale(&self.data, rhs))
    }
}

impl<T: Scalar, const N: usize> Div<T> for Vector<T, N> {
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        Self::from_array(alg::divide(&self.data, rhs))
    }
}

impl<T: Scalar, const N: usize> AddAssign for Vector<T, N> {
    fn add_assign(&mut self, rhs: Self) {
        self.data = alg::add(&self.data, &rhs.data);
    }
}

impl<T: Scalar, const N: usize> SubAssign for Vector<T, N> {
    fn sub_assign(&mut self, rhs: Self) {
        self.data = alg::sub(&self.data, &rhs.data);
    }
}

impl<T: Scalar, const N: usize> MulAssign<T> for Vector<T, N> {
    fn mul_assign(&mut self, rhs: T) {
        self.data = alg::scale(&self.data, rhs);
    }
}

impl<T: Scalar, const N: usize> DivAssign<T> for Vector<T, N> {
    fn div_assign(&mut self, rhs: T) {
        self.data = alg::divide(&self.data, rhs);
    }
}

impl<T: Scalar, const N: usize> fmt::Display for Vector<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3F::new(1.0, 2.0, 3.0);
        let b = Vec3F::new(4.0, 5.0, 6.0);

        let sum = a + b;
        assert_eq!(sum.x(), 5.0);
        assert_eq!(sum.y(), 7.0);
        assert_eq!(sum.z(), 9.0);

        assert_eq!(a.dot(&b), 32.0);
        assert_eq!(b - a, Vec3F::splat(3.0));
        assert_eq!(-a * 2.0, Vec3F::new(-2.0, -4.0, -6.0));
    }

    #[test]
    fn test_compound_assignment_mutates() {
        let mut v = Vec3D::new(1.0, 1.0, 1.0);
        v += Vec3D::new(1.0, 2.0, 3.0);
        v *= 2.0;
        v -= Vec3D::new(0.0, 0.0, 8.0);
        v /= 2.0;
        assert_eq!(v, Vec3D::new(2.0, 3.0, 0.0));
    }

    #[test]
    fn test_equality_is_tolerant() {
        let a = Vec3F::new(1.0, 2.0, 3.0);
        let b = Vec3F::new(1.000_001, 2.0, 3.0);
        assert_eq!(a, b);
        assert_ne!(a, Vec3F::new(1.1, 2.0, 3.0));
        assert!(!a.approx_eq(&b, Tolerance::new(1e-9, 1e-9)));
    }

    #[test]
    fn test_cross_is_orthogonal() {
        let a = Vec3D::new(1.0, 2.0, 3.0);
        let b = Vec3D::new(-2.0, 0.5, 4.0);
        let c = a.cross(&b);
        assert!(Tolerance::F64.is_zero(c.dot(&a)));
        assert!(Tolerance::F64.is_zero(c.dot(&b)));
    }

    #[test]
    fn test_normalize_zero_vector_errors() {
        assert!(Vec3F::zero().normalize(Tolerance::F32).is_err());
        let unit = Vec3F::new(0.0, 3.0, 4.0).normalize(Tolerance::F32).unwrap();
        assert_eq!(unit, Vec3F::new(0.0, 0.6, 0.8));
    }

    #[test]
    fn test_homogeneous_round_trip() {
        let p = Vec3F::new(1.0, -2.0, 3.0);
        assert_eq!(p.homogenize().dehomogenize(Tolerance::F32).unwrap(), p);
        let at_infinity = Vec4F::new(1.0, 0.0, 0.0, 0.0);
        assert_eq!(at_infinity.dehomogenize(Tolerance::F32), Err(MathError::PointAtInfinity));
    }

    #[test]
    fn test_display() {
        assert_eq!(Vec3F::new(1.0, 2.5, -3.0).to_string(), "[1, 2.5, -3]");
    }

    #[test]
    fn test_bytes_for_upload() {
        let v = Vec4F::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(v.as_bytes().len(), 16);
    }
}
