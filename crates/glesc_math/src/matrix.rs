//! # Matrix
//!
//! Row-major `R x C` matrix value type. Multiplication follows the
//! column-vector convention used by the renderer: `projection * view * model * p`.

use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::algorithms::matrix as alg;
use crate::algorithms::vector as valg;
use crate::algorithms::matrix::GaussianEliminationData;
use crate::error::MathResult;
use crate::scalar::Scalar;
use crate::tolerance::Tolerance;
use crate::vector::Vector;

/// Matrix with `R` rows and `C` columns.
#[derive(Clone, Copy, Debug)]
#[repr(transparent)]
pub struct Matrix<T, const R: usize, const C: usize> {
    rows: [[T; C]; R],
}

/// 2x2 single-precision matrix.
pub type Mat2F = Matrix<f32, 2, 2>;
/// 3x3 single-precision matrix.
pub type Mat3F = Matrix<f32, 3, 3>;
/// 4x4 single-precision matrix.
pub type Mat4F = Matrix<f32, 4, 4>;
/// 3x3 double-precision matrix.
pub type Mat3D = Matrix<f64, 3, 3>;
/// 4x4 double-precision matrix.
pub type Mat4D = Matrix<f64, 4, 4>;

impl<T: Scalar, const R: usize, const C: usize> Matrix<T, R, C> {
    /// Builds a matrix from its rows.
    #[inline]
    #[must_use]
    pub const fn from_rows(rows: [[T; C]; R]) -> Self {
        Self { rows }
    }

    /// All elements zero.
    #[inline]
    #[must_use]
    pub fn zero() -> Self {
        Self {
            rows: [[T::ZERO; C]; R],
        }
    }

    /// Borrows the rows.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> &[[T; C]; R] {
        &self.rows
    }

    /// Copies row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= R`.
    #[inline]
    #[must_use]
    pub fn row(&self, i: usize) -> Vector<T, C> {
        Vector::from_array(self.rows[i])
    }

    /// Copies column `j`.
    ///
    /// # Panics
    ///
    /// Panics if `j >= C`.
    #[inline]
    #[must_use]
    pub fn column(&self, j: usize) -> Vector<T, R> {
        Vector::from_array(std::array::from_fn(|i| self.rows[i][j]))
    }

    /// Returns the transpose.
    #[inline]
    #[must_use]
    pub fn transpose(&self) -> Matrix<T, C, R> {
        Matrix::from_rows(alg::transpose(&self.rows))
    }

    /// Compares with an explicit tolerance.
    #[inline]
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        alg::approx_eq(&self.rows, &other.rows, tolerance)
    }

    /// Row-major raw bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.rows.as_slice())
    }

    /// Column-major copy, the layout OpenGL uniforms expect.
    #[must_use]
    pub fn to_column_major(&self) -> [[T; R]; C] {
        alg::transpose(&self.rows)
    }
}

impl<T: Scalar, const N: usize> Matrix<T, N, N> {
    /// Identity matrix.
    #[inline]
    #[must_use]
    pub fn identity() -> Self {
        Self::from_rows(alg::identity())
    }

    /// Transposes in place.
    #[inline]
    pub fn transpose_in_place(&mut self) {
        alg::transpose_in_place(&mut self.rows);
    }

    /// Rank, determinant and inverse from one elimination pass.
    #[inline]
    #[must_use]
    pub fn gaussian_elimination(&self, tolerance: Tolerance) -> GaussianEliminationData<T, N> {
        alg::gaussian_elimination(&self.rows, tolerance)
    }

    /// Determinant.
    #[inline]
    #[must_use]
    pub fn determinant(&self, tolerance: Tolerance) -> T {
        alg::determinant(&self.rows, tolerance)
    }

    /// Rank.
    #[inline]
    #[must_use]
    pub fn rank(&self, tolerance: Tolerance) -> usize {
        self.gaussian_elimination(tolerance).rank
    }

    /// Inverse.
    ///
    /// # Errors
    ///
    /// [`crate::MathError::SingularMatrix`] when the matrix is not invertible.
    #[inline]
    pub fn inverse(&self, tolerance: Tolerance) -> MathResult<Self> {
        alg::inverse(&self.rows, tolerance).map(Self::from_rows)
    }

    /// Sum of the diagonal.
    #[must_use]
    pub fn trace(&self) -> T {
        (0..N).fold(T::ZERO, |acc, i| acc + self.rows[i][i])
    }
}

impl<T: Scalar> Matrix<T, 4, 4> {
    /// Translation by `offset`.
    #[must_use]
    pub fn translation(offset: Vector<T, 3>) -> Self {
        Self::from_rows(alg::translation(offset.as_array()))
    }

    /// Per-axis scale.
    #[must_use]
    pub fn scaling(factors: Vector<T, 3>) -> Self {
        Self::from_rows(alg::scaling(factors.as_array()))
    }

    /// Rotation about X, radians.
    #[must_use]
    pub fn rotation_x(angle: T) -> Self {
        Self::from_rows(alg::rotation_x(angle))
    }

    /// Rotation about Y, radians.
    #[must_use]
    pub fn rotation_y(angle: T) -> Self {
        Self::from_rows(alg::rotation_y(angle))
    }

    /// Rotation about Z, radians.
    #[must_use]
    pub fn rotation_z(angle: T) -> Self {
        Self::from_rows(alg::rotation_z(angle))
    }

    /// Euler rotation `Rx * Ry * Rz` from radians.
    #[must_use]
    pub fn rotation_euler(angles: Vector<T, 3>) -> Self {
        Self::from_rows(alg::rotation_euler(angles.as_array()))
    }

    /// Model matrix `T * R * S`. `rotation` is in radians.
    #[must_use]
    pub fn model(position: Vector<T, 3>, rotation: Vector<T, 3>, scale: Vector<T, 3>) -> Self {
        Self::from_rows(alg::model(position.as_array(), rotation.as_array(), scale.as_array()))
    }

    /// View matrix from `eye` towards `target`.
    ///
    /// # Errors
    ///
    /// Fails when `eye == target` or `up` is parallel to the view direction.
    pub fn look_at(eye: Vector<T, 3>, target: Vector<T, 3>, up: Vector<T, 3>, tolerance: Tolerance) -> MathResult<Self> {
        alg::look_at(eye.as_array(), target.as_array(), up.as_array(), tolerance).map(Self::from_rows)
    }

    /// Perspective projection, `fov_y` in radians.
    ///
    /// # Errors
    ///
    /// [`crate::MathError::InvalidProjection`] for out-of-range parameters.
    pub fn perspective(fov_y: T, aspect: T, near: T, far: T, tolerance: Tolerance) -> MathResult<Self> {
        alg::perspective(fov_y, aspect, near, far, tolerance).map(Self::from_rows)
    }

    /// Orthographic projection.
    ///
    /// # Errors
    ///
    /// [`crate::MathError::InvalidProjection`] for a box with zero extent.
    #[allow(clippy::too_many_arguments)]
    pub fn orthographic(left: T, right: T, bottom: T, top: T, near: T, far: T, tolerance: Tolerance) -> MathResult<Self> {
        alg::orthographic(left, right, bottom, top, near, far, tolerance).map(Self::from_rows)
    }

    /// Upper-left 3x3 block.
    #[inline]
    #[must_use]
    pub fn upper_left(&self) -> Matrix<T, 3, 3> {
        Matrix::from_rows(alg::upper_left(&self.rows))
    }

    /// Inverse-transpose of the upper 3x3 block.
    ///
    /// # Errors
    ///
    /// [`crate::MathError::SingularMatrix`] when the block is not invertible.
    pub fn normal_matrix(&self, tolerance: Tolerance) -> MathResult<Matrix<T, 3, 3>> {
        alg::normal_matrix(&self.rows, tolerance).map(Matrix::from_rows)
    }

    /// Applies an affine transform to a point (`w = 1`).
    #[must_use]
    pub fn transform_point(&self, point: Vector<T, 3>) -> Vector<T, 3> {
        (*self * point.homogenize()).truncate()
    }

    /// Applies the linear part to a direction (`w = 0`).
    #[must_use]
    pub fn transform_direction(&self, direction: Vector<T, 3>) -> Vector<T, 3> {
        let [x, y, z] = direction.to_array();
        (*self * Vector::<T, 4>::new(x, y, z, T::ZERO)).truncate()
    }

    /// Projects a point and performs the perspective divide.
    ///
    /// # Errors
    ///
    /// [`crate::MathError::PointAtInfinity`] when the clip-space `w` is zero.
    pub fn project_point(&self, point: Vector<T, 3>, tolerance: Tolerance) -> MathResult<Vector<T, 3>> {
        (*self * point.homogenize()).dehomogenize(tolerance)
    }

    /// Translation column.
    #[inline]
    #[must_use]
    pub fn translation_part(&self) -> Vector<T, 3> {
        Vector::<T, 3>::new(self.rows[0][3], self.rows[1][3], self.rows[2][3])
    }
}

impl<T: Scalar, const R: usize, const C: usize> Default for Matrix<T, R, C> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Scalar, const R: usize, const C: usize> From<[[T; C]; R]> for Matrix<T, R, C> {
    fn from(rows: [[T; C]; R]) -> Self {
        Self { rows }
    }
}

impl<T: Scalar, const R: usize, const C: usize> PartialEq for Matrix<T, R, C> {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, T::DEFAULT_TOLERANCE)
    }
}

impl<T: Scalar, const R: usize, const C: usize> Index<(usize, usize)> for Matrix<T, R, C> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.rows[row][col]
    }
}

impl<T: Scalar, const R: usize, const C: usize> IndexMut<(usize, usize)> for Matrix<T, R, C> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.rows[row][col]
    }
}

impl<T: Scalar, const R: usize, const C: usize> Add for Matrix<T, R, C> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_rows(alg::add(&self.rows, &rhs.rows))
    }
}

impl<T: Scalar, const R: usize, const C: usize> Sub for Matrix<T, R, C> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::from_rows(alg::sub(&self.rows, &rhs.rows))
    }
}

impl<T: Scalar, const R: usize, const C: usize> Neg for Matrix<T, R, C> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_rows(self.rows.map(|row| valg::negate(&row)))
    }
}

impl<T: Scalar, const R: usize, const C: usize> AddAssign for Matrix<T, R, C> {
    fn add_assign(&mut self, rhs: Self) {
        self.rows = alg::add(&self.rows, &rhs.rows);
    }
}

impl<T: Scalar, const R: usize, const C: usize> SubAssign for Matrix<T, R, C> {
    fn sub_assign(&mut self, rhs: Self) {
        self.rows = alg::sub(&self.rows, &rhs.rows);
    }
}

impl<T: Scalar, const R: usize, const K: usize, const C: usize> Mul<Matrix<T, K, C>> for Matrix<T, R, K> {
    type Output = Matrix<T, R, C>;

    fn mul(self, rhs: Matrix<T, K, C>) -> Matrix<T, R, C> {
        Matrix::from_rows(alg::multiply(&self.rows, &rhs.rows))
    }
}

impl<T: Scalar, const R: usize, const C: usize> Mul<Vector<T, C>> for Matrix<T, R, C> {
    type Output = Vector<T, R>;

    fn mul(self, rhs: Vector<T, C>) -> Vector<T, R> {
        Vector::from_array(alg::multiply_vector(&self.rows, rhs.as_array()))
    }
}

impl<T: Scalar, const N: usize> MulAssign for Matrix<T, N, N> {
    fn mul_assign(&mut self, rhs: Self) {
        self.rows = alg::multiply(&self.rows, &rhs.rows);
    }
}

// Scalar products are spelled out per float type so they cannot overlap
// with the matrix and vector products above.
macro_rules! impl_scalar_mul {
    ($ty:ty) => {
        impl<const R: usize, const C: usize> Mul<$ty> for Matrix<$ty, R, C> {
            type Output = Self;

            fn mul(self, rhs: $ty) -> Self {
                Self::from_rows(alg::scale(&self.rows, rhs))
            }
        }

        impl<const R: usize, const C: usize> MulAssign<$ty> for Matrix<$ty, R, C> {
            fn mul_assign(&mut self, rhs: $ty) {
                self.rows = alg::scale(&self.rows, rhs);
            }
        }
    };
}

impl_scalar_mul!(f32);
impl_scalar_mul!(f64);

impl<T: Scalar, const R: usize, const C: usize> fmt::Display for Matrix<T, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", Vector::from_array(*row))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{Vec3F, Vec4F};
    use crate::MathError;

    #[test]
    fn test_identity_multiplication() {
        let m = Mat4F::model(Vec3F::new(1.0, 2.0, 3.0), Vec3F::new(0.3, 0.2, 0.1), Vec3F::splat(2.0));
        assert_eq!(m * Mat4F::identity(), m);
        assert_eq!(Mat4F::identity() * m, m);
    }

    #[test]
    fn test_rectangular_product_shape() {
        let a = Matrix::<f32, 2, 3>::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let b = a.transpose();
        let p: Mat2F = a * b;
        assert_eq!(p, Mat2F::from_rows([[14.0, 32.0], [32.0, 77.0]]));
    }

    #[test]
    fn test_scalar_and_assign_ops() {
        let mut m = Mat2F::identity();
        m *= 3.0;
        m += Mat2F::identity();
        assert_eq!(m, Mat2F::from_rows([[4.0, 0.0], [0.0, 4.0]]));
        m -= Mat2F::identity() * 2.0;
        assert_eq!(-m, Mat2F::from_rows([[-2.0, 0.0], [0.0, -2.0]]));
    }

    #[test]
    fn test_inverse_of_translation() {
        let t = Mat4F::translation(Vec3F::new(3.0, -1.0, 2.0));
        let inv = t.inverse(Tolerance::F32).unwrap();
        assert_eq!(inv.translation_part(), Vec3F::new(-3.0, 1.0, -2.0));
        assert_eq!(t * inv, Mat4F::identity());
    }

    #[test]
    fn test_singular_inverse_errors() {
        let m = Mat3F::zero();
        assert!(matches!(m.inverse(Tolerance::F32), Err(MathError::SingularMatrix { .. })));
        assert_eq!(m.rank(Tolerance::F32), 0);
    }

    #[test]
    fn test_transform_point_and_direction() {
        let m = Mat4F::translation(Vec3F::new(5.0, 0.0, 0.0));
        let p = Vec3F::new(1.0, 1.0, 1.0);
        assert_eq!(m.transform_point(p), Vec3F::new(6.0, 1.0, 1.0));
        assert_eq!(m.transform_direction(p), p);
    }

    #[test]
    fn test_column_access_and_index() {
        let mut m = Mat3F::identity();
        m[(0, 2)] = 7.0;
        assert_eq!(m.column(2), Vec3F::new(7.0, 0.0, 1.0));
        assert_eq!(m.row(0), Vec3F::new(1.0, 0.0, 7.0));
        assert_eq!(m.to_column_major()[2], [7.0, 0.0, 1.0]);
    }

    #[test]
    fn test_matrix_vector_product() {
        let m = Mat4F::scaling(Vec3F::new(2.0, 3.0, 4.0));
        assert_eq!(m * Vec4F::new(1.0, 1.0, 1.0, 1.0), Vec4F::new(2.0, 3.0, 4.0, 1.0));
    }

    #[test]
    fn test_display_one_row_per_line() {
        let m = Mat2F::from_rows([[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(m.to_string(), "[1, 2]\n[3, 4]");
    }

    #[test]
    fn test_bytes_are_row_major() {
        let m = Mat2F::from_rows([[1.0, 2.0], [3.0, 4.0]]);
        let floats: &[f32] = bytemuck::cast_slice(m.as_bytes());
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0]);
    }
}
