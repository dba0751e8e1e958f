//! Matrix algorithms over row-major `[[T; C]; R]`.
//!
//! Column-vector convention: a point `p` is transformed as `M * p`, so
//! translation lives in the last column and `A * B` applies `B` first.
//!
//! Determinant and inverse share one method for every dimension:
//! Gauss-Jordan elimination with partial pivoting.

use std::array;

use crate::algorithms::vector;
use crate::error::{MathError, MathResult};
use crate::scalar::Scalar;
use crate::tolerance::Tolerance;

/// Everything a single elimination pass yields.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaussianEliminationData<T: Scalar, const N: usize> {
    /// Number of linearly independent rows.
    pub rank: usize,
    /// Product of pivots, sign-corrected for row swaps. Zero when `rank < N`.
    pub determinant: T,
    /// The inverse, present only for full-rank input.
    pub inverse: Option<[[T; N]; N]>,
}

/// Identity matrix.
#[inline]
#[must_use]
pub fn identity<T: Scalar, const N: usize>() -> [[T; N]; N] {
    array::from_fn(|i| array::from_fn(|j| if i == j { T::ONE } else { T::ZERO }))
}

/// Elementwise sum.
#[inline]
#[must_use]
pub fn add<T: Scalar, const R: usize, const C: usize>(a: &[[T; C]; R], b: &[[T; C]; R]) -> [[T; C]; R] {
    array::from_fn(|i| vector::add(&a[i], &b[i]))
}

/// Elementwise difference.
#[inline]
#[must_use]
pub fn sub<T: Scalar, const R: usize, const C: usize>(a: &[[T; C]; R], b: &[[T; C]; R]) -> [[T; C]; R] {
    array::from_fn(|i| vector::sub(&a[i], &b[i]))
}

/// Multiplies every element by `factor`.
#[inline]
#[must_use]
pub fn scale<T: Scalar, const R: usize, const C: usize>(a: &[[T; C]; R], factor: T) -> [[T; C]; R] {
    array::from_fn(|i| vector::scale(&a[i], factor))
}

/// Matrix product `a * b`.
#[must_use]
pub fn multiply<T: Scalar, const R: usize, const K: usize, const C: usize>(
    a: &[[T; K]; R],
    b: &[[T; C]; K],
) -> [[T; C]; R] {
    array::from_fn(|i| {
        array::from_fn(|j| {
            let mut sum = T::ZERO;
            for k in 0..K {
                sum += a[i][k] * b[k][j];
            }
            sum
        })
    })
}

/// Matrix-vector product `m * v`.
#[inline]
#[must_use]
pub fn multiply_vector<T: Scalar, const R: usize, const C: usize>(m: &[[T; C]; R], v: &[T; C]) -> [T; R] {
    array::from_fn(|i| vector::dot(&m[i], v))
}

/// Returns the transpose.
#[inline]
#[must_use]
pub fn transpose<T: Scalar, const R: usize, const C: usize>(m: &[[T; C]; R]) -> [[T; R]; C] {
    array::from_fn(|i| array::from_fn(|j| m[j][i]))
}

/// Transposes a square matrix in place.
pub fn transpose_in_place<T: Scalar, const N: usize>(m: &mut [[T; N]; N]) {
    for i in 0..N {
        for j in (i + 1)..N {
            let upper = m[i][j];
            m[i][j] = m[j][i];
            m[j][i] = upper;
        }
    }
}

/// Elementwise comparison within `tolerance`.
#[inline]
#[must_use]
pub fn approx_eq<T: Scalar, const R: usize, const C: usize>(
    a: &[[T; C]; R],
    b: &[[T; C]; R],
    tolerance: Tolerance,
) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| vector::approx_eq(x, y, tolerance))
}

/// Reduces `m` to the identity while applying the same row operations to an
/// identity matrix.
///
/// Pivots are chosen by largest magnitude in the column (partial pivoting).
/// A column whose best pivot is negligible next to the column's largest
/// input entry is skipped and counts against the rank, so uniformly tiny or
/// huge matrices are judged by shape and not by magnitude.
#[must_use]
pub fn gaussian_elimination<T: Scalar, const N: usize>(
    m: &[[T; N]; N],
    tolerance: Tolerance,
) -> GaussianEliminationData<T, N> {
    let mut work = *m;
    let mut inverse = identity::<T, N>();
    let mut determinant = T::ONE;
    let mut pivot_row = 0;

    let mut column_scale = [T::ZERO; N];
    for row in m {
        for (scale, value) in column_scale.iter_mut().zip(row) {
            if value.abs() > *scale {
                *scale = value.abs();
            }
        }
    }

    for col in 0..N {
        if pivot_row == N {
            break;
        }

        let mut best = pivot_row;
        for row in (pivot_row + 1)..N {
            if work[row][col].abs() > work[best][col].abs() {
                best = row;
            }
        }

        let pivot = work[best][col];
        if tolerance.is_negligible(pivot, column_scale[col]) {
            continue;
        }

        if best != pivot_row {
            work.swap(best, pivot_row);
            inverse.swap(best, pivot_row);
            determinant = -determinant;
        }
        determinant *= pivot;

        for j in 0..N {
            work[pivot_row][j] /= pivot;
            inverse[pivot_row][j] /= pivot;
        }

        for row in 0..N {
            if row == pivot_row {
                continue;
            }
            let factor = work[row][col];
            if factor == T::ZERO {
                continue;
            }
            for j in 0..N {
                let w = work[pivot_row][j];
                let v = inverse[pivot_row][j];
                work[row][j] -= factor * w;
                inverse[row][j] -= factor * v;
            }
        }

        pivot_row += 1;
    }

    let rank = pivot_row;
    if rank < N {
        return GaussianEliminationData {
            rank,
            determinant: T::ZERO,
            inverse: None,
        };
    }

    GaussianEliminationData {
        rank,
        determinant,
        inverse: Some(inverse),
    }
}

/// Determinant via elimination.
#[inline]
#[must_use]
pub fn determinant<T: Scalar, const N: usize>(m: &[[T; N]; N], tolerance: Tolerance) -> T {
    gaussian_elimination(m, tolerance).determinant
}

/// Inverse via elimination.
///
/// # Errors
///
/// Returns [`MathError::SingularMatrix`] when the matrix is rank-deficient
/// within `tolerance`.
pub fn inverse<T: Scalar, const N: usize>(m: &[[T; N]; N], tolerance: Tolerance) -> MathResult<[[T; N]; N]> {
    let data = gaussian_elimination(m, tolerance);
    data.inverse.ok_or(MathError::SingularMatrix {
        determinant: data.determinant.to_f64(),
    })
}

/// Translation matrix.
#[must_use]
pub fn translation<T: Scalar>(offset: &[T; 3]) -> [[T; 4]; 4] {
    let mut m = identity::<T, 4>();
    m[0][3] = offset[0];
    m[1][3] = offset[1];
    m[2][3] = offset[2];
    m
}

/// Non-uniform scale matrix.
#[must_use]
pub fn scaling<T: Scalar>(factors: &[T; 3]) -> [[T; 4]; 4] {
    let mut m = identity::<T, 4>();
    m[0][0] = factors[0];
    m[1][1] = factors[1];
    m[2][2] = factors[2];
    m
}

/// Rotation about X (pitch), radians.
#[must_use]
pub fn rotation_x<T: Scalar>(angle: T) -> [[T; 4]; 4] {
    let (s, c) = (angle.sin(), angle.cos());
    let (o, l) = (T::ZERO, T::ONE);
    [[l, o, o, o], [o, c, -s, o], [o, s, c, o], [o, o, o, l]]
}

/// Rotation about Y (yaw), radians.
#[must_use]
pub fn rotation_y<T: Scalar>(angle: T) -> [[T; 4]; 4] {
    let (s, c) = (angle.sin(), angle.cos());
    let (o, l) = (T::ZERO, T::ONE);
    [[c, o, s, o], [o, l, o, o], [-s, o, c, o], [o, o, o, l]]
}

/// Rotation about Z (roll), radians.
#[must_use]
pub fn rotation_z<T: Scalar>(angle: T) -> [[T; 4]; 4] {
    let (s, c) = (angle.sin(), angle.cos());
    let (o, l) = (T::ZERO, T::ONE);
    [[c, -s, o, o], [s, c, o, o], [o, o, l, o], [o, o, o, l]]
}

/// Euler rotation `Rx * Ry * Rz`, radians.
#[must_use]
pub fn rotation_euler<T: Scalar>(angles: &[T; 3]) -> [[T; 4]; 4] {
    let xy = multiply(&rotation_x(angles[0]), &rotation_y(angles[1]));
    multiply(&xy, &rotation_z(angles[2]))
}

/// Model matrix `T * R * S`: scale first, then rotate, then translate.
#[must_use]
pub fn model<T: Scalar>(position: &[T; 3], rotation: &[T; 3], scale_factors: &[T; 3]) -> [[T; 4]; 4] {
    let rs = multiply(&rotation_euler(rotation), &scaling(scale_factors));
    multiply(&translation(position), &rs)
}

/// Upper-left 3x3 block of a 4x4 matrix.
#[inline]
#[must_use]
pub fn upper_left<T: Scalar>(m: &[[T; 4]; 4]) -> [[T; 3]; 3] {
    array::from_fn(|i| array::from_fn(|j| m[i][j]))
}

/// Normal matrix: inverse-transpose of the upper 3x3 block.
///
/// # Errors
///
/// Fails with [`MathError::SingularMatrix`] for a model with a zero scale.
pub fn normal_matrix<T: Scalar>(model_matrix: &[[T; 4]; 4], tolerance: Tolerance) -> MathResult<[[T; 3]; 3]> {
    let mut n = inverse(&upper_left(model_matrix), tolerance)?;
    transpose_in_place(&mut n);
    Ok(n)
}

/// View matrix looking from `eye` at `target`.
///
/// The camera looks down its local -Z; rows 0..3 of the result are the
/// orthonormal right/up/back basis.
///
/// # Errors
///
/// - [`MathError::ZeroLengthVector`] when `eye == target`
/// - [`MathError::DegenerateBasis`] when `up` is parallel to the view direction
pub fn look_at<T: Scalar>(eye: &[T; 3], target: &[T; 3], up: &[T; 3], tolerance: Tolerance) -> MathResult<[[T; 4]; 4]> {
    let back = vector::normalize(&vector::sub(eye, target), tolerance)?;
    let right = vector::normalize(&vector::cross(up, &back), tolerance).map_err(|_| MathError::DegenerateBasis)?;
    let true_up = vector::cross(&back, &right);

    let (o, l) = (T::ZERO, T::ONE);
    Ok([
        [right[0], right[1], right[2], -vector::dot(&right, eye)],
        [true_up[0], true_up[1], true_up[2], -vector::dot(&true_up, eye)],
        [back[0], back[1], back[2], -vector::dot(&back, eye)],
        [o, o, o, l],
    ])
}

/// Right-handed perspective projection mapping depth to [-1, 1].
///
/// # Errors
///
/// Returns [`MathError::InvalidProjection`] unless `0 < fov_y < pi`,
/// `aspect > 0`, `near > 0` and `far > near`.
pub fn perspective<T: Scalar>(fov_y: T, aspect: T, near: T, far: T, tolerance: Tolerance) -> MathResult<[[T; 4]; 4]> {
    let fov = fov_y.to_f64();
    if tolerance.is_zero(fov_y) || fov <= 0.0 || fov >= std::f64::consts::PI {
        return Err(MathError::InvalidProjection("field of view must be in (0, pi)"));
    }
    if tolerance.is_zero(aspect) || aspect <= T::ZERO {
        return Err(MathError::InvalidProjection("aspect ratio must be positive"));
    }
    if near <= T::ZERO {
        return Err(MathError::InvalidProjection("near plane must be positive"));
    }
    if far <= near || tolerance.approx_eq(far, near) {
        return Err(MathError::InvalidProjection("far plane must lie beyond near plane"));
    }

    let two = T::ONE + T::ONE;
    let focal = T::ONE / (fov_y / two).tan();
    let depth = near - far;
    let (o, l) = (T::ZERO, T::ONE);
    Ok([
        [focal / aspect, o, o, o],
        [o, focal, o, o],
        [o, o, (far + near) / depth, two * far * near / depth],
        [o, o, -l, o],
    ])
}

/// Orthographic projection mapping the box to the [-1, 1] cube.
///
/// # Errors
///
/// Returns [`MathError::InvalidProjection`] for an empty box on any axis.
pub fn orthographic<T: Scalar>(
    left: T,
    right: T,
    bottom: T,
    top: T,
    near: T,
    far: T,
    tolerance: Tolerance,
) -> MathResult<[[T; 4]; 4]> {
    if tolerance.approx_eq(left, right) || tolerance.approx_eq(bottom, top) || tolerance.approx_eq(near, far) {
        return Err(MathError::InvalidProjection("orthographic box has zero extent"));
    }
    let two = T::ONE + T::ONE;
    let (o, l) = (T::ZERO, T::ONE);
    Ok([
        [two / (right - left), o, o, -(right + left) / (right - left)],
        [o, two / (top - bottom), o, -(top + bottom) / (top - bottom)],
        [o, o, -two / (far - near), -(far + near) / (far - near)],
        [o, o, o, l],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: Tolerance = Tolerance::F64;

    #[test]
    fn test_multiply_rectangular() {
        let a = [[1.0_f64, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let b = [[7.0_f64, 8.0], [9.0, 10.0], [11.0, 12.0]];
        assert_eq!(multiply(&a, &b), [[58.0, 64.0], [139.0, 154.0]]);
    }

    #[test]
    fn test_transpose_in_place() {
        let mut m = [[1.0_f32, 2.0], [3.0, 4.0]];
        transpose_in_place(&mut m);
        assert_eq!(m, [[1.0, 3.0], [2.0, 4.0]]);
    }

    #[test]
    fn test_determinant_with_pivoting() {
        // Zero in the first pivot position forces a row swap
        let m = [[0.0_f64, 1.0, 2.0], [1.0, 0.0, 3.0], [4.0, -3.0, 8.0]];
        assert!(TOL.approx_eq(determinant(&m, TOL), -2.0));
    }

    #[test]
    fn test_determinant_matches_cofactor_expansion_4x4() {
        let m = [
            [3.0_f64, 2.0, 0.0, 1.0],
            [4.0, 0.0, 1.0, 2.0],
            [3.0, 0.0, 2.0, 1.0],
            [9.0, 2.0, 3.0, 1.0],
        ];
        assert!(TOL.approx_eq(determinant(&m, TOL), 24.0));
    }

    #[test]
    fn test_singular_rank() {
        let m = [[1.0_f64, 2.0, 3.0], [2.0, 4.0, 6.0], [1.0, 0.0, 1.0]];
        let data = gaussian_elimination(&m, TOL);
        assert_eq!(data.rank, 2);
        assert_eq!(data.determinant, 0.0);
        assert!(data.inverse.is_none());
        assert!(matches!(inverse(&m, TOL), Err(MathError::SingularMatrix { .. })));
    }

    #[test]
    fn test_tiny_scale_is_invertible() {
        let m = scaling(&[1e-6_f32, 1e-6, 1e-6]);
        let n = normal_matrix(&m, Tolerance::F32).unwrap();
        assert!(Tolerance::F32.approx_eq(n[0][0], 1e6));
        assert_eq!(gaussian_elimination(&m, Tolerance::F32).rank, 4);
    }

    #[test]
    fn test_large_nearly_singular_is_singular() {
        let m = [[1e8_f64, 1e8], [1e8, 1e8 + 1e-4]];
        let data = gaussian_elimination(&m, TOL);
        assert_eq!(data.rank, 1);
        assert!(data.inverse.is_none());
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = [[4.0_f64, 7.0, 2.0], [3.0, 6.0, 1.0], [2.0, 5.0, 3.0]];
        let inv = inverse(&m, TOL).unwrap();
        assert!(approx_eq(&multiply(&inv, &m), &identity(), Tolerance::new(1e-9, 1e-9)));
    }

    #[test]
    fn test_model_applies_scale_then_rotation_then_translation() {
        let m = model(&[10.0_f64, 0.0, 0.0], &[0.0, 0.0, std::f64::consts::FRAC_PI_2], &[2.0, 2.0, 2.0]);
        let p = multiply_vector(&m, &[1.0, 0.0, 0.0, 1.0]);
        // scale -> (2,0,0), rotate 90 about Z -> (0,2,0), translate -> (10,2,0)
        assert!(vector::approx_eq(&p, &[10.0, 2.0, 0.0, 1.0], Tolerance::new(1e-12, 1e-12)));
    }

    #[test]
    fn test_normal_matrix_of_uniform_scale_is_inverse_scale() {
        let m = scaling(&[2.0_f64, 2.0, 2.0]);
        let n = normal_matrix(&m, TOL).unwrap();
        assert!(approx_eq(&n, &scale(&identity::<f64, 3>(), 0.5), TOL));
    }

    #[test]
    fn test_normal_matrix_zero_scale_fails() {
        let m = scaling(&[1.0_f32, 0.0, 1.0]);
        assert!(normal_matrix(&m, Tolerance::F32).is_err());
    }

    #[test]
    fn test_look_at_degenerate_up() {
        let err = look_at(&[0.0_f32, 5.0, 0.0], &[0.0, 0.0, 0.0], &[0.0, 1.0, 0.0], Tolerance::F32).unwrap_err();
        assert_eq!(err, MathError::DegenerateBasis);
    }

    #[test]
    fn test_perspective_rejects_bad_planes() {
        assert!(perspective(1.0_f32, 1.5, 10.0, 1.0, Tolerance::F32).is_err());
        assert!(perspective(1.0_f32, 0.0, 0.1, 100.0, Tolerance::F32).is_err());
        assert!(perspective(0.0_f32, 1.0, 0.1, 100.0, Tolerance::F32).is_err());
    }

    #[test]
    fn test_perspective_maps_near_and_far() {
        let p = perspective(std::f64::consts::FRAC_PI_2, 1.0, 1.0, 10.0, TOL).unwrap();
        let near = multiply_vector(&p, &[0.0, 0.0, -1.0, 1.0]);
        let far = multiply_vector(&p, &[0.0, 0.0, -10.0, 1.0]);
        assert!(TOL.approx_eq(near[2] / near[3], -1.0));
        assert!(TOL.approx_eq(far[2] / far[3], 1.0));
    }

    #[test]
    fn test_orthographic_maps_corners() {
        let o = orthographic(-2.0_f64, 2.0, -1.0, 1.0, 0.1, 10.0, TOL).unwrap();
        let corner = multiply_vector(&o, &[2.0, 1.0, -10.0, 1.0]);
        assert!(vector::approx_eq(&corner, &[1.0, 1.0, 1.0, 1.0], TOL));
    }
}
