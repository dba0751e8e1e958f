//! Cross-module properties of the math crate.

use glesc_math::{Mat3D, Mat4D, Mat4F, Matrix, Tolerance, Vec3D, Vec3F};

/// Deterministic pseudo-random values in [-10, 10).
fn sample_values(seed: u64, count: usize) -> Vec<f64> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 20_000) as f64 / 1_000.0 - 10.0
        })
        .collect()
}

fn sample_matrix(seed: u64) -> Mat4D {
    let v = sample_values(seed, 16);
    Mat4D::from_rows(std::array::from_fn(|i| std::array::from_fn(|j| v[i * 4 + j])))
}

#[test]
fn test_inverse_times_matrix_is_identity() {
    let tol = Tolerance::new(1e-7, 1e-7);
    let mut checked = 0;
    for seed in 1..=50_u64 {
        let m = sample_matrix(seed);
        let Ok(inv) = m.inverse(Tolerance::F64) else {
            continue;
        };
        assert!((inv * m).approx_eq(&Mat4D::identity(), tol), "seed {seed}");
        assert!((m * inv).approx_eq(&Mat4D::identity(), tol), "seed {seed}");
        checked += 1;
    }
    assert!(checked > 40);
}

#[test]
fn test_transpose_twice_is_identity_operation() {
    for seed in 1..=20_u64 {
        let v = sample_values(seed, 6);
        let m = Matrix::<f64, 2, 3>::from_rows([[v[0], v[1], v[2]], [v[3], v[4], v[5]]]);
        assert_eq!(m.transpose().transpose(), m);
    }
}

#[test]
fn test_determinant_of_product() {
    let a = sample_matrix(7);
    let b = sample_matrix(11);
    let tol = Tolerance::new(1e-6, 1e-9);
    let lhs = (a * b).determinant(Tolerance::F64);
    let rhs = a.determinant(Tolerance::F64) * b.determinant(Tolerance::F64);
    assert!(tol.approx_eq(lhs, rhs), "{lhs} vs {rhs}");
}

#[test]
fn test_look_at_basis_is_orthonormal() {
    let view = Mat4F::look_at(
        Vec3F::new(0.0, 0.0, 5.0),
        Vec3F::zero(),
        Vec3F::new(0.0, 1.0, 0.0),
        Tolerance::F32,
    )
    .unwrap();

    let rows: Vec<Vec3F> = (0..3).map(|i| view.row(i).truncate()).collect();
    for (i, a) in rows.iter().enumerate() {
        assert!(Tolerance::F32.approx_eq(a.length(), 1.0));
        for b in rows.iter().skip(i + 1) {
            assert!(Tolerance::F32.is_zero(a.dot(b)));
        }
    }

    // The eye maps to the view-space origin
    assert_eq!(view.transform_point(Vec3F::new(0.0, 0.0, 5.0)), Vec3F::zero());
    // The target lies straight ahead on -Z
    assert_eq!(view.transform_point(Vec3F::zero()), Vec3F::new(0.0, 0.0, -5.0));
}

#[test]
fn test_normal_matrix_keeps_normals_perpendicular() {
    let model = Mat4D::model(
        Vec3D::new(1.0, 2.0, 3.0),
        Vec3D::new(0.4, -0.3, 1.1),
        Vec3D::new(1.0, 4.0, 0.5),
    );
    let normal = model.normal_matrix(Tolerance::F64).unwrap();

    // A surface spanned by X and Y has normal Z
    let tangent_a = model.transform_direction(Vec3D::new(1.0, 0.0, 0.0));
    let tangent_b = model.transform_direction(Vec3D::new(0.0, 1.0, 0.0));
    let n: Vec3D = normal * Vec3D::new(0.0, 0.0, 1.0);

    assert!(Tolerance::F64.is_zero(n.dot(&tangent_a)));
    assert!(Tolerance::F64.is_zero(n.dot(&tangent_b)));
}

#[test]
fn test_gaussian_elimination_reports_rank() {
    let m = Mat3D::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
    let data = m.gaussian_elimination(Tolerance::F64);
    assert_eq!(data.rank, 2);
    assert!(data.inverse.is_none());
}
