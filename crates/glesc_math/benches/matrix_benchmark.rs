//! # Matrix Benchmark
//!
//! Per-draw math cost: model matrix, normal matrix, full MVP.
//!
//! Run with: `cargo bench --package glesc_math`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glesc_math::{Mat4F, Tolerance, Vec3F};

fn bench_model_matrix(c: &mut Criterion) {
    let position = Vec3F::new(1.0, 2.0, 3.0);
    let rotation = Vec3F::new(0.1, 0.2, 0.3);
    let scale = Vec3F::splat(1.5);

    c.bench_function("model_matrix", |b| {
        b.iter(|| Mat4F::model(black_box(position), black_box(rotation), black_box(scale)));
    });
}

fn bench_inverse(c: &mut Criterion) {
    let m = Mat4F::model(Vec3F::new(1.0, 2.0, 3.0), Vec3F::new(0.1, 0.2, 0.3), Vec3F::splat(1.5));

    c.bench_function("inverse_4x4", |b| {
        b.iter(|| black_box(m).inverse(Tolerance::F32));
    });

    c.bench_function("normal_matrix", |b| {
        b.iter(|| black_box(m).normal_matrix(Tolerance::F32));
    });
}

fn bench_mvp(c: &mut Criterion) {
    let model = Mat4F::model(Vec3F::new(1.0, 2.0, 3.0), Vec3F::new(0.1, 0.2, 0.3), Vec3F::splat(1.5));
    let view = Mat4F::look_at(Vec3F::new(0.0, 2.0, 10.0), Vec3F::zero(), Vec3F::new(0.0, 1.0, 0.0), Tolerance::F32);
    let projection = Mat4F::perspective(1.0, 16.0 / 9.0, 0.1, 100.0, Tolerance::F32);
    let (Ok(view), Ok(projection)) = (view, projection) else {
        return;
    };

    c.bench_function("mvp_1000", |b| {
        b.iter(|| {
            let mut acc = Mat4F::zero();
            for _ in 0..1000 {
                acc += black_box(projection) * black_box(view) * black_box(model);
            }
            acc
        });
    });
}

criterion_group!(benches, bench_model_matrix, bench_inverse, bench_mvp);
criterion_main!(benches);
