//! # GLESC Math
//!
//! Fixed-dimension linear algebra for the GLESC engine.
//!
//! ## Layers
//!
//! 1. **Algorithms** (`algorithms`) - pure functions over `[T; N]` and
//!    `[[T; C]; R]`. Dimensions are const generics, nothing allocates.
//! 2. **Value types** (`Vector`, `Matrix`) - thin wrappers exposing operator
//!    arithmetic, tolerance-based equality and `Display`.
//! 3. **Geometry** (`BoundingVolume`) - axis-aligned boxes used by collision.
//!
//! ## Conventions
//!
//! - Matrices are row-major and multiply column vectors: `M * v`.
//! - Trigonometric inputs are radians unless the function name says degrees.
//! - Every comparison takes a [`Tolerance`]; the `PartialEq` impls use the
//!   scalar's default tolerance.
//!
//! ## Example
//!
//! ```rust,ignore
//! use glesc_math::{Mat4F, Tolerance, Vec3F};
//!
//! let view = Mat4F::look_at(
//!     Vec3F::new(0.0, 0.0, 5.0),
//!     Vec3F::zero(),
//!     Vec3F::new(0.0, 1.0, 0.0),
//!     Tolerance::F32,
//! )?;
//! ```

#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod algorithms;
mod error;
mod geometry;
mod matrix;
mod scalar;
mod tolerance;
mod vector;

pub use algorithms::matrix::GaussianEliminationData;
pub use error::{MathError, MathResult};
pub use geometry::BoundingVolume;
pub use matrix::{Mat2F, Mat3D, Mat3F, Mat4D, Mat4F, Matrix};
pub use scalar::Scalar;
pub use tolerance::Tolerance;
pub use vector::{Vec2D, Vec2F, Vec3D, Vec3F, Vec4D, Vec4F, Vector};
