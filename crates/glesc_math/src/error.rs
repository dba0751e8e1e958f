//! # Math Error Types
//!
//! Numeric degeneracy is reported explicitly instead of leaking NaN.

use thiserror::Error;

/// Errors produced by numeric routines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// The matrix has no inverse within tolerance.
    #[error("matrix is singular (determinant {determinant})")]
    SingularMatrix {
        /// The determinant found by elimination (zero when rank-deficient).
        determinant: f64,
    },

    /// A vector too short to normalize.
    #[error("cannot normalize vector of length {length}")]
    ZeroLengthVector {
        /// Length of the offending vector.
        length: f64,
    },

    /// The up vector is parallel to the view direction.
    #[error("look-at basis is degenerate: up vector is parallel to view direction")]
    DegenerateBasis,

    /// A homogeneous point with `w` at zero cannot be projected back to 3D.
    #[error("point at infinity (w = 0) cannot be dehomogenized")]
    PointAtInfinity,

    /// Projection parameters that do not describe a valid frustum.
    #[error("invalid projection: {0}")]
    InvalidProjection(&'static str),
}

/// Result type for math operations.
pub type MathResult<T> = Result<T, MathError>;
