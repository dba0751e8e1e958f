//! # Numeric Algorithms
//!
//! Pure functions over fixed-length arrays. The value types in this crate
//! are thin wrappers around these; the ECS and renderer may also call them
//! directly on raw arrays.
//!
//! - No heap allocation
//! - Dimensions are compile-time parameters
//! - Degenerate inputs return `MathError`, never NaN

pub mod matrix;
pub mod vector;
