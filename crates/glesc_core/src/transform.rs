//! # Transform
//!
//! Position, rotation (degrees, applied X then Y then Z as `Rx * Ry * Rz`)
//! and scale, plus the model and normal matrices derived from them.
//!
//! Matrices are cached and recomputed lazily. Setters mark the transform
//! dirty; a read on a dirty transform computes fresh matrices, so a read
//! always reflects the latest fields. [`Transform::refresh`] (run by the
//! transform system every step) stores them back in the cache.

use std::fmt;

use glesc_math::{Mat3F, Mat4F, MathResult, Tolerance, Vec3F};

use crate::ecs::Component;

/// Spatial state of an entity.
#[derive(Clone, Debug)]
pub struct Transform {
    position: Vec3F,
    rotation_degrees: Vec3F,
    scale: Vec3F,
    cache: MatrixCache,
}

#[derive(Clone, Copy, Debug)]
struct MatrixCache {
    dirty: bool,
    model: Mat4F,
    /// `None` while the model has a zero scale on some axis.
    normal: Option<Mat3F>,
}

impl Component for Transform {}

impl Transform {
    /// Creates a transform. `rotation_degrees` is per-axis Euler angles.
    #[must_use]
    pub fn new(position: Vec3F, rotation_degrees: Vec3F, scale: Vec3F) -> Self {
        Self {
            position,
            rotation_degrees,
            scale,
            cache: MatrixCache {
                dirty: true,
                model: Mat4F::identity(),
                normal: None,
            },
        }
    }

    /// Identity rotation and unit scale at `position`.
    #[must_use]
    pub fn from_position(position: Vec3F) -> Self {
        Self::new(position, Vec3F::zero(), Vec3F::splat(1.0))
    }

    /// Position.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Vec3F {
        self.position
    }

    /// Rotation in degrees.
    #[inline]
    #[must_use]
    pub const fn rotation_degrees(&self) -> Vec3F {
        self.rotation_degrees
    }

    /// Scale.
    #[inline]
    #[must_use]
    pub const fn scale(&self) -> Vec3F {
        self.scale
    }

    /// Replaces the position.
    pub fn set_position(&mut self, position: Vec3F) {
        self.position = position;
        self.cache.dirty = true;
    }

    /// Replaces the rotation, in degrees.
    pub fn set_rotation_degrees(&mut self, rotation: Vec3F) {
        self.rotation_degrees = rotation;
        self.cache.dirty = true;
    }

    /// Replaces the scale.
    pub fn set_scale(&mut self, scale: Vec3F) {
        self.scale = scale;
        self.cache.dirty = true;
    }

    /// Moves by `offset`.
    pub fn add_position(&mut self, offset: Vec3F) {
        self.set_position(self.position + offset);
    }

    /// Rotates by `degrees` on each axis.
    pub fn add_rotation_degrees(&mut self, degrees: Vec3F) {
        self.set_rotation_degrees(self.rotation_degrees + degrees);
    }

    /// Grows by `amount` on each axis.
    pub fn add_scale(&mut self, amount: Vec3F) {
        self.set_scale(self.scale + amount);
    }

    /// Whether the cached matrices are stale.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.cache.dirty
    }

    /// Model matrix `T * R * S`.
    #[must_use]
    pub fn model_matrix(&self) -> Mat4F {
        if self.cache.dirty {
            self.compute_model()
        } else {
            self.cache.model
        }
    }

    /// Translation-only matrix.
    #[must_use]
    pub fn translation_matrix(&self) -> Mat4F {
        Mat4F::translation(self.position)
    }

    /// Inverse-transpose of the model's upper 3x3 block.
    ///
    /// # Errors
    ///
    /// [`glesc_math::MathError::SingularMatrix`] when some scale axis is zero.
    pub fn normal_matrix(&self, tolerance: Tolerance) -> MathResult<Mat3F> {
        if !self.cache.dirty {
            if let Some(normal) = self.cache.normal {
                return Ok(normal);
            }
        }
        self.model_matrix().normal_matrix(tolerance)
    }

    /// Recomputes cached matrices if dirty.
    ///
    /// # Errors
    ///
    /// Returns the normal-matrix failure for a zero scale. The model matrix
    /// is cached regardless.
    pub fn refresh(&mut self, tolerance: Tolerance) -> MathResult<()> {
        if !self.cache.dirty {
            return Ok(());
        }
        let model = self.compute_model();
        let normal = model.normal_matrix(tolerance);
        self.cache = MatrixCache {
            dirty: false,
            model,
            normal: normal.as_ref().ok().copied(),
        };
        normal.map(|_| ())
    }

    /// Local -Z after rotation.
    #[must_use]
    pub fn forward(&self) -> Vec3F {
        self.rotation_matrix().transform_direction(Vec3F::new(0.0, 0.0, -1.0))
    }

    /// Local +X after rotation.
    #[must_use]
    pub fn right(&self) -> Vec3F {
        self.rotation_matrix().transform_direction(Vec3F::new(1.0, 0.0, 0.0))
    }

    /// Local +Y after rotation.
    #[must_use]
    pub fn up(&self) -> Vec3F {
        self.rotation_matrix().transform_direction(Vec3F::new(0.0, 1.0, 0.0))
    }

    /// Fields compared with `tolerance`; cache state is ignored.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        self.position.approx_eq(&other.position, tolerance)
            && self.rotation_degrees.approx_eq(&other.rotation_degrees, tolerance)
            && self.scale.approx_eq(&other.scale, tolerance)
    }

    fn rotation_matrix(&self) -> Mat4F {
        Mat4F::rotation_euler(self.rotation_degrees.to_radians())
    }

    fn compute_model(&self) -> Mat4F {
        Mat4F::model(self.position, self.rotation_degrees.to_radians(), self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_position(Vec3F::zero())
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, Tolerance::F32)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Position: {}", self.position)?;
        writeln!(f, "Rotation: {}", self.rotation_degrees)?;
        write!(f, "Scale: {}", self.scale)
    }
}

// =============================================================================
// INTERPOLATION
// =============================================================================

/// Position jump, in length units, treated as a teleport.
pub const TELEPORT_DISTANCE: f32 = 100.0;

/// Per-axis rotation jump, in degrees, that disables interpolation.
pub const MAX_INTERPOLATED_ROTATION: f32 = 180.0;

/// Smooths rendering between fixed simulation steps by blending the last
/// two committed transforms.
#[derive(Clone, Debug, Default)]
pub struct TransformInterpolator {
    previous: Transform,
    current: Transform,
}

impl TransformInterpolator {
    /// Starts with both snapshots equal to `initial`.
    #[must_use]
    pub fn new(initial: Transform) -> Self {
        Self {
            previous: initial.clone(),
            current: initial,
        }
    }

    /// Records the transform of a finished simulation step.
    ///
    /// A jump in distance from the origin above [`TELEPORT_DISTANCE`] resets
    /// both snapshots so the object does not streak across the screen.
    pub fn push(&mut self, transform: Transform) {
        let jump = (transform.position().length() - self.current.position().length()).abs();
        let previous = std::mem::replace(&mut self.current, transform);
        self.previous = if jump > TELEPORT_DISTANCE {
            self.current.clone()
        } else {
            previous
        };
    }

    /// Blend at `alpha` (clamped to `[0, 1]`) from the previous snapshot to
    /// the current one.
    ///
    /// Any axis rotating more than [`MAX_INTERPOLATED_ROTATION`] between
    /// snapshots returns the current transform unblended.
    #[must_use]
    pub fn interpolate(&self, alpha: f32) -> Transform {
        let delta = self.current.rotation_degrees() - self.previous.rotation_degrees();
        if delta.iter().any(|d| d.abs() > MAX_INTERPOLATED_ROTATION) {
            return self.current.clone();
        }
        let alpha = alpha.clamp(0.0, 1.0);
        Transform::new(
            self.previous.position().lerp(&self.current.position(), alpha),
            self.previous.rotation_degrees().lerp(&self.current.rotation_degrees(), alpha),
            self.previous.scale().lerp(&self.current.scale(), alpha),
        )
    }

    /// The most recent snapshot.
    #[must_use]
    pub const fn current(&self) -> &Transform {
        &self.current
    }
}
