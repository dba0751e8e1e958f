//! Perspective camera component.

use glesc_math::{Mat4F, MathError, MathResult, Tolerance, Vec3F, Vec4F};

use crate::ecs::Component;
use crate::transform::Transform;

/// Perspective camera looking down the owning transform's forward axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// Viewport width in pixels.
    pub viewport_width: f32,
    /// Viewport height in pixels.
    pub viewport_height: f32,
}

impl Component for Camera {}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}

impl Camera {
    /// Width over height.
    #[inline]
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.viewport_width / self.viewport_height
    }

    /// View matrix placing the eye at the transform's position.
    ///
    /// # Errors
    ///
    /// [`MathError::DegenerateBasis`] when forward and up are parallel.
    pub fn view(&self, transform: &Transform, tolerance: Tolerance) -> MathResult<Mat4F> {
        let eye = transform.position();
        Mat4F::look_at(eye, eye + transform.forward(), transform.up(), tolerance)
    }

    /// Perspective projection.
    ///
    /// # Errors
    ///
    /// [`MathError::InvalidProjection`] for a zero-sized viewport or bad
    /// clip planes.
    pub fn projection(&self, tolerance: Tolerance) -> MathResult<Mat4F> {
        if !(self.viewport_width > 0.0 && self.viewport_height > 0.0) {
            return Err(MathError::InvalidProjection("viewport must have positive size"));
        }
        Mat4F::perspective(
            self.fov_degrees.to_radians(),
            self.aspect_ratio(),
            self.near,
            self.far,
            tolerance,
        )
    }

    /// Maps a world point to viewport pixels.
    ///
    /// `x` grows right and `y` grows down from the top-left corner. `z` is
    /// depth in `[0, 1]`, larger meaning closer.
    ///
    /// # Errors
    ///
    /// [`MathError::PointAtInfinity`] for a point on the eye plane.
    pub fn world_to_viewport(&self, point: Vec3F, view: &Mat4F, projection: &Mat4F, tolerance: Tolerance) -> MathResult<Vec3F> {
        let clip: Vec4F = (*projection * *view) * point.homogenize();
        let ndc = clip.dehomogenize(tolerance)?;
        Ok(Vec3F::new(
            (ndc.x() + 1.0) * self.viewport_width / 2.0,
            (1.0 - ndc.y()) * self.viewport_height / 2.0,
            (1.0 - ndc.z()) / 2.0,
        ))
    }
}
