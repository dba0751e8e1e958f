//! # Geometry
//!
//! Axis-aligned bounding volumes for broad-phase and per-axis collision.

use crate::matrix::Mat4F;
use crate::vector::Vec3F;

/// Axis-aligned box given by its minimum and maximum corners.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingVolume {
    min: Vec3F,
    max: Vec3F,
}

impl BoundingVolume {
    /// Creates a box from two corners. The corners are sorted per axis so
    /// `min <= max` always holds.
    #[must_use]
    pub fn new(a: Vec3F, b: Vec3F) -> Self {
        Self {
            min: Vec3F::new(a.x().min(b.x()), a.y().min(b.y()), a.z().min(b.z())),
            max: Vec3F::new(a.x().max(b.x()), a.y().max(b.y()), a.z().max(b.z())),
        }
    }

    /// Box of the given size centered on the origin.
    #[must_use]
    pub fn from_extents(width: f32, height: f32, depth: f32) -> Self {
        let half = Vec3F::new(width.abs(), height.abs(), depth.abs()) * 0.5;
        Self { min: -half, max: half }
    }

    /// Smallest box containing every point. `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3F>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |bv, p| bv.expanded_to(p)))
    }

    /// Minimum corner.
    #[inline]
    #[must_use]
    pub const fn min(&self) -> Vec3F {
        self.min
    }

    /// Maximum corner.
    #[inline]
    #[must_use]
    pub const fn max(&self) -> Vec3F {
        self.max
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec3F {
        (self.min + self.max) * 0.5
    }

    /// Extent on each axis.
    #[must_use]
    pub fn size(&self) -> Vec3F {
        self.max - self.min
    }

    /// Strict overlap test. Boxes that only touch do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|axis| self.min[axis] < other.max[axis] && self.max[axis] > other.min[axis])
    }

    /// Volume of the overlap, zero when the boxes do not overlap on every axis.
    #[must_use]
    pub fn intersection_volume(&self, other: &Self) -> f32 {
        let mut volume = 1.0;
        for axis in 0..3 {
            let depth = self.max[axis].min(other.max[axis]) - self.min[axis].max(other.min[axis]);
            if depth <= 0.0 {
                return 0.0;
            }
            volume *= depth;
        }
        volume
    }

    /// Inclusive point containment.
    #[must_use]
    pub fn contains(&self, point: Vec3F) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    /// The same box moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec3F) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Smallest box holding both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        self.expanded_to(other.min).expanded_to(other.max)
    }

    /// Axis-aligned box around the eight transformed corners.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4F) -> Self {
        let corners = (0..8_u8).map(|bits| {
            let pick = |axis: usize| {
                if bits & (1 << axis) == 0 {
                    self.min[axis]
                } else {
                    self.max[axis]
                }
            };
            matrix.transform_point(Vec3F::new(pick(0), pick(1), pick(2)))
        });
        // Eight corners, never empty.
        Self::from_points(corners).unwrap_or(*self)
    }

    fn expanded_to(self, p: Vec3F) -> Self {
        Self {
            min: Vec3F::new(self.min.x().min(p.x()), self.min.y().min(p.y()), self.min.z().min(p.z())),
            max: Vec3F::new(self.max.x().max(p.x()), self.max.y().max(p.y()), self.max.z().max(p.z())),
        }
    }
}
