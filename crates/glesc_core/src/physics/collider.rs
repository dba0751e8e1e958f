//! Axis-aligned collision shapes and per-step contact results.

use glesc_math::{BoundingVolume, Vec3F};

use crate::ecs::{Component, EntityId};

/// Contact results written by the collision system each step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionInformation {
    /// Blocked by or overlapping at least one other solid collider.
    pub colliding: bool,
    /// Movement on each axis was blocked and reverted.
    pub blocked_axes: [bool; 3],
    /// Resting on something below.
    pub on_ground: bool,
    /// `on_ground` of the previous step.
    pub was_on_ground: bool,
    /// Entities still overlapping this one after resolution, in id order.
    pub colliding_with: Vec<EntityId>,
    /// Entities that blocked this one's movement during the step, in id order.
    pub blocked_by: Vec<EntityId>,
}

impl CollisionInformation {
    /// Whether any axis was blocked.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.blocked_axes.iter().any(|&b| b)
    }
}

/// Axis-aligned box attached to an entity's position.
///
/// Only the translation of the owning transform moves the box. Rotation and
/// scale are ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct Collider {
    bounds: BoundingVolume,
    /// Non-solid colliders never collide.
    pub solid: bool,
    pub(crate) info: CollisionInformation,
}

impl Component for Collider {}

impl Collider {
    /// Solid collider with box `bounds` in local space.
    #[must_use]
    pub fn new(bounds: BoundingVolume) -> Self {
        Self {
            bounds,
            solid: true,
            info: CollisionInformation::default(),
        }
    }

    /// Solid box of the given size centred on the entity.
    #[must_use]
    pub fn from_extents(width: f32, height: f32, depth: f32) -> Self {
        Self::new(BoundingVolume::from_extents(width, height, depth))
    }

    /// Marks the collider non-solid.
    #[must_use]
    pub fn non_solid(mut self) -> Self {
        self.solid = false;
        self
    }

    /// Local-space box.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> BoundingVolume {
        self.bounds
    }

    /// Replaces the local-space box.
    pub fn set_bounds(&mut self, bounds: BoundingVolume) {
        self.bounds = bounds;
    }

    /// Box at `position` in world space.
    #[must_use]
    pub fn world_bounds(&self, position: Vec3F) -> BoundingVolume {
        self.bounds.translated(position)
    }

    /// Contact results of the last collision step.
    #[inline]
    #[must_use]
    pub const fn collision(&self) -> &CollisionInformation {
        &self.info
    }
}

/// Two solid colliders came into contact.
///
/// Emitted with `entity < other` on the first step a pair overlaps, and
/// again only after the pair has separated for at least one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionEvent {
    /// Lower id of the pair.
    pub entity: EntityId,
    /// Higher id of the pair.
    pub other: EntityId,
    /// Overlap volume before resolution on the step contact began.
    pub overlap: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_bounds_follow_position() {
        let collider = Collider::from_extents(2.0, 2.0, 2.0);
        let world = collider.world_bounds(Vec3F::new(10.0, 0.0, 0.0));
        assert_eq!(world.min(), Vec3F::new(9.0, -1.0, -1.0));
        assert_eq!(world.max(), Vec3F::new(11.0, 1.0, 1.0));
    }

    #[test]
    fn test_fresh_collider_has_no_contacts() {
        let collider = Collider::from_extents(1.0, 1.0, 1.0).non_solid();
        assert!(!collider.solid);
        assert!(!collider.collision().colliding);
        assert!(!collider.collision().is_blocked());
    }
}
