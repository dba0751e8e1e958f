//! Keeps rotations bounded and transform matrices current.

use glesc_math::Vec3F;

use crate::ecs::{ComponentManager, ComponentSet, EcsCoordinator, Signature, System, SystemId};
use crate::error::EcsResult;
use crate::transform::Transform;

/// Wraps rotations past a full turn and refreshes dirty matrices.
///
/// Requires `{Transform}`.
#[derive(Debug, Default)]
pub struct TransformSystem;

impl TransformSystem {
    /// Registered name.
    pub const NAME: &'static str = "TransformSystem";

    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Brings each axis above -360 and below 360 degrees by a 720 degree step.
#[must_use]
pub fn wrap_rotation(degrees: Vec3F) -> Vec3F {
    degrees.map(|angle| {
        if angle < -360.0 {
            angle + 720.0
        } else if angle > 360.0 {
            angle - 720.0
        } else {
            angle
        }
    })
}

impl System for TransformSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn signature(&self, components: &mut ComponentManager) -> EcsResult<Signature> {
        <(Transform,)>::signature(components)
    }

    fn update(&mut self, id: SystemId, ecs: &mut EcsCoordinator, _delta_time: f32) -> EcsResult<()> {
        let tolerance = ecs.tolerance();
        for entity in ecs.system_entity_list(id)? {
            let transform = ecs.get_component_mut::<Transform>(entity)?;
            let rotation = transform.rotation_degrees();
            let wrapped = wrap_rotation(rotation);
            if wrapped != rotation {
                transform.set_rotation_degrees(wrapped);
            }
            if let Err(err) = transform.refresh(tolerance) {
                tracing::warn!(entity = %entity, error = %err, "transform has no normal matrix");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_rotation() {
        let wrapped = wrap_rotation(Vec3F::new(370.0, -400.0, 90.0));
        assert_eq!(wrapped, Vec3F::new(-350.0, 320.0, 90.0));
        assert_eq!(wrap_rotation(Vec3F::splat(360.0)), Vec3F::splat(360.0));
    }

    #[test]
    fn test_update_refreshes_and_wraps() {
        let mut ecs = EcsCoordinator::default();
        let mut system = TransformSystem::new();
        let signature = system.signature(ecs.components_mut()).unwrap();
        let id = ecs.register_system(TransformSystem::NAME, signature).unwrap();

        let e = ecs.create_entity().unwrap();
        let mut transform = Transform::default();
        transform.set_rotation_degrees(Vec3F::new(0.0, 450.0, 0.0));
        ecs.add_component(e, transform).unwrap();

        system.update(id, &mut ecs, 0.016).unwrap();
        let transform = ecs.get_component::<Transform>(e).unwrap();
        assert!(!transform.is_dirty());
        assert_eq!(transform.rotation_degrees(), Vec3F::new(0.0, -270.0, 0.0));
    }
}
