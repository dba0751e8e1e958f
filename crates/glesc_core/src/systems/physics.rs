//! Force integration and movement.

use crate::config::PhysicsConfig;
use crate::ecs::{ComponentManager, ComponentSet, EcsCoordinator, Signature, System, SystemId};
use crate::error::EcsResult;
use crate::physics::Physics;
use crate::transform::Transform;

/// Integrates forces and moves transforms by velocity.
///
/// Requires `{Transform, Physics}`. Records each body's position before
/// moving it so the collision system can revert blocked axes.
#[derive(Debug)]
pub struct PhysicsSystem {
    config: PhysicsConfig,
}

impl PhysicsSystem {
    /// Registered name.
    pub const NAME: &'static str = "PhysicsSystem";

    /// Creates the system with fixed constants.
    #[must_use]
    pub fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }
}

impl System for PhysicsSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn signature(&self, components: &mut ComponentManager) -> EcsResult<Signature> {
        <(Transform, Physics)>::signature(components)
    }

    fn update(&mut self, id: SystemId, ecs: &mut EcsCoordinator, delta_time: f32) -> EcsResult<()> {
        for entity in ecs.system_entity_list(id)? {
            let (transform, physics) = ecs.get_components_mut::<Transform, Physics>(entity)?;
            physics.set_previous_position(transform.position());
            physics.integrate(&self.config, delta_time);
            if !physics.is_static && physics.velocity.length_squared() > 0.0 {
                transform.add_position(physics.velocity * delta_time);
            }
        }
        Ok(())
    }
}
