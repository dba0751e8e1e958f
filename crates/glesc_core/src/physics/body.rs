//! Rigid-body state integrated by the physics system.

use glesc_math::Vec3F;

use crate::config::PhysicsConfig;
use crate::ecs::Component;
use crate::error::{EcsError, EcsResult};

/// Motion state of an entity.
///
/// Forces accumulate between steps and are cleared after integration.
#[derive(Clone, Debug, PartialEq)]
pub struct Physics {
    mass: f32,
    /// Fraction of velocity lost per step while touching another body.
    pub friction: f32,
    /// Per-body air friction. `None` uses the configured default.
    pub air_friction: Option<f32>,
    /// Velocity in units per second.
    pub velocity: Vec3F,
    /// Acceleration computed by the last step.
    pub acceleration: Vec3F,
    /// Force accumulated since the last step.
    pub force: Vec3F,
    /// Static bodies never move and block dynamic ones.
    pub is_static: bool,
    /// Whether gravity applies.
    pub affected_by_gravity: bool,
    previous_position: Vec3F,
}

impl Component for Physics {}

impl Physics {
    /// Dynamic body with gravity and no friction.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidComponent`] unless `mass` is positive and finite.
    pub fn new(mass: f32) -> EcsResult<Self> {
        check_mass(mass)?;
        Ok(Self {
            mass,
            friction: 0.0,
            air_friction: None,
            velocity: Vec3F::zero(),
            acceleration: Vec3F::zero(),
            force: Vec3F::zero(),
            is_static: false,
            affected_by_gravity: true,
            previous_position: Vec3F::zero(),
        })
    }

    /// Immovable body of unit mass.
    #[must_use]
    pub fn fixed() -> Self {
        Self {
            mass: 1.0,
            friction: 0.0,
            air_friction: None,
            velocity: Vec3F::zero(),
            acceleration: Vec3F::zero(),
            force: Vec3F::zero(),
            is_static: true,
            affected_by_gravity: false,
            previous_position: Vec3F::zero(),
        }
    }

    /// Sets contact friction.
    #[must_use]
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Disables gravity.
    #[must_use]
    pub fn without_gravity(mut self) -> Self {
        self.affected_by_gravity = false;
        self
    }

    /// Mass.
    #[inline]
    #[must_use]
    pub const fn mass(&self) -> f32 {
        self.mass
    }

    /// Replaces the mass.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidComponent`] unless `mass` is positive and finite.
    pub fn set_mass(&mut self, mass: f32) -> EcsResult<()> {
        check_mass(mass)?;
        self.mass = mass;
        Ok(())
    }

    /// Adds to the force applied on the next step.
    pub fn add_force(&mut self, force: Vec3F) {
        self.force += force;
    }

    /// Position before the last physics step moved the body.
    #[inline]
    #[must_use]
    pub const fn previous_position(&self) -> Vec3F {
        self.previous_position
    }

    pub(crate) fn set_previous_position(&mut self, position: Vec3F) {
        self.previous_position = position;
    }

    /// Integrates accumulated force over `delta_time` and clears it.
    ///
    /// Static bodies lose all motion instead.
    pub fn integrate(&mut self, config: &PhysicsConfig, delta_time: f32) {
        if self.is_static {
            self.velocity = Vec3F::zero();
            self.acceleration = Vec3F::zero();
            self.force = Vec3F::zero();
            return;
        }

        let mut acceleration = self.force * config.force_scale / self.mass;
        if self.affected_by_gravity {
            acceleration += Vec3F::from_array(config.gravity) * config.gravity_scale;
        }
        self.acceleration = acceleration;
        self.velocity += acceleration * delta_time;

        let air_friction = match self.air_friction {
            Some(own) if own >= 0.0 => own,
            _ => config.air_friction,
        };
        self.velocity -= self.velocity * air_friction;
        self.force = Vec3F::zero();
    }
}

fn check_mass(mass: f32) -> EcsResult<()> {
    if mass > 0.0 && mass.is_finite() {
        Ok(())
    } else {
        Err(EcsError::InvalidComponent {
            component: "Physics",
            reason: "mass must be positive and finite",
        })
    }
}
