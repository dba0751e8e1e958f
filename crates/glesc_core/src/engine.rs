//! # Engine Frame Driver
//!
//! ```text
//! tick(delta_time):
//! ┌───────────────────────────────────────────────────────────┐
//! │ 1. SIMULATION (fixed or variable step)                    │
//! │    ├─ PhysicsSystem          forces -> velocity -> move   │
//! │    ├─ PhysicsCollisionSystem revert blocked axes, events  │
//! │    ├─ TransformSystem        wrap rotation, refresh       │
//! │    └─ user simulation systems                             │
//! │                                                           │
//! │ 2. PRESENTATION (once per tick)                           │
//! │    └─ RenderSystem           build and submit the frame   │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! With `physics.fixed_timestep` set, simulation runs zero or more whole
//! steps per tick and the leftover time is carried over. Without it, one
//! step of `delta_time` runs per tick.

use crossbeam_channel::Receiver;

use crate::config::EngineConfig;
use crate::ecs::{EcsCoordinator, Schedule, System, SystemId};
use crate::error::EcsResult;
use crate::physics::CollisionEvent;
use crate::render::Renderer;
use crate::systems::{PhysicsCollisionSystem, PhysicsSystem, RenderSystem, TransformSystem};

/// Fixed steps run by one tick at most. Time beyond this is dropped.
pub const MAX_STEPS_PER_TICK: u32 = 8;

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickStats {
    /// Tick counter, starting at 0.
    pub frame: u64,
    /// Simulation steps run.
    pub steps: u32,
    /// Leftover fraction of a fixed step, for interpolation. 0 without a
    /// fixed step.
    pub alpha: f32,
}

/// Owns the coordinator and both schedules.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    ecs: EcsCoordinator,
    simulation: Schedule,
    presentation: Schedule,
    collision_events: Receiver<CollisionEvent>,
    accumulator: f32,
    frame: u64,
}

impl Engine {
    /// Validates `config` and installs the physics, collision and transform
    /// systems.
    ///
    /// # Errors
    ///
    /// [`crate::EcsError::Config`] for an invalid configuration.
    pub fn new(config: EngineConfig) -> EcsResult<Self> {
        config.validate()?;
        let mut ecs = EcsCoordinator::new(&config.ecs, config.math.tolerance())?;
        let mut simulation = Schedule::new();

        let (collision, collision_events) = PhysicsCollisionSystem::new(config.physics.clone());
        simulation.add_system(&mut ecs, Box::new(PhysicsSystem::new(config.physics.clone())))?;
        simulation.add_system(&mut ecs, Box::new(collision))?;
        simulation.add_system(&mut ecs, Box::new(TransformSystem::new()))?;

        tracing::info!(
            max_entities = config.ecs.max_entities,
            max_components = config.ecs.max_components,
            fixed_timestep = ?config.physics.fixed_timestep,
            "engine created"
        );
        Ok(Self {
            config,
            ecs,
            simulation,
            presentation: Schedule::new(),
            collision_events,
            accumulator: 0.0,
            frame: 0,
        })
    }

    /// Feeds every tick's frame to `renderer`.
    ///
    /// # Errors
    ///
    /// [`crate::EcsError::SystemAlreadyRegistered`] if a renderer is
    /// already attached.
    pub fn attach_renderer(&mut self, renderer: Box<dyn Renderer>) -> EcsResult<SystemId> {
        self.presentation
            .add_system(&mut self.ecs, Box::new(RenderSystem::new(renderer)))
    }

    /// Appends a system to the simulation schedule, after the built-ins.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate name or exhausted component capacity.
    pub fn add_system(&mut self, system: Box<dyn System>) -> EcsResult<SystemId> {
        self.simulation.add_system(&mut self.ecs, system)
    }

    /// Advances by `delta_time` seconds.
    ///
    /// A negative or non-finite delta counts as zero.
    ///
    /// # Errors
    ///
    /// The first system failure. The tick stops there.
    pub fn tick(&mut self, delta_time: f32) -> EcsResult<TickStats> {
        let delta_time = if delta_time.is_finite() && delta_time >= 0.0 {
            delta_time
        } else {
            tracing::warn!(delta_time, "ignoring invalid frame delta");
            0.0
        };

        let (steps, alpha) = match self.config.physics.fixed_timestep {
            Some(step) => self.run_fixed(step, delta_time)?,
            None => {
                self.simulation.run(&mut self.ecs, delta_time)?;
                (1, 0.0)
            }
        };
        self.presentation.run(&mut self.ecs, delta_time)?;

        let stats = TickStats {
            frame: self.frame,
            steps,
            alpha,
        };
        tracing::trace!(frame = self.frame, steps, alpha, "tick finished");
        self.frame += 1;
        Ok(stats)
    }

    fn run_fixed(&mut self, step: f32, delta_time: f32) -> EcsResult<(u32, f32)> {
        self.accumulator += delta_time;
        let mut steps = 0;
        while self.accumulator >= step {
            if steps == MAX_STEPS_PER_TICK {
                tracing::warn!(
                    behind_seconds = self.accumulator,
                    "simulation cannot keep up, dropping time"
                );
                self.accumulator %= step;
                break;
            }
            self.simulation.run(&mut self.ecs, step)?;
            self.accumulator -= step;
            steps += 1;
        }
        Ok((steps, self.accumulator / step))
    }

    /// Collision events emitted since the last drain, oldest first.
    pub fn drain_collision_events(&self) -> Vec<CollisionEvent> {
        self.collision_events.try_iter().collect()
    }

    /// The coordinator.
    #[must_use]
    pub fn ecs(&self) -> &EcsCoordinator {
        &self.ecs
    }

    /// The coordinator, mutably.
    pub fn ecs_mut(&mut self) -> &mut EcsCoordinator {
        &mut self.ecs
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Simulation system names in run order.
    pub fn simulation_systems(&self) -> impl Iterator<Item = &str> {
        self.simulation.names()
    }
}

#[cfg(test)]
mod tests {
    use glesc_math::Vec3F;

    use super::*;
    use crate::physics::Physics;
    use crate::transform::Transform;

    fn fixed(step: f32) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.physics.fixed_timestep = Some(step);
        config
    }

    #[test]
    fn test_builtin_systems_in_order() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let names: Vec<_> = engine.simulation_systems().collect();
        assert_eq!(names, ["PhysicsSystem", "PhysicsCollisionSystem", "TransformSystem"]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.ecs.max_entities = 0;
        assert!(Engine::new(config).is_err());
    }

    #[test]
    fn test_fixed_step_accumulates() {
        let mut engine = Engine::new(fixed(0.01)).unwrap();
        let stats = engine.tick(0.025).unwrap();
        assert_eq!(stats.steps, 2);
        assert!((stats.alpha - 0.5).abs() < 1e-3);

        let stats = engine.tick(0.0075).unwrap();
        assert_eq!(stats.steps, 1);
        assert_eq!(stats.frame, 1);
        assert_eq!(engine.frame_count(), 2);
    }

    #[test]
    fn test_step_cap_drops_time() {
        let mut engine = Engine::new(fixed(0.01)).unwrap();
        let stats = engine.tick(1.0).unwrap();
        assert_eq!(stats.steps, MAX_STEPS_PER_TICK);
        assert!(stats.alpha < 1.0);
    }

    #[test]
    fn test_variable_step_moves_bodies() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let ecs = engine.ecs_mut();
        let e = ecs.create_entity().unwrap();
        ecs.add_component(e, Transform::from_position(Vec3F::new(0.0, 10.0, 0.0))).unwrap();
        ecs.add_component(e, Physics::new(1.0).unwrap()).unwrap();

        let stats = engine.tick(0.1).unwrap();
        assert_eq!(stats.steps, 1);
        let transform = engine.ecs().get_component::<Transform>(e).unwrap();
        assert!(transform.position().y() < 10.0);
        assert!(!transform.is_dirty());
    }

    #[test]
    fn test_invalid_delta_counts_as_zero() {
        let mut engine = Engine::new(fixed(0.01)).unwrap();
        assert_eq!(engine.tick(f32::NAN).unwrap().steps, 0);
        assert_eq!(engine.tick(-1.0).unwrap().steps, 0);
    }
}
