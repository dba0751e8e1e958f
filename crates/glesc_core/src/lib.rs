//! # GLESC Core
//!
//! Entity Component System with transform, physics, collision and render
//! feed systems on top.
//!
//! ## Architecture Rules
//!
//! 1. **Ids, not pointers** - Systems cache entity ids, never references
//!    into component storage
//! 2. **Dense storage** - Each component type lives in one packed array
//! 3. **One writer per step** - All ECS mutation happens on the simulation
//!    thread; the renderer is fed through a one-way queue
//!
//! ## Example
//!
//! ```rust,ignore
//! use glesc_core::{Collider, Engine, EngineConfig, Transform};
//!
//! let mut engine = Engine::new(EngineConfig::default())?;
//! let ecs = engine.ecs_mut();
//! let player = ecs.create_named_entity("Player")?;
//! ecs.add_component(player, Transform::default())?;
//! ecs.add_component(player, Collider::from_extents(1.0, 2.0, 1.0))?;
//! engine.tick(1.0 / 60.0)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod logging;
pub mod physics;
pub mod render;
pub mod systems;
pub mod transform;

pub use config::{EcsConfig, EngineConfig, LoggingConfig, MathConfig, PhysicsConfig};
pub use ecs::{Component, EcsCoordinator, EntityId, Schedule, Signature, System, SystemId};
pub use engine::{Engine, TickStats};
pub use error::{EcsError, EcsResult};
pub use logging::init_logging;
pub use physics::{Collider, CollisionEvent, CollisionInformation, Physics};
pub use render::{Camera, ChannelRenderer, RenderFrame, RenderPacket, Renderable, Renderer};
pub use systems::{PhysicsCollisionSystem, PhysicsSystem, RenderSystem, TransformSystem};
pub use transform::{Transform, TransformInterpolator};
