//! # Built-in Systems
//!
//! Run order inside one engine step:
//!
//! ```text
//! PhysicsSystem -> PhysicsCollisionSystem -> TransformSystem   (simulation)
//! RenderSystem                                                  (presentation)
//! ```

mod collision;
mod physics;
mod render;
mod transform;

pub use collision::PhysicsCollisionSystem;
pub use physics::PhysicsSystem;
pub use render::RenderSystem;
pub use transform::{wrap_rotation, TransformSystem};
