//! # Physics
//!
//! Components read by the physics and collision systems.

mod body;
mod collider;

pub use body::Physics;
pub use collider::{Collider, CollisionEvent, CollisionInformation};
