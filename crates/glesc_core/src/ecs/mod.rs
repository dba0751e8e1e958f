//! # Entity Component System
//!
//! ## Design Philosophy
//!
//! - Entities are ids; all data lives in per-type dense arrays
//! - Component types get a signature bit at first registration
//! - Systems cache the ids of matching entities and nothing else
//! - One logical thread mutates ECS state per step, so nothing is locked

mod component;
mod component_manager;
mod coordinator;
mod entity;
mod system;

pub use component::{Component, ComponentArray, ComponentTypeId, ErasedComponentArray};
pub use component_manager::ComponentManager;
pub use coordinator::EcsCoordinator;
pub use entity::{EntityId, EntityManager, Signature};
pub use system::{ComponentSet, Schedule, System, SystemId, SystemManager};
