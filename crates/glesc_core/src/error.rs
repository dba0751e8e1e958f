//! # ECS Error Types
//!
//! Invariant violations in the ECS core. Expected absence (a name lookup
//! miss, probing for a component) is an `Option`, not an error.

use glesc_math::MathError;
use thiserror::Error;

use crate::ecs::{EntityId, SystemId};

/// Errors that can occur in the ECS core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EcsError {
    /// Every entity id is in use.
    #[error("entity capacity exceeded: at most {max} live entities")]
    EntityCapacityExceeded {
        /// Configured maximum.
        max: usize,
    },

    /// The entity was never created or has been destroyed.
    #[error("entity {0} is not alive")]
    EntityNotAlive(EntityId),

    /// Another live entity already uses this name.
    #[error("an entity named '{0}' already exists")]
    DuplicateEntityName(String),

    /// Every signature bit is taken.
    #[error("component type capacity exceeded: at most {max} component types")]
    ComponentCapacityExceeded {
        /// Configured maximum.
        max: usize,
    },

    /// The component type has no storage yet.
    #[error("component {0} is not registered")]
    ComponentNotRegistered(&'static str),

    /// Attaching a component the entity already holds.
    #[error("entity {entity} already has component {component}")]
    ComponentAlreadyPresent {
        /// The entity.
        entity: EntityId,
        /// Component type name.
        component: &'static str,
    },

    /// Removing or requiring a component the entity does not hold.
    #[error("entity {entity} has no component {component}")]
    ComponentMissing {
        /// The entity.
        entity: EntityId,
        /// Component type name.
        component: &'static str,
    },

    /// Both halves of a paired mutable borrow name the same type.
    #[error("component {0} borrowed mutably twice")]
    AliasedComponents(&'static str),

    /// A component value breaks a rule of its type.
    #[error("invalid {component}: {reason}")]
    InvalidComponent {
        /// Component type name.
        component: &'static str,
        /// The broken rule.
        reason: &'static str,
    },

    /// A system with this name already tracks entities.
    #[error("system '{0}' is already registered")]
    SystemAlreadyRegistered(String),

    /// Unknown system handle.
    #[error("system {0} is not registered")]
    SystemNotRegistered(SystemId),

    /// Numeric degeneracy surfaced by a system.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Rejected engine configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
