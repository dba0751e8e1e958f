//! # Systems
//!
//! Two halves:
//! - [`SystemManager`] (owned by the coordinator) tracks which live entities
//!   satisfy each system's required signature.
//! - [`Schedule`] owns the [`System`] logic objects and runs them in order.
//!
//! Systems never hold references into component storage, only entity ids.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::ecs::component::Component;
use crate::ecs::component_manager::ComponentManager;
use crate::ecs::coordinator::EcsCoordinator;
use crate::ecs::entity::{EntityId, Signature};
use crate::error::{EcsError, EcsResult};

/// Handle returned when a system's membership is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SystemId(usize);

impl SystemId {
    /// Slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system:{}", self.0)
    }
}

/// Membership record for one system.
#[derive(Debug)]
struct SystemEntry {
    name: String,
    signature: Signature,
    entities: BTreeSet<EntityId>,
}

/// Keeps every system's cached entity set in sync with signature changes.
#[derive(Debug, Default)]
pub struct SystemManager {
    systems: Vec<SystemEntry>,
    by_name: HashMap<String, SystemId>,
}

impl SystemManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a system with an empty entity set.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemAlreadyRegistered`] when `name` is taken.
    pub fn register_system(&mut self, name: &str, signature: Signature) -> EcsResult<SystemId> {
        if self.by_name.contains_key(name) {
            return Err(EcsError::SystemAlreadyRegistered(name.to_owned()));
        }
        let id = SystemId(self.systems.len());
        self.systems.push(SystemEntry {
            name: name.to_owned(),
            signature,
            entities: BTreeSet::new(),
        });
        self.by_name.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Re-evaluates `entity` against every system.
    pub fn entity_signature_changed(&mut self, entity: EntityId, signature: Signature) {
        for system in &mut self.systems {
            if signature.contains(system.signature) {
                if system.entities.insert(entity) {
                    tracing::trace!(entity = %entity, system = %system.name, "entity joined system");
                }
            } else if system.entities.remove(&entity) {
                tracing::trace!(entity = %entity, system = %system.name, "entity left system");
            }
        }
    }

    /// Drops `entity` from every system.
    pub fn entity_destroyed(&mut self, entity: EntityId) {
        for system in &mut self.systems {
            system.entities.remove(&entity);
        }
    }

    /// Cached entity set of `id`.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotRegistered`] for an unknown id.
    pub fn entities(&self, id: SystemId) -> EcsResult<&BTreeSet<EntityId>> {
        self.entry(id).map(|e| &e.entities)
    }

    /// Required signature of `id`.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotRegistered`] for an unknown id.
    pub fn signature(&self, id: SystemId) -> EcsResult<Signature> {
        self.entry(id).map(|e| e.signature)
    }

    /// Name of `id`.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotRegistered`] for an unknown id.
    pub fn name(&self, id: SystemId) -> EcsResult<&str> {
        self.entry(id).map(|e| e.name.as_str())
    }

    /// Looks up a system by name.
    #[must_use]
    pub fn system_id(&self, name: &str) -> Option<SystemId> {
        self.by_name.get(name).copied()
    }

    /// All registered systems in registration order.
    pub fn ids(&self) -> impl Iterator<Item = SystemId> + '_ {
        (0..self.systems.len()).map(SystemId)
    }

    /// Number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Whether no system is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    fn entry(&self, id: SystemId) -> EcsResult<&SystemEntry> {
        self.systems.get(id.index()).ok_or(EcsError::SystemNotRegistered(id))
    }

    /// Fills the cached set of `id` from a scan of live entities.
    pub(crate) fn seed(
        &mut self,
        id: SystemId,
        living: impl IntoIterator<Item = (EntityId, Signature)>,
    ) -> EcsResult<()> {
        let entry = self
            .systems
            .get_mut(id.index())
            .ok_or(EcsError::SystemNotRegistered(id))?;
        let required = entry.signature;
        entry.entities = living
            .into_iter()
            .filter(|(_, signature)| signature.contains(required))
            .map(|(entity, _)| entity)
            .collect();
        Ok(())
    }
}

// =============================================================================
// REQUIRED COMPONENT SETS
// =============================================================================

/// A tuple of component types that together form a required signature.
///
/// Registering the set registers every member type.
pub trait ComponentSet {
    /// Registers each member and returns the combined signature.
    ///
    /// # Errors
    ///
    /// Fails when the component type capacity is exhausted.
    fn signature(components: &mut ComponentManager) -> EcsResult<Signature>;
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            fn signature(components: &mut ComponentManager) -> EcsResult<Signature> {
                let mut signature = Signature::EMPTY;
                $(signature.set(components.register_component::<$name>()?.bit());)+
                Ok(signature)
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);

// =============================================================================
// SYSTEM LOGIC
// =============================================================================

/// Per-frame logic over every entity matching a required signature.
pub trait System: Send {
    /// Unique name, used for registration and logs.
    fn name(&self) -> &str;

    /// Registers the required component types and returns their signature.
    ///
    /// # Errors
    ///
    /// Fails when the component type capacity is exhausted.
    fn signature(&self, components: &mut ComponentManager) -> EcsResult<Signature>;

    /// Runs one step. `id` identifies this system's cached entity set.
    ///
    /// # Errors
    ///
    /// A required component missing on a cached entity, or any other
    /// broken invariant.
    fn update(&mut self, id: SystemId, ecs: &mut EcsCoordinator, delta_time: f32) -> EcsResult<()>;
}

/// Ordered list of systems, run once per step.
#[derive(Default)]
pub struct Schedule {
    systems: Vec<(SystemId, Box<dyn System>)>,
}

impl Schedule {
    /// Creates an empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `system` with the coordinator and appends it.
    ///
    /// # Errors
    ///
    /// Fails if a system with the same name is already registered or the
    /// component type capacity is exhausted.
    pub fn add_system(&mut self, ecs: &mut EcsCoordinator, system: Box<dyn System>) -> EcsResult<SystemId> {
        let signature = system.signature(ecs.components_mut())?;
        let id = ecs.register_system(system.name(), signature)?;
        tracing::info!(system = system.name(), id = %id, "system added to schedule");
        self.systems.push((id, system));
        Ok(id)
    }

    /// Runs every system in insertion order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing system and returns its error.
    pub fn run(&mut self, ecs: &mut EcsCoordinator, delta_time: f32) -> EcsResult<()> {
        for (id, system) in &mut self.systems {
            if let Err(err) = system.update(*id, ecs, delta_time) {
                tracing::error!(system = system.name(), error = %err, "system update failed");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Names in run order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|(_, s)| s.name())
    }

    /// Number of systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Whether the schedule is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
