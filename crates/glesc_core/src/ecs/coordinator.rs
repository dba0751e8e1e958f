//! # ECS Coordinator
//!
//! Facade over the entity, component and system managers. Every signature
//! change goes through here so system membership is exact after each call:
//! an entity is in a system's set iff its signature contains the system's
//! required signature.

use std::any::type_name;
use std::collections::BTreeSet;

use glesc_math::Tolerance;

use crate::config::EcsConfig;
use crate::ecs::component::{Component, ComponentArray, ComponentTypeId};
use crate::ecs::component_manager::ComponentManager;
use crate::ecs::entity::{EntityId, EntityManager, Signature};
use crate::ecs::system::{ComponentSet, SystemId, SystemManager};
use crate::error::{EcsError, EcsResult};

/// Owns all ECS state.
///
/// # Example
///
/// ```rust,ignore
/// let mut ecs = EcsCoordinator::new(&EcsConfig::default(), Tolerance::F32)?;
/// let player = ecs.create_named_entity("Player")?;
/// ecs.add_component(player, Transform::default())?;
/// ```
#[derive(Debug)]
pub struct EcsCoordinator {
    entities: EntityManager,
    components: ComponentManager,
    systems: SystemManager,
    tolerance: Tolerance,
}

impl EcsCoordinator {
    /// Creates an empty coordinator.
    ///
    /// # Errors
    ///
    /// [`EcsError::Config`] when `config.max_entities` is zero or does not
    /// fit in a `u32`.
    pub fn new(config: &EcsConfig, tolerance: Tolerance) -> EcsResult<Self> {
        Ok(Self {
            entities: EntityManager::new(config.max_entities)?,
            components: ComponentManager::new(config.max_components),
            systems: SystemManager::new(),
            tolerance,
        })
    }

    /// Engine-wide comparison tolerance.
    #[inline]
    #[must_use]
    pub const fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an unnamed entity.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityCapacityExceeded`] when every id is live.
    pub fn create_entity(&mut self) -> EcsResult<EntityId> {
        let id = self.entities.create_entity(None).map_err(|err| {
            tracing::error!(error = %err, "entity creation failed");
            err
        })?;
        tracing::trace!(entity = %id, "entity created");
        Ok(id)
    }

    /// Creates an entity with a unique name.
    ///
    /// # Errors
    ///
    /// Fails at capacity or when the name belongs to a live entity.
    pub fn create_named_entity(&mut self, name: &str) -> EcsResult<EntityId> {
        let id = self.entities.create_entity(Some(name)).map_err(|err| {
            tracing::error!(entity_name = name, error = %err, "entity creation failed");
            err
        })?;
        tracing::debug!(entity = %id, entity_name = name, "entity created");
        Ok(id)
    }

    /// Destroys an entity.
    ///
    /// Component data and system membership go first, the id is recycled
    /// last, so a later entity reusing the id starts clean.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotAlive`] when `id` is not live.
    pub fn destroy_entity(&mut self, id: EntityId) -> EcsResult<()> {
        if !self.entities.is_alive(id) {
            tracing::error!(entity = %id, "destroying an entity that is not alive");
            return Err(EcsError::EntityNotAlive(id));
        }
        self.components.entity_destroyed(id);
        self.systems.entity_destroyed(id);
        self.entities.destroy_entity(id)?;
        tracing::trace!(entity = %id, "entity destroyed");
        Ok(())
    }

    /// Whether `id` is live.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.is_alive(id)
    }

    /// Looks up a live entity by name.
    #[must_use]
    pub fn entity_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities.entity_by_name(name)
    }

    /// Name of a live entity, if it has one.
    #[must_use]
    pub fn entity_name(&self, id: EntityId) -> Option<&str> {
        self.entities.entity_name(id)
    }

    /// Signature of a live entity.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotAlive`] when `id` is not live.
    pub fn signature(&self, id: EntityId) -> EcsResult<Signature> {
        self.entities.signature(id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn living_count(&self) -> usize {
        self.entities.living_count()
    }

    /// Live entities in id order.
    #[must_use]
    pub fn living_entities(&self) -> Vec<EntityId> {
        self.entities.living_entities().map(|(id, _)| id).collect()
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Registers `T`, or returns its existing id.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentCapacityExceeded`] once every id is taken.
    pub fn register_component<T: Component>(&mut self) -> EcsResult<ComponentTypeId> {
        self.components.register_component::<T>()
    }

    /// Attaches `component` to `entity`, registering `T` on first use.
    ///
    /// # Errors
    ///
    /// Fails when the entity is not live, already has a `T`, or the type
    /// capacity is exhausted.
    pub fn add_component<T: Component>(&mut self, entity: EntityId, component: T) -> EcsResult<()> {
        let mut signature = self.entities.signature(entity).map_err(|err| {
            tracing::error!(component = type_name::<T>(), error = %err, "add_component on dead entity");
            err
        })?;
        let type_id = self.components.register_component::<T>()?;
        self.components.add_component(entity, component).map_err(|err| {
            tracing::error!(error = %err, "add_component rejected");
            err
        })?;

        signature.set(type_id.bit());
        self.entities.set_signature(entity, signature)?;
        self.systems.entity_signature_changed(entity, signature);
        tracing::trace!(entity = %entity, component = type_name::<T>(), "component added");
        Ok(())
    }

    /// Detaches and returns the `T` of `entity`.
    ///
    /// # Errors
    ///
    /// Fails when the entity is not live, `T` is unregistered, or the
    /// entity has no `T`.
    pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> EcsResult<T> {
        let mut signature = self.entities.signature(entity)?;
        let type_id = self
            .components
            .component_type::<T>()
            .ok_or(EcsError::ComponentNotRegistered(type_name::<T>()))?;
        let removed = self.components.remove_component::<T>(entity).map_err(|err| {
            tracing::error!(error = %err, "remove_component rejected");
            err
        })?;

        signature.clear(type_id.bit());
        self.entities.set_signature(entity, signature)?;
        self.systems.entity_signature_changed(entity, signature);
        tracing::trace!(entity = %entity, component = type_name::<T>(), "component removed");
        Ok(removed)
    }

    /// The `T` of `entity`. For system code, where absence means a broken
    /// invariant.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentMissing`] when the entity has no `T`.
    pub fn get_component<T: Component>(&self, entity: EntityId) -> EcsResult<&T> {
        self.components
            .get_component::<T>(entity)
            .ok_or_else(|| missing::<T>(entity))
    }

    /// Mutable `T` of `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentMissing`] when the entity has no `T`.
    pub fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> EcsResult<&mut T> {
        self.components
            .get_component_mut::<T>(entity)
            .ok_or_else(|| missing::<T>(entity))
    }

    /// Two different components of one entity, both mutable.
    ///
    /// # Errors
    ///
    /// Fails when either is missing or `A` and `B` are the same type.
    pub fn get_components_mut<A: Component, B: Component>(&mut self, entity: EntityId) -> EcsResult<(&mut A, &mut B)> {
        self.components.get_pair_mut::<A, B>(entity).map_err(|err| {
            tracing::error!(entity = %entity, error = %err, "paired component access failed");
            err
        })
    }

    /// The `T` of `entity`, if any. For gameplay probing.
    #[must_use]
    pub fn try_component<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.components.get_component::<T>(entity)
    }

    /// Mutable `T` of `entity`, if any.
    pub fn try_component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.components.get_component_mut::<T>(entity)
    }

    /// Whether `entity` holds a `T`. False for unregistered types.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: EntityId) -> bool {
        self.components.get_component::<T>(entity).is_some()
    }

    /// Dense storage of `T`.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotRegistered`] if `T` was never registered.
    pub fn component_array<T: Component>(&self) -> EcsResult<&ComponentArray<T>> {
        self.components.array::<T>()
    }

    /// Id of `T`, if registered.
    #[must_use]
    pub fn component_type<T: Component>(&self) -> Option<ComponentTypeId> {
        self.components.component_type::<T>()
    }

    /// Type name recorded for `id`.
    #[must_use]
    pub fn component_name(&self, id: ComponentTypeId) -> Option<&'static str> {
        self.components.component_name(id)
    }

    /// The component manager.
    #[must_use]
    pub fn components(&self) -> &ComponentManager {
        &self.components
    }

    /// The component manager, mutably. Used to register required sets.
    pub fn components_mut(&mut self) -> &mut ComponentManager {
        &mut self.components
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Registers a system and seeds its entity set from every live entity.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemAlreadyRegistered`] when `name` is taken.
    pub fn register_system(&mut self, name: &str, signature: Signature) -> EcsResult<SystemId> {
        let id = self.systems.register_system(name, signature).map_err(|err| {
            tracing::error!(error = %err, "system registration rejected");
            err
        })?;
        self.systems.seed(id, self.entities.living_entities())?;
        let members = self.systems.entities(id)?.len();
        tracing::debug!(system = name, id = %id, entities = members, "system registered");
        Ok(id)
    }

    /// Registers a system whose required signature is the component set `S`.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate name or exhausted component capacity.
    pub fn register_system_for<S: ComponentSet>(&mut self, name: &str) -> EcsResult<SystemId> {
        let signature = S::signature(&mut self.components)?;
        self.register_system(name, signature)
    }

    /// Cached entity set of a system.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotRegistered`] for an unknown id.
    pub fn system_entities(&self, id: SystemId) -> EcsResult<&BTreeSet<EntityId>> {
        self.systems.entities(id)
    }

    /// Snapshot of a system's entity set, for iterating while mutating
    /// components.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotRegistered`] for an unknown id.
    pub fn system_entity_list(&self, id: SystemId) -> EcsResult<Vec<EntityId>> {
        Ok(self.systems.entities(id)?.iter().copied().collect())
    }

    /// The system manager.
    #[must_use]
    pub fn systems(&self) -> &SystemManager {
        &self.systems
    }

    // =========================================================================
    // Invariant checks
    // =========================================================================

    /// Verifies that every system's set equals the live entities whose
    /// signature contains the system's required signature.
    #[must_use]
    pub fn check_system_membership(&self) -> bool {
        let mut ok = true;
        for id in self.systems.ids() {
            let (Ok(required), Ok(cached)) = (self.systems.signature(id), self.systems.entities(id)) else {
                return false;
            };
            let expected: BTreeSet<EntityId> = self
                .entities
                .living_entities()
                .filter(|(_, signature)| signature.contains(required))
                .map(|(entity, _)| entity)
                .collect();
            if &expected != cached {
                tracing::error!(system = %id, "system membership out of sync");
                ok = false;
            }
        }
        ok
    }

    /// Verifies that each component array holds exactly the live entities
    /// whose signature has its bit.
    #[must_use]
    pub fn check_component_storage(&self) -> bool {
        let mut ok = true;
        for raw in 0..self.components.registered_count() {
            #[allow(clippy::cast_possible_truncation)]
            let type_id = ComponentTypeId::new(raw as u8);
            let mut holders = 0;
            for (entity, signature) in self.entities.living_entities() {
                let flagged = signature.has(type_id.bit());
                if flagged != self.components.stores(type_id, entity) {
                    tracing::error!(entity = %entity, component = %type_id, "signature and storage disagree");
                    ok = false;
                }
                holders += usize::from(flagged);
            }
            if holders != self.components.stored_count(type_id) {
                tracing::error!(component = %type_id, "storage holds data for dead entities");
                ok = false;
            }
        }
        ok
    }
}

impl Default for EcsCoordinator {
    fn default() -> Self {
        Self {
            entities: EntityManager::default(),
            components: ComponentManager::new(EcsConfig::default().max_components),
            systems: SystemManager::new(),
            tolerance: Tolerance::F32,
        }
    }
}

fn missing<T: Component>(entity: EntityId) -> EcsError {
    tracing::error!(entity = %entity, component = type_name::<T>(), "required component missing");
    EcsError::ComponentMissing {
        entity,
        component: type_name::<T>(),
    }
}
