//! # Component Manager
//!
//! Assigns each component type a stable [`ComponentTypeId`] on first
//! registration and routes typed requests to its [`ComponentArray`].

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use crate::ecs::component::{Component, ComponentArray, ComponentTypeId, ErasedComponentArray};
use crate::ecs::entity::{EntityId, Signature};
use crate::error::{EcsError, EcsResult};

struct RegisteredComponent {
    name: &'static str,
    array: Box<dyn ErasedComponentArray>,
}

/// Owner of every component array.
pub struct ComponentManager {
    type_ids: HashMap<TypeId, ComponentTypeId>,
    /// Indexed by `ComponentTypeId`.
    registered: Vec<RegisteredComponent>,
    max_components: usize,
}

impl ComponentManager {
    /// Creates a manager accepting up to `max_components` types.
    ///
    /// The limit is clamped to the signature width.
    #[must_use]
    pub fn new(max_components: usize) -> Self {
        Self {
            type_ids: HashMap::new(),
            registered: Vec::new(),
            max_components: max_components.min(Signature::BITS),
        }
    }

    /// Registers `T`, or returns its existing id.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentCapacityExceeded`] once every id is taken.
    pub fn register_component<T: Component>(&mut self) -> EcsResult<ComponentTypeId> {
        if let Some(&id) = self.type_ids.get(&TypeId::of::<T>()) {
            return Ok(id);
        }
        let next = self.registered.len();
        if next >= self.max_components {
            tracing::error!(component = type_name::<T>(), max = self.max_components, "component type capacity exceeded");
            return Err(EcsError::ComponentCapacityExceeded {
                max: self.max_components,
            });
        }

        // `max_components` never exceeds 64, so the id fits in a u8
        #[allow(clippy::cast_possible_truncation)]
        let id = ComponentTypeId::new(next as u8);
        self.type_ids.insert(TypeId::of::<T>(), id);
        self.registered.push(RegisteredComponent {
            name: type_name::<T>(),
            array: Box::new(ComponentArray::<T>::new()),
        });
        tracing::debug!(component = type_name::<T>(), id = id.bit(), "registered component type");
        Ok(id)
    }

    /// Id of `T`, if registered.
    #[must_use]
    pub fn component_type<T: Component>(&self) -> Option<ComponentTypeId> {
        self.type_ids.get(&TypeId::of::<T>()).copied()
    }

    /// Type name recorded at registration.
    #[must_use]
    pub fn component_name(&self, id: ComponentTypeId) -> Option<&'static str> {
        self.registered.get(usize::from(id.bit())).map(|r| r.name)
    }

    /// Number of registered types.
    #[inline]
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    /// Typed array for `T`.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotRegistered`] if `T` was never registered.
    pub fn array<T: Component>(&self) -> EcsResult<&ComponentArray<T>> {
        let id = self.require::<T>()?;
        self.registered[usize::from(id.bit())]
            .array
            .as_any()
            .downcast_ref::<ComponentArray<T>>()
            .ok_or(EcsError::ComponentNotRegistered(type_name::<T>()))
    }

    /// Mutable typed array for `T`.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotRegistered`] if `T` was never registered.
    pub fn array_mut<T: Component>(&mut self) -> EcsResult<&mut ComponentArray<T>> {
        let id = self.require::<T>()?;
        typed_mut::<T>(&mut self.registered[usize::from(id.bit())])
    }

    /// Attaches `component` to `entity`.
    ///
    /// # Errors
    ///
    /// Fails if `T` is unregistered or the entity already holds one.
    pub fn add_component<T: Component>(&mut self, entity: EntityId, component: T) -> EcsResult<()> {
        self.array_mut::<T>()?.insert(entity, component)
    }

    /// Detaches and returns the component of `entity`.
    ///
    /// # Errors
    ///
    /// Fails if `T` is unregistered or the entity holds none.
    pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> EcsResult<T> {
        self.array_mut::<T>()?.remove(entity)
    }

    /// Component of `entity`, `None` when absent or unregistered.
    #[must_use]
    pub fn get_component<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.array::<T>().ok()?.get(entity)
    }

    /// Mutable component of `entity`, `None` when absent or unregistered.
    pub fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.array_mut::<T>().ok()?.get_mut(entity)
    }

    /// Mutable access to two different components of one entity.
    ///
    /// # Errors
    ///
    /// - [`EcsError::AliasedComponents`] when `A` and `B` are the same type
    /// - [`EcsError::ComponentNotRegistered`] or [`EcsError::ComponentMissing`]
    ///   when either component is unavailable
    pub fn get_pair_mut<A: Component, B: Component>(&mut self, entity: EntityId) -> EcsResult<(&mut A, &mut B)> {
        let ia = usize::from(self.require::<A>()?.bit());
        let ib = usize::from(self.require::<B>()?.bit());
        if ia == ib {
            return Err(EcsError::AliasedComponents(type_name::<A>()));
        }

        let (slot_a, slot_b) = if ia < ib {
            let (low, high) = self.registered.split_at_mut(ib);
            (&mut low[ia], &mut high[0])
        } else {
            let (low, high) = self.registered.split_at_mut(ia);
            (&mut high[0], &mut low[ib])
        };

        let a = typed_mut::<A>(slot_a)?
            .get_mut(entity)
            .ok_or(EcsError::ComponentMissing {
                entity,
                component: type_name::<A>(),
            })?;
        let b = typed_mut::<B>(slot_b)?
            .get_mut(entity)
            .ok_or(EcsError::ComponentMissing {
                entity,
                component: type_name::<B>(),
            })?;
        Ok((a, b))
    }

    /// Drops the entity's data from every array.
    pub fn entity_destroyed(&mut self, entity: EntityId) {
        for registered in &mut self.registered {
            if registered.array.entity_destroyed(entity) {
                tracing::trace!(entity = %entity, component = registered.name, "dropped component of destroyed entity");
            }
        }
    }

    /// Number of components stored for type `id`.
    #[must_use]
    pub fn stored_count(&self, id: ComponentTypeId) -> usize {
        self.registered.get(usize::from(id.bit())).map_or(0, |r| r.array.len())
    }

    /// Whether array `id` holds data for `entity`.
    #[must_use]
    pub fn stores(&self, id: ComponentTypeId, entity: EntityId) -> bool {
        self.registered
            .get(usize::from(id.bit()))
            .is_some_and(|r| r.array.contains(entity))
    }

    fn require<T: Component>(&self) -> EcsResult<ComponentTypeId> {
        self.component_type::<T>()
            .ok_or(EcsError::ComponentNotRegistered(type_name::<T>()))
    }
}

fn typed_mut<T: Component>(registered: &mut RegisteredComponent) -> EcsResult<&mut ComponentArray<T>> {
    registered
        .array
        .as_any_mut()
        .downcast_mut::<ComponentArray<T>>()
        .ok_or(EcsError::ComponentNotRegistered(type_name::<T>()))
}

impl std::fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentManager")
            .field("registered", &self.registered.iter().map(|r| r.name).collect::<Vec<_>>())
            .field("max_components", &self.max_components)
            .finish()
    }
}
