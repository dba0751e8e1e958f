//! # Component Storage
//!
//! Components are plain data attached to entities. Each component type
//! lives in its own [`ComponentArray`]: a dense `Vec` with no gaps, kept
//! dense by swapping the last element into any removed slot.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::ecs::entity::EntityId;
use crate::error::{EcsError, EcsResult};

/// Marker trait for ECS components.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug, Default)]
/// struct Health(f32);
///
/// impl Component for Health {}
/// ```
pub trait Component: Send + Sync + 'static {}

/// Small integer naming a registered component type. Doubles as the bit
/// index in a [`Signature`](crate::ecs::Signature).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ComponentTypeId(u8);

impl ComponentTypeId {
    /// Wraps a raw type id.
    #[inline]
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Signature bit for this type.
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component:{}", self.0)
    }
}

/// Dense storage for one component type.
///
/// Invariants:
/// - `components.len() == index_to_entity.len() == entity_to_index.len()`
/// - `entity_to_index[index_to_entity[i]] == i` for every slot `i`
#[derive(Debug)]
pub struct ComponentArray<T> {
    components: Vec<T>,
    entity_to_index: HashMap<EntityId, usize>,
    index_to_entity: Vec<EntityId>,
}

impl<T: Component> ComponentArray<T> {
    /// Creates an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            entity_to_index: HashMap::new(),
            index_to_entity: Vec::new(),
        }
    }

    /// Appends `component` for `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentAlreadyPresent`] if the entity already holds one.
    pub fn insert(&mut self, entity: EntityId, component: T) -> EcsResult<()> {
        if self.entity_to_index.contains_key(&entity) {
            return Err(EcsError::ComponentAlreadyPresent {
                entity,
                component: std::any::type_name::<T>(),
            });
        }
        let index = self.components.len();
        self.components.push(component);
        self.index_to_entity.push(entity);
        self.entity_to_index.insert(entity, index);
        Ok(())
    }

    /// Removes and returns the component of `entity`.
    ///
    /// The last slot moves into the freed one and both maps are updated
    /// for it.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentMissing`] if the entity holds no component here.
    pub fn remove(&mut self, entity: EntityId) -> EcsResult<T> {
        let Some(index) = self.entity_to_index.remove(&entity) else {
            return Err(EcsError::ComponentMissing {
                entity,
                component: std::any::type_name::<T>(),
            });
        };

        let removed = self.components.swap_remove(index);
        self.index_to_entity.swap_remove(index);

        // A different entity now sits at `index` unless we removed the tail
        if let Some(&moved) = self.index_to_entity.get(index) {
            self.entity_to_index.insert(moved, index);
        }
        Ok(removed)
    }

    /// Component of `entity`, if present.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.entity_to_index.get(&entity).map(|&i| &self.components[i])
    }

    /// Mutable component of `entity`, if present.
    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        let index = *self.entity_to_index.get(&entity)?;
        self.components.get_mut(index)
    }

    /// Whether `entity` holds this component.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entity_to_index.contains_key(&entity)
    }

    /// Number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the array is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Dense component slice, in storage order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.components
    }

    /// Owners of the dense slots, in storage order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.index_to_entity
    }

    /// `(owner, component)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.index_to_entity.iter().copied().zip(self.components.iter())
    }

    /// Mutable `(owner, component)` pairs in storage order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.index_to_entity.iter().copied().zip(self.components.iter_mut())
    }
}

impl<T: Component> Default for ComponentArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a [`ComponentArray`], held by the component manager.
pub trait ErasedComponentArray: Send + Sync {
    /// Drops the entity's component if it has one. Returns whether it did.
    fn entity_destroyed(&mut self, entity: EntityId) -> bool;

    /// Whether the entity holds this component.
    fn contains(&self, entity: EntityId) -> bool;

    /// Number of stored components.
    fn len(&self) -> usize;

    /// Whether the array is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedComponentArray for ComponentArray<T> {
    fn entity_destroyed(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_ok()
    }

    fn contains(&self, entity: EntityId) -> bool {
        ComponentArray::contains(self, entity)
    }

    fn len(&self) -> usize {
        ComponentArray::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
