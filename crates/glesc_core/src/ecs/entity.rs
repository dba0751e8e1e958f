//! # Entity Management
//!
//! Entities are plain ids with a component signature. Never-used ids are
//! handed out first. Freed ids wait in a FIFO queue, so the most recently
//! destroyed id is the last to be reused. Per-id storage grows only as fresh
//! ids are taken.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use crate::config::DEFAULT_MAX_ENTITIES;
use crate::error::{EcsError, EcsResult};

/// Opaque entity handle. Unique while alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The id as a slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bitset of component types, one bit per `ComponentTypeId`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Signature(u64);

impl Signature {
    /// Number of distinct component types a signature can describe.
    pub const BITS: usize = 64;

    /// No components.
    pub const EMPTY: Self = Self(0);

    /// Creates a signature from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Sets bit `index`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `index >= 64`.
    #[inline]
    pub fn set(&mut self, index: u8) {
        debug_assert!((index as usize) < Self::BITS);
        self.0 |= 1 << index;
    }

    /// Clears bit `index`.
    #[inline]
    pub fn clear(&mut self, index: u8) {
        debug_assert!((index as usize) < Self::BITS);
        self.0 &= !(1 << index);
    }

    /// Checks bit `index`.
    #[inline]
    #[must_use]
    pub const fn has(self, index: u8) -> bool {
        self.0 & (1 << index) != 0
    }

    /// True when every bit of `required` is set here.
    #[inline]
    #[must_use]
    pub const fn contains(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// True when no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Union of two signatures.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Allocates entity ids and tracks signatures and names.
#[derive(Debug)]
pub struct EntityManager {
    /// Freed ids ready for reuse, oldest first.
    available: VecDeque<EntityId>,
    /// Lowest id never handed out.
    next_fresh: u32,
    /// Per-id signature; `None` while the id is free.
    signatures: Vec<Option<Signature>>,
    name_to_entity: HashMap<String, EntityId>,
    entity_to_name: HashMap<EntityId, String>,
    living: usize,
    max_entities: usize,
}

impl EntityManager {
    /// Creates a manager able to hold `max_entities` live entities.
    ///
    /// # Errors
    ///
    /// [`EcsError::Config`] when `max_entities` is zero or does not fit in a
    /// `u32`.
    pub fn new(max_entities: usize) -> EcsResult<Self> {
        if max_entities == 0 || u32::try_from(max_entities).is_err() {
            return Err(EcsError::Config(format!("max_entities must be in 1..={}", u32::MAX)));
        }
        Ok(Self::with_limit(max_entities))
    }

    fn with_limit(max_entities: usize) -> Self {
        Self {
            available: VecDeque::new(),
            next_fresh: 0,
            signatures: Vec::new(),
            name_to_entity: HashMap::new(),
            entity_to_name: HashMap::new(),
            living: 0,
            max_entities,
        }
    }

    /// Creates an entity with an empty signature.
    ///
    /// # Errors
    ///
    /// - [`EcsError::EntityCapacityExceeded`] when every id is live
    /// - [`EcsError::DuplicateEntityName`] when `name` is taken
    pub fn create_entity(&mut self, name: Option<&str>) -> EcsResult<EntityId> {
        if let Some(name) = name {
            if self.name_to_entity.contains_key(name) {
                return Err(EcsError::DuplicateEntityName(name.to_owned()));
            }
        }
        let id = if (self.next_fresh as usize) < self.max_entities {
            let id = EntityId(self.next_fresh);
            self.next_fresh += 1;
            self.signatures.push(None);
            id
        } else if let Some(id) = self.available.pop_front() {
            id
        } else {
            return Err(EcsError::EntityCapacityExceeded {
                max: self.max_entities,
            });
        };

        self.signatures[id.index()] = Some(Signature::EMPTY);
        if let Some(name) = name {
            self.name_to_entity.insert(name.to_owned(), id);
            self.entity_to_name.insert(id, name.to_owned());
        }
        self.living += 1;
        Ok(id)
    }

    /// Destroys a live entity, releasing its name and queueing its id.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotAlive`] when `id` is not live.
    pub fn destroy_entity(&mut self, id: EntityId) -> EcsResult<()> {
        if !self.is_alive(id) {
            return Err(EcsError::EntityNotAlive(id));
        }
        self.signatures[id.index()] = None;

        if let Some(name) = self.entity_to_name.remove(&id) {
            self.name_to_entity.remove(&name);
        }
        self.available.push_back(id);
        self.living -= 1;
        Ok(())
    }

    /// Whether `id` is live.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        matches!(self.signatures.get(id.index()), Some(Some(_)))
    }

    /// Current signature of a live entity.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotAlive`] when `id` is not live.
    pub fn signature(&self, id: EntityId) -> EcsResult<Signature> {
        self.signatures
            .get(id.index())
            .copied()
            .flatten()
            .ok_or(EcsError::EntityNotAlive(id))
    }

    /// Replaces the signature of a live entity.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotAlive`] when `id` is not live.
    pub fn set_signature(&mut self, id: EntityId, signature: Signature) -> EcsResult<()> {
        match self.signatures.get_mut(id.index()) {
            Some(Some(slot)) => {
                *slot = signature;
                Ok(())
            }
            _ => Err(EcsError::EntityNotAlive(id)),
        }
    }

    /// Looks up a live entity by name.
    #[must_use]
    pub fn entity_by_name(&self, name: &str) -> Option<EntityId> {
        self.name_to_entity.get(name).copied()
    }

    /// Name of a live entity, if it has one.
    #[must_use]
    pub fn entity_name(&self, id: EntityId) -> Option<&str> {
        self.entity_to_name.get(&id).map(String::as_str)
    }

    /// Live entities in id order.
    pub fn living_entities(&self) -> impl Iterator<Item = (EntityId, Signature)> + '_ {
        self.signatures
            .iter()
            .enumerate()
            .filter_map(|(i, sig)| sig.map(|s| (EntityId(i as u32), s)))
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub const fn living_count(&self) -> usize {
        self.living
    }

    /// Maximum number of live entities.
    #[inline]
    #[must_use]
    pub const fn max_entities(&self) -> usize {
        self.max_entities
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MAX_ENTITIES)
    }
}
