//! # Collision
//!
//! Broad phase: sort-and-sweep on X over boxes that cover each body's
//! movement during the step. Narrow phase: for each moving body, every axis
//! is tested alone, from the previous position moved along that axis only.
//! Blocked axes revert to the previous position.
//!
//! Only the end position of each axis move is tested, so a body that covers
//! more than a collider's thickness in one step passes through it.
//!
//! A [`CollisionEvent`] is sent when a pair first overlaps and not again
//! until the pair has separated. A body resting on the floor is pulled into
//! it and reverted every step, and stays one contact.
//!
//! Requires `{Transform, Collider}`. A [`Physics`] component is optional:
//! without one, or when static, an entity blocks others but never moves.

use std::collections::{BTreeMap, BTreeSet};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use glesc_math::{BoundingVolume, Vec3F};

use crate::config::PhysicsConfig;
use crate::ecs::{ComponentManager, ComponentSet, EcsCoordinator, EntityId, Signature, System, SystemId};
use crate::error::EcsResult;
use crate::physics::{Collider, CollisionEvent, CollisionInformation, Physics};
use crate::transform::Transform;

const Y_AXIS: usize = 1;

/// One collider as seen at the start of the step.
#[derive(Clone, Copy, Debug)]
struct Body {
    entity: EntityId,
    bounds: BoundingVolume,
    position: Vec3F,
    previous: Vec3F,
    current: BoundingVolume,
    swept: BoundingVolume,
    dynamic: bool,
    friction: f32,
}

/// Per-axis outcome for one moving body.
#[derive(Clone, Debug, Default)]
struct AxisContacts {
    blocked: [bool; 3],
    /// Other body lies on the negative side of the axis.
    from_below: [bool; 3],
    friction: f32,
    blocked_by: Vec<EntityId>,
}

/// Detects and resolves overlaps between solid colliders.
#[derive(Debug)]
pub struct PhysicsCollisionSystem {
    config: PhysicsConfig,
    events: Sender<CollisionEvent>,
    dropped_events: u64,
    /// Pairs in contact last step, lower id first.
    active_pairs: BTreeSet<(EntityId, EntityId)>,
}

impl PhysicsCollisionSystem {
    /// Registered name.
    pub const NAME: &'static str = "PhysicsCollisionSystem";

    /// Creates the system and the queue its collision events go to.
    #[must_use]
    pub fn new(config: PhysicsConfig) -> (Self, Receiver<CollisionEvent>) {
        let (events, receiver) = bounded(config.event_capacity);
        let system = Self {
            config,
            events,
            dropped_events: 0,
            active_pairs: BTreeSet::new(),
        };
        (system, receiver)
    }

    /// Events dropped because the queue was full.
    #[must_use]
    pub const fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    fn emit(&mut self, event: CollisionEvent) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                self.dropped_events += 1;
                tracing::warn!(
                    entity = %event.entity,
                    other = %event.other,
                    dropped = self.dropped_events,
                    "collision event dropped"
                );
            }
        }
    }

    fn gather(ecs: &EcsCoordinator, id: SystemId) -> EcsResult<Vec<Body>> {
        let mut bodies = Vec::new();
        for &entity in ecs.system_entities(id)? {
            let collider = ecs.get_component::<Collider>(entity)?;
            if !collider.solid {
                continue;
            }
            let position = ecs.get_component::<Transform>(entity)?.position();
            let physics = ecs.try_component::<Physics>(entity);
            let dynamic = physics.is_some_and(|p| !p.is_static);
            let previous = match physics {
                Some(p) if dynamic => p.previous_position(),
                _ => position,
            };
            let bounds = collider.bounds();
            let current = bounds.translated(position);
            let swept = bounds.translated(previous).union(&current);
            bodies.push(Body {
                entity,
                bounds,
                position,
                previous,
                current,
                swept,
                dynamic,
                friction: physics.map_or(0.0, |p| p.friction),
            });
        }
        Ok(bodies)
    }

    /// Index pairs whose swept boxes overlap on X, at least one dynamic or
    /// currently overlapping.
    fn candidate_pairs(bodies: &[Body]) -> Vec<(usize, usize)> {
        let mut order: Vec<usize> = (0..bodies.len()).collect();
        order.sort_by(|&a, &b| bodies[a].swept.min().x().total_cmp(&bodies[b].swept.min().x()));

        let mut pairs = Vec::new();
        for (i, &a) in order.iter().enumerate() {
            let max_x = bodies[a].swept.max().x();
            for &b in &order[i + 1..] {
                if bodies[b].swept.min().x() > max_x {
                    break;
                }
                if bodies[a].dynamic || bodies[b].dynamic || bodies[a].current.intersects(&bodies[b].current) {
                    pairs.push((a.min(b), a.max(b)));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    /// Tests each axis of `body`'s movement against `other`.
    fn test_axes(body: &Body, other: &Body, contacts: &mut AxisContacts) {
        let mut touched = false;
        for axis in 0..3 {
            if body.position[axis] == body.previous[axis] {
                continue;
            }
            let mut hypothetical = body.previous;
            hypothetical[axis] = body.position[axis];
            let hyp = body.bounds.translated(hypothetical);
            if hyp.intersects(&other.current) {
                contacts.blocked[axis] = true;
                contacts.from_below[axis] = other.current.min()[axis] < hyp.min()[axis];
                touched = true;
            }
        }
        if touched {
            contacts.friction += other.friction;
            contacts.blocked_by.push(other.entity);
        }
    }

    /// Reverts blocked axes and returns the resolved position.
    fn resolve(&self, ecs: &mut EcsCoordinator, body: &Body, contacts: &AxisContacts) -> EcsResult<Vec3F> {
        let was_on_ground = ecs.get_component::<Collider>(body.entity)?.info.on_ground;
        let on_ground = contacts.blocked[Y_AXIS] && contacts.from_below[Y_AXIS];

        let mut position = body.position;
        if contacts.blocked.iter().any(|&b| b) {
            for axis in 0..3 {
                if contacts.blocked[axis] {
                    position[axis] = body.previous[axis];
                }
            }
            let (transform, physics) = ecs.get_components_mut::<Transform, Physics>(body.entity)?;
            transform.set_position(position);
            physics.velocity = self.collision_response(physics, contacts, was_on_ground);
            tracing::trace!(entity = %body.entity, blocked = ?contacts.blocked, "movement blocked");
        }

        let collider = ecs.get_component_mut::<Collider>(body.entity)?;
        collider.info.blocked_axes = contacts.blocked;
        collider.info.was_on_ground = was_on_ground;
        collider.info.on_ground = on_ground;
        Ok(position)
    }

    /// Bounces off the blocked axes when arriving fast from the air,
    /// otherwise stops on them and slides with contact friction.
    fn collision_response(&self, physics: &Physics, contacts: &AxisContacts, was_on_ground: bool) -> Vec3F {
        let velocity = physics.velocity;
        if !was_on_ground && velocity.length() > self.config.bounciness_threshold {
            let mut bounced = velocity * self.config.bounciness;
            for axis in 0..3 {
                if contacts.blocked[axis] {
                    let mut normal = Vec3F::zero();
                    normal[axis] = 1.0;
                    bounced = bounced.reflect(&normal);
                }
            }
            return bounced;
        }

        let keep = 1.0 - (physics.friction + contacts.friction).clamp(0.0, 1.0);
        let mut slid = velocity;
        for axis in 0..3 {
            slid[axis] = if contacts.blocked[axis] { 0.0 } else { slid[axis] * keep };
        }
        slid
    }
}

impl System for PhysicsCollisionSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn signature(&self, components: &mut ComponentManager) -> EcsResult<Signature> {
        <(Transform, Collider)>::signature(components)
    }

    fn update(&mut self, id: SystemId, ecs: &mut EcsCoordinator, _delta_time: f32) -> EcsResult<()> {
        let bodies = Self::gather(ecs, id)?;
        let pairs = Self::candidate_pairs(&bodies);

        let mut contacts: BTreeMap<usize, AxisContacts> = BTreeMap::new();
        let mut touching = BTreeSet::new();
        for &(a, b) in &pairs {
            let (first, second) = (&bodies[a], &bodies[b]);
            if first.dynamic {
                Self::test_axes(first, second, contacts.entry(a).or_default());
            }
            if second.dynamic {
                Self::test_axes(second, first, contacts.entry(b).or_default());
            }

            let overlap = first.current.intersection_volume(&second.current);
            if overlap > 0.0 {
                let key = (first.entity.min(second.entity), first.entity.max(second.entity));
                touching.insert(key);
                if !self.active_pairs.contains(&key) {
                    self.emit(CollisionEvent {
                        entity: key.0,
                        other: key.1,
                        overlap,
                    });
                }
            }
        }
        self.active_pairs = touching;

        let mut resolved = Vec::with_capacity(bodies.len());
        for (index, body) in bodies.iter().enumerate() {
            let box_at = if body.dynamic {
                let body_contacts = contacts.get(&index).cloned().unwrap_or_default();
                body.bounds.translated(self.resolve(ecs, body, &body_contacts)?)
            } else {
                body.current
            };
            resolved.push(box_at);
        }

        let mut overlapping: BTreeMap<EntityId, Vec<EntityId>> = BTreeMap::new();
        for &(a, b) in &pairs {
            if resolved[a].intersection_volume(&resolved[b]) > 0.0 {
                overlapping.entry(bodies[a].entity).or_default().push(bodies[b].entity);
                overlapping.entry(bodies[b].entity).or_default().push(bodies[a].entity);
            }
        }

        for (index, body) in bodies.iter().enumerate() {
            let mut with = overlapping.remove(&body.entity).unwrap_or_default();
            with.sort_unstable();
            let mut blocked_by = contacts.remove(&index).map(|c| c.blocked_by).unwrap_or_default();
            blocked_by.sort_unstable();
            let collider = ecs.get_component_mut::<Collider>(body.entity)?;
            collider.info.colliding = !with.is_empty() || !blocked_by.is_empty();
            collider.info.colliding_with = with;
            collider.info.blocked_by = blocked_by;
        }

        // Non-solid colliders keep no stale contacts
        for entity in ecs.system_entity_list(id)? {
            let collider = ecs.get_component_mut::<Collider>(entity)?;
            if !collider.solid && collider.info != CollisionInformation::default() {
                collider.info = CollisionInformation::default();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(config: PhysicsConfig) -> (EcsCoordinator, PhysicsCollisionSystem, SystemId, Receiver<CollisionEvent>) {
        let mut ecs = EcsCoordinator::default();
        let (system, events) = PhysicsCollisionSystem::new(config);
        let signature = system.signature(ecs.components_mut()).unwrap();
        let id = ecs.register_system(PhysicsCollisionSystem::NAME, signature).unwrap();
        (ecs, system, id, events)
    }

    fn moving_box(ecs: &mut EcsCoordinator, from: Vec3F, to: Vec3F, velocity: Vec3F) -> EntityId {
        let e = ecs.create_entity().unwrap();
        ecs.add_component(e, Transform::from_position(to)).unwrap();
        ecs.add_component(e, Collider::from_extents(1.0, 1.0, 1.0)).unwrap();
        let mut physics = Physics::new(1.0).unwrap();
        physics.set_previous_position(from);
        physics.velocity = velocity;
        ecs.add_component(e, physics).unwrap();
        e
    }

    /// Top face at y = 0.
    fn floor(ecs: &mut EcsCoordinator) -> EntityId {
        let e = ecs.create_entity().unwrap();
        ecs.add_component(e, Transform::from_position(Vec3F::new(0.0, -0.5, 0.0))).unwrap();
        ecs.add_component(e, Collider::from_extents(10.0, 1.0, 10.0)).unwrap();
        e
    }

    #[test]
    fn test_landing_reverts_y_and_sets_on_ground() {
        let (mut ecs, mut system, id, events) = setup(PhysicsConfig::default());
        let ground = floor(&mut ecs);
        // Resting on the floor top, falling slowly
        let body = moving_box(&mut ecs, Vec3F::new(0.0, 0.5, 0.0), Vec3F::new(0.0, 0.3, 0.0), Vec3F::new(0.0, -0.5, 0.0));

        system.update(id, &mut ecs, 0.016).unwrap();

        let transform = ecs.get_component::<Transform>(body).unwrap();
        assert_eq!(transform.position(), Vec3F::new(0.0, 0.5, 0.0));
        let info = ecs.get_component::<Collider>(body).unwrap().collision().clone();
        assert!(info.on_ground);
        assert!(info.blocked_axes[1]);
        assert!(!info.blocked_axes[0]);
        assert_eq!(ecs.get_component::<Physics>(body).unwrap().velocity, Vec3F::zero());

        let event = events.try_recv().unwrap();
        assert_eq!((event.entity, event.other), (ground, body));
        assert!(event.overlap > 0.0);
    }

    #[test]
    fn test_fast_airborne_hit_bounces() {
        let (mut ecs, mut system, id, _events) = setup(PhysicsConfig::default());
        floor(&mut ecs);
        let body = moving_box(&mut ecs, Vec3F::new(0.0, 0.5, 0.0), Vec3F::new(0.0, 0.2, 0.0), Vec3F::new(0.0, -10.0, 0.0));

        system.update(id, &mut ecs, 0.016).unwrap();
        // bounciness 0.5, reflected on Y
        assert_eq!(ecs.get_component::<Physics>(body).unwrap().velocity, Vec3F::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_sliding_on_ground_keeps_free_axes() {
        let (mut ecs, mut system, id, _events) = setup(PhysicsConfig::default());
        floor(&mut ecs);
        let body = moving_box(&mut ecs, Vec3F::new(0.0, 0.5, 0.0), Vec3F::new(0.1, 0.45, 0.0), Vec3F::new(2.0, -0.5, 0.0));
        ecs.get_component_mut::<Collider>(body).unwrap().info.on_ground = true;

        system.update(id, &mut ecs, 0.016).unwrap();
        let transform = ecs.get_component::<Transform>(body).unwrap();
        assert_eq!(transform.position(), Vec3F::new(0.1, 0.5, 0.0));
        let info = ecs.get_component::<Collider>(body).unwrap().collision().clone();
        assert!(info.was_on_ground);
        assert!(info.on_ground);
        assert_eq!(ecs.get_component::<Physics>(body).unwrap().velocity, Vec3F::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_non_solid_collider_is_ignored() {
        let (mut ecs, mut system, id, events) = setup(PhysicsConfig::default());
        let ghost = ecs.create_entity().unwrap();
        ecs.add_component(ghost, Transform::from_position(Vec3F::new(0.0, -1.0, 0.0))).unwrap();
        ecs.add_component(ghost, Collider::from_extents(10.0, 1.0, 10.0).non_solid()).unwrap();
        let body = moving_box(&mut ecs, Vec3F::new(0.0, 0.5, 0.0), Vec3F::new(0.0, 0.3, 0.0), Vec3F::new(0.0, -0.5, 0.0));

        system.update(id, &mut ecs, 0.016).unwrap();
        assert_eq!(ecs.get_component::<Transform>(body).unwrap().position(), Vec3F::new(0.0, 0.3, 0.0));
        assert!(events.try_recv().is_err());
        assert!(!ecs.get_component::<Collider>(ghost).unwrap().collision().colliding);
    }

    #[test]
    fn test_static_overlap_reports_both_sides() {
        let (mut ecs, mut system, id, events) = setup(PhysicsConfig::default());
        let a = ecs.create_entity().unwrap();
        ecs.add_component(a, Transform::default()).unwrap();
        ecs.add_component(a, Collider::from_extents(2.0, 2.0, 2.0)).unwrap();
        let b = ecs.create_entity().unwrap();
        ecs.add_component(b, Transform::from_position(Vec3F::new(1.0, 0.0, 0.0))).unwrap();
        ecs.add_component(b, Collider::from_extents(2.0, 2.0, 2.0)).unwrap();

        system.update(id, &mut ecs, 0.016).unwrap();
        assert_eq!(ecs.get_component::<Collider>(a).unwrap().collision().colliding_with, vec![b]);
        assert_eq!(ecs.get_component::<Collider>(b).unwrap().collision().colliding_with, vec![a]);
        let event = events.try_recv().unwrap();
        assert!((event.overlap - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_full_event_queue_drops() {
        let config = PhysicsConfig {
            event_capacity: 1,
            ..PhysicsConfig::default()
        };
        let (mut ecs, mut system, id, _events) = setup(config);
        for x in [0.0, 0.5, 1.0] {
            let e = ecs.create_entity().unwrap();
            ecs.add_component(e, Transform::from_position(Vec3F::new(x, 0.0, 0.0))).unwrap();
            ecs.add_component(e, Collider::from_extents(2.0, 2.0, 2.0)).unwrap();
        }
        system.update(id, &mut ecs, 0.016).unwrap();
        assert_eq!(system.dropped_events(), 2);
    }

    fn static_box(ecs: &mut EcsCoordinator, at: Vec3F, size: f32) -> EntityId {
        let e = ecs.create_entity().unwrap();
        ecs.add_component(e, Transform::from_position(at)).unwrap();
        ecs.add_component(e, Collider::from_extents(size, size, size)).unwrap();
        e
    }

    #[test]
    fn test_contact_event_sent_once_until_separated() {
        let (mut ecs, mut system, id, events) = setup(PhysicsConfig::default());
        static_box(&mut ecs, Vec3F::zero(), 2.0);
        let b = static_box(&mut ecs, Vec3F::new(1.0, 0.0, 0.0), 2.0);

        for _ in 0..3 {
            system.update(id, &mut ecs, 0.016).unwrap();
        }
        assert_eq!(events.try_iter().count(), 1);

        ecs.get_component_mut::<Transform>(b).unwrap().set_position(Vec3F::new(5.0, 0.0, 0.0));
        system.update(id, &mut ecs, 0.016).unwrap();
        assert_eq!(events.try_iter().count(), 0);

        ecs.get_component_mut::<Transform>(b).unwrap().set_position(Vec3F::new(1.0, 0.0, 0.0));
        system.update(id, &mut ecs, 0.016).unwrap();
        assert_eq!(events.try_iter().count(), 1);
    }

    #[test]
    fn test_resolved_contact_is_not_an_overlap() {
        let (mut ecs, mut system, id, _events) = setup(PhysicsConfig::default());
        let ground = floor(&mut ecs);
        let body = moving_box(&mut ecs, Vec3F::new(0.0, 0.5, 0.0), Vec3F::new(0.0, 0.45, 0.0), Vec3F::new(0.0, -0.5, 0.0));

        system.update(id, &mut ecs, 0.016).unwrap();
        let info = ecs.get_component::<Collider>(body).unwrap().collision().clone();
        assert!(info.colliding);
        assert!(info.colliding_with.is_empty());
        assert_eq!(info.blocked_by, vec![ground]);
        assert!(ecs.get_component::<Collider>(ground).unwrap().collision().colliding_with.is_empty());
    }

    #[test]
    fn test_two_moving_bodies_both_revert() {
        let (mut ecs, mut system, id, events) = setup(PhysicsConfig::default());
        let left = moving_box(&mut ecs, Vec3F::new(-1.0, 0.0, 0.0), Vec3F::new(-0.4, 0.0, 0.0), Vec3F::new(6.0, 0.0, 0.0));
        let right = moving_box(&mut ecs, Vec3F::new(1.0, 0.0, 0.0), Vec3F::new(0.4, 0.0, 0.0), Vec3F::new(-6.0, 0.0, 0.0));

        system.update(id, &mut ecs, 0.016).unwrap();

        assert_eq!(ecs.get_component::<Transform>(left).unwrap().position(), Vec3F::new(-1.0, 0.0, 0.0));
        assert_eq!(ecs.get_component::<Transform>(right).unwrap().position(), Vec3F::new(1.0, 0.0, 0.0));
        // Airborne and fast, so both bounce back at half speed
        assert_eq!(ecs.get_component::<Physics>(left).unwrap().velocity, Vec3F::new(-3.0, 0.0, 0.0));
        assert_eq!(ecs.get_component::<Physics>(right).unwrap().velocity, Vec3F::new(3.0, 0.0, 0.0));

        let left_info = ecs.get_component::<Collider>(left).unwrap().collision().clone();
        assert!(left_info.blocked_axes[0]);
        assert!(!left_info.on_ground);
        assert_eq!(left_info.blocked_by, vec![right]);
        assert_eq!(ecs.get_component::<Collider>(right).unwrap().collision().blocked_by, vec![left]);

        let event = events.try_recv().unwrap();
        assert_eq!((event.entity, event.other), (left, right));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_turning_non_solid_clears_contacts() {
        let (mut ecs, mut system, id, _events) = setup(PhysicsConfig::default());
        let a = static_box(&mut ecs, Vec3F::zero(), 2.0);
        let b = static_box(&mut ecs, Vec3F::new(1.0, 0.0, 0.0), 2.0);

        system.update(id, &mut ecs, 0.016).unwrap();
        assert!(ecs.get_component::<Collider>(a).unwrap().collision().colliding);

        ecs.get_component_mut::<Collider>(a).unwrap().solid = false;
        system.update(id, &mut ecs, 0.016).unwrap();

        assert_eq!(ecs.get_component::<Collider>(a).unwrap().collision(), &CollisionInformation::default());
        let other = ecs.get_component::<Collider>(b).unwrap().collision().clone();
        assert!(!other.colliding);
        assert!(other.colliding_with.is_empty());
    }

    #[test]
    fn test_sweep_skips_distant_bodies() {
        let (mut ecs, mut system, id, events) = setup(PhysicsConfig::default());
        let near_a = moving_box(&mut ecs, Vec3F::new(-0.1, 0.0, 0.0), Vec3F::zero(), Vec3F::new(6.0, 0.0, 0.0));
        let near_b = static_box(&mut ecs, Vec3F::new(0.8, 5.0, 0.0), 1.0);
        static_box(&mut ecs, Vec3F::new(10.0, 0.0, 0.0), 1.0);
        moving_box(&mut ecs, Vec3F::new(20.0, 0.0, 0.0), Vec3F::new(20.5, 0.0, 0.0), Vec3F::new(30.0, 0.0, 0.0));

        let bodies = PhysicsCollisionSystem::gather(&ecs, id).unwrap();
        let pairs = PhysicsCollisionSystem::candidate_pairs(&bodies);
        let entities: Vec<_> = pairs.iter().map(|&(a, b)| (bodies[a].entity, bodies[b].entity)).collect();
        assert_eq!(entities, vec![(near_a, near_b)]);

        system.update(id, &mut ecs, 0.016).unwrap();
        assert!(events.try_recv().is_err());
        assert!(!ecs.get_component::<Collider>(near_a).unwrap().collision().is_blocked());
        assert_eq!(ecs.get_component::<Transform>(near_a).unwrap().position(), Vec3F::zero());
    }

    #[test]
    fn test_fast_body_passes_thin_collider() {
        let (mut ecs, mut system, id, _events) = setup(PhysicsConfig::default());
        let e = ecs.create_entity().unwrap();
        ecs.add_component(e, Transform::from_position(Vec3F::new(0.0, -0.05, 0.0))).unwrap();
        ecs.add_component(e, Collider::from_extents(10.0, 0.1, 10.0)).unwrap();
        let body = moving_box(&mut ecs, Vec3F::new(0.0, 0.6, 0.0), Vec3F::new(0.0, -2.7, 0.0), Vec3F::new(0.0, -200.0, 0.0));

        system.update(id, &mut ecs, 0.016).unwrap();
        assert_eq!(ecs.get_component::<Transform>(body).unwrap().position(), Vec3F::new(0.0, -2.7, 0.0));
    }
}
