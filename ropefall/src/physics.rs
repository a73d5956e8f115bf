use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::math::Vec2;
use crate::world::EntityId;

// Rapier is a private implementation detail: do NOT re-export it.
use rapier2d::prelude::*;

/// Engine-facing rigid body type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Dynamic,
    Fixed,
}

/// Engine-facing collider shape.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum ColliderShape {
    Box { hx: f32, hy: f32 },
    Circle { radius: f32 },
}

/// Engine-facing contact event. Uses `EntityId` only; exits are not
/// interesting to this game, so only the enter edge is surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactEvent {
    ContactEnter { a: EntityId, b: EntityId },
    TriggerEnter { a: EntityId, b: EntityId },
}

/// Wrapper around the rapier2d simulation, keyed by `EntityId`.
///
/// Each entity owns at most one rigid body; trigger volumes are sensor
/// colliders whose enter events are drained once per step.
pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    rigid_bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,

    event_recv_collision: crossbeam_channel::Receiver<CollisionEvent>,
    event_recv_contact_force: crossbeam_channel::Receiver<ContactForceEvent>,
    event_handler: ChannelEventCollector,

    entity_to_body: HashMap<EntityId, RigidBodyHandle>,
    body_to_entity: HashMap<RigidBodyHandle, EntityId>,

    gravity: Vec2,
    pending_events: Vec<ContactEvent>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        let (send_col, recv_col) = crossbeam_channel::unbounded();
        let (send_force, recv_force) = crossbeam_channel::unbounded();
        let event_handler = ChannelEventCollector::new(send_col, send_force);

        Self {
            pipeline: PhysicsPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),

            event_recv_collision: recv_col,
            event_recv_contact_force: recv_force,
            event_handler,

            entity_to_body: HashMap::new(),
            body_to_entity: HashMap::new(),

            gravity: Vec2::new(0.0, 9.81),
            pending_events: Vec::new(),
        }
    }

    pub fn with_gravity(gravity: Vec2) -> Self {
        let mut world = Self::new();
        world.gravity = gravity;
        world
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Create a body for an entity, replacing any existing one (keeps the
    /// one-body-per-entity invariant).
    pub fn create_body(
        &mut self,
        entity: EntityId,
        kind: BodyKind,
        position: Vec2,
        rotation: f32,
    ) -> Result<()> {
        self.remove_body(entity);

        let rb_type = match kind {
            BodyKind::Dynamic => rapier2d::prelude::RigidBodyType::Dynamic,
            BodyKind::Fixed => rapier2d::prelude::RigidBodyType::Fixed,
        };

        let mut builder = RigidBodyBuilder::new(rb_type)
            .translation(vector![position.x, position.y])
            .rotation(rotation);

        // CCD keeps a fast-falling gnome from tunneling through thin traps.
        if matches!(kind, BodyKind::Dynamic) {
            builder = builder.ccd_enabled(true);
        }

        let handle = self.rigid_bodies.insert(builder.build());
        self.entity_to_body.insert(entity, handle);
        self.body_to_entity.insert(handle, entity);
        Ok(())
    }

    /// Remove a body (and its colliders) for an entity. Returns whether one
    /// existed.
    pub fn remove_body(&mut self, entity: EntityId) -> bool {
        if let Some(handle) = self.entity_to_body.remove(&entity) {
            self.rigid_bodies.remove(
                handle,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
            self.body_to_entity.remove(&handle);
            true
        } else {
            false
        }
    }

    /// Return true if an entity currently has a physics body.
    pub fn has_body(&self, entity: EntityId) -> bool {
        self.entity_to_body.contains_key(&entity)
    }

    /// Add a solid collider to an entity's body.
    pub fn add_collider(&mut self, entity: EntityId, shape: ColliderShape, offset: Vec2) -> Result<()> {
        let body = self.body_handle(entity)?;
        let collider = ColliderBuilder::new(to_rapier_shape(shape))
            .translation(vector![offset.x, offset.y])
            .build();
        self.colliders
            .insert_with_parent(collider, body, &mut self.rigid_bodies);
        Ok(())
    }

    /// Add a sensor (trigger volume) to an entity's body.
    pub fn add_sensor(&mut self, entity: EntityId, shape: ColliderShape, offset: Vec2) -> Result<()> {
        let body = self.body_handle(entity)?;
        let collider = ColliderBuilder::new(to_rapier_shape(shape))
            .translation(vector![offset.x, offset.y])
            .sensor(true)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.colliders
            .insert_with_parent(collider, body, &mut self.rigid_bodies);
        Ok(())
    }

    /// Step the simulation by a fixed dt (seconds).
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        let gravity = vector![self.gravity.x, self.gravity.y];
        let hooks = &();

        self.pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            hooks,
            &self.event_handler,
        );

        self.collect_events();
    }

    /// Drain contact events collected since the last step.
    pub fn drain_events(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn body_position(&self, entity: EntityId) -> Option<Vec2> {
        let handle = *self.entity_to_body.get(&entity)?;
        let body = self.rigid_bodies.get(handle)?;
        let t = body.translation();
        Some(Vec2::new(t.x, t.y))
    }

    pub fn linear_velocity(&self, entity: EntityId) -> Option<Vec2> {
        let handle = *self.entity_to_body.get(&entity)?;
        let body = self.rigid_bodies.get(handle)?;
        let v = body.linvel();
        Some(Vec2::new(v.x, v.y))
    }

    /// Apply a continuous force to an entity's body for the current step.
    pub fn apply_force(&mut self, entity: EntityId, force: Vec2) {
        if let Some(handle) = self.entity_to_body.get(&entity).copied() {
            if let Some(body) = self.rigid_bodies.get_mut(handle) {
                body.add_force(vector![force.x, force.y], true);
            }
        }
    }

    fn body_handle(&self, entity: EntityId) -> Result<RigidBodyHandle> {
        self.entity_to_body
            .get(&entity)
            .copied()
            .ok_or_else(|| anyhow!("Entity {:?} has no physics body", entity))
    }

    fn collect_events(&mut self) {
        while let Ok(event) = self.event_recv_collision.try_recv() {
            if let CollisionEvent::Started(c1, c2, _) = event {
                if let Some((a, b, is_trigger)) = self.map_pair(c1, c2) {
                    self.pending_events.push(if is_trigger {
                        ContactEvent::TriggerEnter { a, b }
                    } else {
                        ContactEvent::ContactEnter { a, b }
                    });
                }
            }
        }
        // Contact-force events are collected by rapier's channel handler but
        // this game has no use for them; keep the channel drained.
        while self.event_recv_contact_force.try_recv().is_ok() {}
    }

    fn map_pair(&self, c1: ColliderHandle, c2: ColliderHandle) -> Option<(EntityId, EntityId, bool)> {
        let col1 = self.colliders.get(c1)?;
        let col2 = self.colliders.get(c2)?;
        let e1 = *self.body_to_entity.get(&col1.parent()?)?;
        let e2 = *self.body_to_entity.get(&col2.parent()?)?;
        let is_trigger = col1.is_sensor() || col2.is_sensor();
        Some((e1, e2, is_trigger))
    }
}

fn to_rapier_shape(shape: ColliderShape) -> SharedShape {
    match shape {
        ColliderShape::Box { hx, hy } => SharedShape::cuboid(hx, hy),
        ColliderShape::Circle { radius } => SharedShape::ball(radius),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::World;

    #[test]
    fn create_body_replaces_existing_one() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::new();
        let e = world.spawn();

        physics.create_body(e, BodyKind::Dynamic, Vec2::new(1.0, 2.0), 0.0).unwrap();
        physics.create_body(e, BodyKind::Fixed, Vec2::new(5.0, 6.0), 0.0).unwrap();

        assert!(physics.has_body(e));
        let pos = physics.body_position(e).unwrap();
        assert_eq!((pos.x, pos.y), (5.0, 6.0));
    }

    #[test]
    fn remove_body_reports_whether_one_existed() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::new();
        let e = world.spawn();

        assert!(!physics.remove_body(e));
        physics.create_body(e, BodyKind::Dynamic, Vec2::ZERO, 0.0).unwrap();
        assert!(physics.remove_body(e));
        assert!(!physics.has_body(e));
    }

    #[test]
    fn dynamic_body_falls_under_gravity() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::with_gravity(Vec2::new(0.0, 100.0));
        let e = world.spawn();
        physics.create_body(e, BodyKind::Dynamic, Vec2::ZERO, 0.0).unwrap();
        physics.add_collider(e, ColliderShape::Circle { radius: 1.0 }, Vec2::ZERO).unwrap();

        for _ in 0..30 {
            physics.step(1.0 / 60.0);
        }

        assert!(physics.body_position(e).unwrap().y > 0.0);
    }

    #[test]
    fn overlapping_sensor_reports_trigger_enter() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::with_gravity(Vec2::ZERO);

        let solid = world.spawn();
        physics.create_body(solid, BodyKind::Dynamic, Vec2::ZERO, 0.0).unwrap();
        physics.add_collider(solid, ColliderShape::Circle { radius: 1.0 }, Vec2::ZERO).unwrap();

        let zone = world.spawn();
        physics.create_body(zone, BodyKind::Fixed, Vec2::ZERO, 0.0).unwrap();
        physics.add_sensor(zone, ColliderShape::Box { hx: 2.0, hy: 2.0 }, Vec2::ZERO).unwrap();

        physics.step(1.0 / 60.0);
        let events = physics.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            ContactEvent::TriggerEnter { a, b }
                if (*a == solid && *b == zone) || (*a == zone && *b == solid)
        )));
    }
}
