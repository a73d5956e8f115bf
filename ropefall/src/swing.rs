//! Applies sideways forces to the gnome's body so it can swing on the rope.

use crate::math::Vec2;
use crate::physics::PhysicsWorld;
use crate::world::EntityId;

/// Converts the sampled sideways value into a horizontal force on one body,
/// once per physics step.
///
/// If the body it depends on is gone at step time the controller disables
/// itself permanently; the session binds a fresh controller to each new
/// gnome.
pub struct SwingController {
    entity: EntityId,
    sensitivity: f32,
    enabled: bool,
}

impl SwingController {
    pub fn new(entity: EntityId, sensitivity: f32) -> Self {
        Self {
            entity,
            sensitivity,
            enabled: true,
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Run one physics step's worth of swing. `sideways` is the translated
    /// input value in [-1.0, 1.0].
    pub fn fixed_tick(&mut self, sideways: f32, physics: &mut PhysicsWorld) {
        if !self.enabled {
            return;
        }
        if !physics.has_body(self.entity) {
            log::debug!("swing target {:?} lost its body, disabling", self.entity);
            self.enabled = false;
            return;
        }
        physics.apply_force(self.entity, Vec2::new(sideways * self.sensitivity, 0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyKind, ColliderShape};
    use crate::world::World;

    #[test]
    fn swing_force_moves_the_body_sideways() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::with_gravity(Vec2::ZERO);
        let e = world.spawn();
        physics.create_body(e, BodyKind::Dynamic, Vec2::ZERO, 0.0).unwrap();
        physics.add_collider(e, ColliderShape::Circle { radius: 1.0 }, Vec2::ZERO).unwrap();

        let mut swing = SwingController::new(e, 100.0);
        for _ in 0..10 {
            swing.fixed_tick(1.0, &mut physics);
            physics.step(1.0 / 60.0);
        }

        assert!(swing.is_enabled());
        assert!(physics.linear_velocity(e).unwrap().x > 0.0);
    }

    #[test]
    fn missing_body_disables_the_controller_permanently() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::with_gravity(Vec2::ZERO);
        let e = world.spawn();

        let mut swing = SwingController::new(e, 100.0);
        swing.fixed_tick(1.0, &mut physics);
        assert!(!swing.is_enabled());

        // A body appearing later does not revive the controller.
        physics.create_body(e, BodyKind::Dynamic, Vec2::ZERO, 0.0).unwrap();
        swing.fixed_tick(1.0, &mut physics);
        physics.step(1.0 / 60.0);
        assert!(!swing.is_enabled());
        assert_eq!(physics.linear_velocity(e).unwrap().x, 0.0);
    }
}
