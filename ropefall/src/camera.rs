//! Camera tracking for the descending gnome, with dead-zone support.

use crate::entities::Transform;
use crate::math::Vec2;
use crate::physics::PhysicsWorld;
use crate::world::{EntityId, World};

/// Follows a target entity's physics position.
///
/// The camera stays put while the target sits inside the dead zone, then
/// trails it (optionally smoothed) once it strays outside. A cleared target
/// leaves the camera where it is.
#[derive(Clone, Copy, Debug)]
pub struct CameraTracker {
    position: Vec2,
    target: Option<EntityId>,
    dead_zone: Vec2,
    smooth_factor: Option<f32>,
}

impl CameraTracker {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            target: None,
            dead_zone: Vec2::new(100.0, 100.0),
            smooth_factor: None,
        }
    }

    pub fn with_dead_zone(mut self, width: f32, height: f32) -> Self {
        self.dead_zone = Vec2::new(width, height);
        self
    }

    /// Enable smoothed following (0.0 = frozen, 1.0 = instant).
    pub fn with_smoothing(mut self, factor: f32) -> Self {
        self.smooth_factor = Some(factor.clamp(0.0, 1.0));
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Start tracking an entity.
    pub fn follow(&mut self, entity: EntityId) {
        self.target = Some(entity);
    }

    /// Stop tracking.
    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Advance the camera toward the target. Call once per frame.
    ///
    /// The target's physics body wins when it has one; entities without a
    /// body (like the gnome's camera-target child) fall back to their
    /// transform.
    pub fn update(&mut self, world: &World, physics: &PhysicsWorld) {
        let Some(target) = self.target else {
            return;
        };
        let Some(target_pos) = physics
            .body_position(target)
            .or_else(|| world.get::<Transform>(target).map(|t| t.position))
        else {
            return;
        };

        let offset = target_pos - self.position;
        let half_zone = self.dead_zone * 0.5;
        if offset.x.abs() <= half_zone.x && offset.y.abs() <= half_zone.y {
            return;
        }

        // Clamp the target back to the dead-zone edge.
        let mut desired = self.position;
        if offset.x.abs() > half_zone.x {
            desired.x = target_pos.x - offset.x.signum() * half_zone.x;
        }
        if offset.y.abs() > half_zone.y {
            desired.y = target_pos.y - offset.y.signum() * half_zone.y;
        }

        self.position = match self.smooth_factor {
            Some(factor) => self.position + (desired - self.position) * factor,
            None => desired,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BodyKind;

    fn world_with_body(at: Vec2) -> (World, PhysicsWorld, EntityId) {
        let mut world = World::new();
        let mut physics = PhysicsWorld::with_gravity(Vec2::ZERO);
        let e = world.spawn();
        physics.create_body(e, BodyKind::Fixed, at, 0.0).unwrap();
        (world, physics, e)
    }

    #[test]
    fn target_inside_dead_zone_does_not_move_camera() {
        let (world, physics, e) = world_with_body(Vec2::new(10.0, 0.0));
        let mut camera = CameraTracker::new(Vec2::ZERO).with_dead_zone(100.0, 100.0);
        camera.follow(e);
        camera.update(&world, &physics);
        assert_eq!(camera.position(), Vec2::ZERO);
    }

    #[test]
    fn target_outside_dead_zone_pulls_camera() {
        let (world, physics, e) = world_with_body(Vec2::new(0.0, 300.0));
        let mut camera = CameraTracker::new(Vec2::ZERO).with_dead_zone(100.0, 100.0);
        camera.follow(e);
        camera.update(&world, &physics);
        assert_eq!(camera.position(), Vec2::new(0.0, 250.0));
    }

    #[test]
    fn bodiless_target_falls_back_to_its_transform() {
        let mut world = World::new();
        let physics = PhysicsWorld::with_gravity(Vec2::ZERO);
        let e = world.spawn();
        world.insert(e, Transform::new(Vec2::new(0.0, 300.0)));

        let mut camera = CameraTracker::new(Vec2::ZERO).with_dead_zone(100.0, 100.0);
        camera.follow(e);
        camera.update(&world, &physics);
        assert_eq!(camera.position(), Vec2::new(0.0, 250.0));
    }

    #[test]
    fn cleared_target_freezes_the_camera() {
        let (world, physics, e) = world_with_body(Vec2::new(0.0, 300.0));
        let mut camera = CameraTracker::new(Vec2::ZERO).with_dead_zone(100.0, 100.0);
        camera.follow(e);
        camera.clear_target();
        camera.update(&world, &physics);
        assert_eq!(camera.target(), None);
        assert_eq!(camera.position(), Vec2::ZERO);
    }
}
