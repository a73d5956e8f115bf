//! Components for the objects that make up a play session.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;
use crate::world::{EntityId, World};

/// Transform component - position and rotation, with an optional parent for
/// simple rig hierarchies (the gnome's limbs parent to its root).
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: f32,
    /// Parent entity. None means this is a root entity.
    pub parent: Option<EntityId>,
}

impl Transform {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Direct children of an entity, found via `Transform::parent`.
pub fn children_of(world: &World, entity: EntityId) -> Vec<EntityId> {
    world
        .query::<Transform>()
        .into_iter()
        .filter_map(|(child, transform)| (transform.parent == Some(entity)).then_some(child))
        .collect()
}

/// Tag marking an entity as part of the controllable player. Trigger volumes
/// only react to entities carrying this tag, so stripping it silences a dead
/// gnome's collisions.
#[derive(Clone, Copy, Debug, Default)]
pub struct Player;

/// Classification of what killed the gnome; selects the damage presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageType {
    Slicing,
    Burning,
}

/// The gnome rig's root component.
///
/// `rope_anchor` and `camera_target` are child entities: the point the rope
/// clips onto (the gnome's ankle) and the point the camera tracks (its head).
#[derive(Clone, Copy, Debug)]
pub struct Gnome {
    pub holding_treasure: bool,
    pub rope_anchor: EntityId,
    pub camera_target: EntityId,
    /// Set when the gnome is told it has been destroyed.
    pub destroyed_by: Option<DamageType>,
    /// Most recent damage presentation, shown even when invincible.
    pub last_damage_effect: Option<DamageType>,
}

impl Gnome {
    pub fn new(rope_anchor: EntityId, camera_target: EntityId) -> Self {
        Self {
            holding_treasure: false,
            rope_anchor,
            camera_target,
            destroyed_by: None,
            last_damage_effect: None,
        }
    }
}

/// A deadly trigger volume.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Hazard {
    pub damage: DamageType,
}

impl Hazard {
    pub fn new(damage: DamageType) -> Self {
        Self { damage }
    }
}

/// A collectible treasure trigger volume. Stays in the world once collected;
/// level reset makes it collectible again.
#[derive(Clone, Copy, Debug, Default)]
pub struct Treasure {
    pub collected: bool,
}

/// The level exit trigger volume. Only ends the game for a treasure-holding
/// gnome.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExitGate;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_of_finds_direct_children_only() {
        let mut world = World::new();
        let root = world.spawn();
        let child_a = world.spawn();
        let child_b = world.spawn();
        let grandchild = world.spawn();
        let unrelated = world.spawn();

        world.insert(root, Transform::new(Vec2::ZERO));
        world.insert(child_a, Transform::new(Vec2::ZERO).with_parent(root));
        world.insert(child_b, Transform::new(Vec2::ZERO).with_parent(root));
        world.insert(grandchild, Transform::new(Vec2::ZERO).with_parent(child_a));
        world.insert(unrelated, Transform::new(Vec2::ZERO));

        let children = children_of(&world, root);
        assert_eq!(children, vec![child_a, child_b]);
    }
}
