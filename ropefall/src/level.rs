//! JSON level descriptions: where the gnome starts, what it can hit on the
//! way down, and where the treasure and exit sit.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::entities::{DamageType, ExitGate, Hazard, Transform, Treasure};
use crate::math::Vec2;
use crate::physics::{BodyKind, ColliderShape};
use crate::session::{GameSession, Resettable, SessionConfig};
use crate::world::{EntityId, World};

/// Trigger-volume half extents for treasures and exits.
const PICKUP_HALF_EXTENTS: (f32, f32) = (14.0, 14.0);

fn default_rope_length() -> f32 {
    120.0
}

/// A static ledge or wall.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Platform {
    pub position: Vec2,
    pub half_extents: Vec2,
}

/// A deadly trigger volume and what touching it does to the gnome.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HazardZone {
    pub position: Vec2,
    pub half_extents: Vec2,
    pub damage: DamageType,
}

/// A complete level description, loadable from JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub spawn_point: Vec2,
    pub rope_anchor: Vec2,
    #[serde(default = "default_rope_length")]
    pub rope_length: f32,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub hazards: Vec<HazardZone>,
    #[serde(default)]
    pub treasures: Vec<Vec2>,
    #[serde(default)]
    pub exits: Vec<Vec2>,
}

impl Level {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse level JSON")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize level")
    }

    /// Session tuning derived from this level, with defaults elsewhere.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            spawn_point: self.spawn_point,
            rope_anchor: self.rope_anchor,
            rope_default_length: self.rope_length,
            ..SessionConfig::default()
        }
    }

    /// Populate a session's world and physics with this level's content and
    /// register the level's resettables.
    pub fn build(&self, session: &mut GameSession) -> Result<()> {
        session.rope_mut().set_top_anchor(self.rope_anchor);
        session.rope_mut().set_default_length(self.rope_length);

        for platform in &self.platforms {
            let e = session.world_mut().spawn();
            session.world_mut().insert(e, Transform::new(platform.position));
            session
                .physics_mut()
                .create_body(e, BodyKind::Fixed, platform.position, 0.0)?;
            session.physics_mut().add_collider(
                e,
                ColliderShape::Box {
                    hx: platform.half_extents.x,
                    hy: platform.half_extents.y,
                },
                Vec2::ZERO,
            )?;
        }

        for hazard in &self.hazards {
            let e = session.world_mut().spawn();
            session.world_mut().insert(e, Transform::new(hazard.position));
            session.world_mut().insert(e, Hazard::new(hazard.damage));
            session
                .physics_mut()
                .create_body(e, BodyKind::Fixed, hazard.position, 0.0)?;
            session.physics_mut().add_sensor(
                e,
                ColliderShape::Box {
                    hx: hazard.half_extents.x,
                    hy: hazard.half_extents.y,
                },
                Vec2::ZERO,
            )?;
        }

        let (hx, hy) = PICKUP_HALF_EXTENTS;
        let mut treasure_entities = Vec::new();
        for &position in &self.treasures {
            let e = session.world_mut().spawn();
            session.world_mut().insert(e, Transform::new(position));
            session.world_mut().insert(e, Treasure::default());
            session.physics_mut().create_body(e, BodyKind::Fixed, position, 0.0)?;
            session
                .physics_mut()
                .add_sensor(e, ColliderShape::Box { hx, hy }, Vec2::ZERO)?;
            treasure_entities.push(e);
        }
        session.register_resettable(Box::new(TreasureReset {
            treasures: treasure_entities,
        }));

        for &position in &self.exits {
            let e = session.world_mut().spawn();
            session.world_mut().insert(e, Transform::new(position));
            session.world_mut().insert(e, ExitGate);
            session.physics_mut().create_body(e, BodyKind::Fixed, position, 0.0)?;
            session
                .physics_mut()
                .add_sensor(e, ColliderShape::Box { hx, hy }, Vec2::ZERO)?;
        }

        log::debug!(
            "built level '{}': {} platforms, {} hazards, {} treasures, {} exits",
            self.name,
            self.platforms.len(),
            self.hazards.len(),
            self.treasures.len(),
            self.exits.len()
        );
        Ok(())
    }
}

/// Makes collected treasure collectible again on session reset.
struct TreasureReset {
    treasures: Vec<EntityId>,
}

impl Resettable for TreasureReset {
    fn reset(&mut self, world: &mut World) {
        for &e in &self.treasures {
            if let Some(treasure) = world.get_mut::<Treasure>(e) {
                treasure.collected = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL_JSON: &str = r#"{
        "name": "test well",
        "spawn_point": { "x": 0.0, "y": 0.0 },
        "rope_anchor": { "x": 0.0, "y": -40.0 },
        "rope_length": 200.0,
        "platforms": [
            { "position": { "x": -60.0, "y": 150.0 }, "half_extents": { "x": 40.0, "y": 8.0 } }
        ],
        "hazards": [
            { "position": { "x": 50.0, "y": 220.0 },
              "half_extents": { "x": 20.0, "y": 10.0 },
              "damage": "Burning" }
        ],
        "treasures": [ { "x": 0.0, "y": 300.0 } ],
        "exits": [ { "x": 0.0, "y": 500.0 } ]
    }"#;

    #[test]
    fn parses_a_level_description() {
        let level = Level::from_json(LEVEL_JSON).unwrap();
        assert_eq!(level.name, "test well");
        assert_eq!(level.rope_length, 200.0);
        assert_eq!(level.platforms.len(), 1);
        assert_eq!(level.hazards[0].damage, DamageType::Burning);
        assert_eq!(level.treasures.len(), 1);
        assert_eq!(level.exits.len(), 1);
    }

    #[test]
    fn missing_optional_sections_default_to_empty() {
        let level = Level::from_json(
            r#"{ "name": "bare", "spawn_point": {"x":0.0,"y":0.0}, "rope_anchor": {"x":0.0,"y":0.0} }"#,
        )
        .unwrap();
        assert!(level.platforms.is_empty());
        assert!(level.hazards.is_empty());
        assert_eq!(level.rope_length, 120.0);
    }

    #[test]
    fn build_populates_world_and_physics() {
        let level = Level::from_json(LEVEL_JSON).unwrap();
        let mut session = GameSession::new(level.session_config());
        level.build(&mut session).unwrap();

        assert_eq!(session.world().query::<Hazard>().len(), 1);
        assert_eq!(session.world().query::<Treasure>().len(), 1);
        assert_eq!(session.world().query::<ExitGate>().len(), 1);
        assert_eq!(session.rope().default_length(), 200.0);
    }

    #[test]
    fn session_reset_restores_collected_treasure() {
        let level = Level::from_json(LEVEL_JSON).unwrap();
        let mut session = GameSession::new(level.session_config());
        level.build(&mut session).unwrap();

        let (chest, _) = session.world().query::<Treasure>()[0];
        session.world_mut().get_mut::<Treasure>(chest).unwrap().collected = true;

        session.reset().unwrap();
        assert!(!session.world().get::<Treasure>(chest).unwrap().collected);
    }

    #[test]
    fn round_trips_through_json() {
        let level = Level::from_json(LEVEL_JSON).unwrap();
        let reparsed = Level::from_json(&level.to_json().unwrap()).unwrap();
        assert_eq!(reparsed.name, level.name);
        assert_eq!(reparsed.hazards.len(), level.hazards.len());
    }
}
