//! The play-session lifecycle: reset, death, win, pause, restart.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AudioSystem;
use crate::camera::CameraTracker;
use crate::entities::{children_of, DamageType, ExitGate, Gnome, Hazard, Player, Transform, Treasure};
use crate::math::Vec2;
use crate::physics::{BodyKind, ColliderShape, ContactEvent, PhysicsWorld};
use crate::rope::Rope;
use crate::ui::{MenuPanels, PanelId};
use crate::world::{EntityId, World};

/// Gnome rig geometry, in world units.
const GNOME_HALF_EXTENTS: (f32, f32) = (12.0, 20.0);
const ROPE_ANCHOR_OFFSET: Vec2 = Vec2 { x: 0.0, y: 18.0 };
const CAMERA_TARGET_OFFSET: Vec2 = Vec2 { x: 0.0, y: -18.0 };

/// Where the session currently is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
}

/// Session operations whose precondition is a live gnome report this instead
/// of faulting.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no active gnome")]
    NoActiveGnome,
}

/// Author-time tuning for a play session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Where a fresh gnome appears.
    pub spawn_point: Vec2,
    /// Where the rope hangs from.
    pub rope_anchor: Vec2,
    /// Rope payout for a fresh gnome.
    pub rope_default_length: f32,
    /// Seconds to wait after dying before creating a new gnome.
    pub delay_after_death: f32,
    /// If true, ignore all damage (but still show damage effects).
    pub invincible: bool,
    /// Bigger numbers = more swing.
    pub swing_sensitivity: f32,
    pub gravity: Vec2,
    /// Encoded clip played when the gnome dies, if any.
    pub gnome_died_clip: Option<Vec<u8>>,
    /// Encoded clip played when the game is won, if any.
    pub game_over_clip: Option<Vec<u8>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            spawn_point: Vec2::ZERO,
            rope_anchor: Vec2::ZERO,
            rope_default_length: 120.0,
            delay_after_death: 1.0,
            invincible: false,
            swing_sensitivity: 0.5,
            gravity: Vec2::new(0.0, 600.0),
            gnome_died_clip: None,
            game_over_clip: None,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_spawn_point(mut self, point: Vec2) -> Self {
        self.spawn_point = point;
        self
    }

    #[must_use]
    pub fn with_delay_after_death(mut self, seconds: f32) -> Self {
        self.delay_after_death = seconds;
        self
    }

    #[must_use]
    pub fn with_invincible(mut self, invincible: bool) -> Self {
        self.invincible = invincible;
        self
    }

    #[must_use]
    pub fn with_swing_sensitivity(mut self, sensitivity: f32) -> Self {
        self.swing_sensitivity = sensitivity;
        self
    }
}

/// A collaborator that can be told to return to its initial state on every
/// session reset (re-arming traps, restoring collected treasure, and so on).
pub trait Resettable {
    fn reset(&mut self, world: &mut World);
}

/// Central authority for starting, resetting, ending, and pausing a play
/// session; the sole component permitted to create or destroy the gnome.
///
/// Constructed explicitly and passed by reference wherever needed - there is
/// no global instance. Resettable collaborators register up front and are
/// notified in registration order.
pub struct GameSession {
    config: SessionConfig,
    state: SessionState,
    /// 1.0 while running, 0.0 while frozen; the pause flag derives from it.
    time_scale: f32,
    world: World,
    physics: PhysicsWorld,
    rope: Rope,
    camera: CameraTracker,
    panels: MenuPanels,
    audio: AudioSystem,
    resettables: Vec<Box<dyn Resettable>>,
    current_gnome: Option<EntityId>,
    /// Seconds until the deferred reset fires, if one is pending.
    pending_reset: Option<f32>,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        let physics = PhysicsWorld::with_gravity(config.gravity);
        let rope = Rope::new(config.rope_anchor, config.rope_default_length);
        let camera = CameraTracker::new(config.spawn_point);
        Self {
            physics,
            rope,
            camera,
            config,
            state: SessionState::Playing,
            time_scale: 1.0,
            world: World::new(),
            panels: MenuPanels::new(),
            audio: AudioSystem::new(),
            resettables: Vec::new(),
            current_gnome: None,
            pending_reset: None,
        }
    }

    /// Register a collaborator to be reset with the session. Order of
    /// registration is the order of notification.
    pub fn register_resettable(&mut self, resettable: Box<dyn Resettable>) {
        self.resettables.push(resettable);
    }

    /// Reset the entire game: gameplay UI up, every registered collaborator
    /// back to its initial state, a fresh gnome on the rope, time running.
    pub fn reset(&mut self) -> Result<()> {
        log::debug!("session reset");
        self.pending_reset = None;

        self.panels.hide(PanelId::GameOver);
        self.panels.hide(PanelId::MainMenu);
        self.panels.show(PanelId::GameplayHud);

        for resettable in &mut self.resettables {
            resettable.reset(&mut self.world);
        }

        self.spawn_gnome()?;

        self.time_scale = 1.0;
        self.state = SessionState::Playing;
        Ok(())
    }

    /// Advance per-frame session work: camera tracking and the deferred
    /// reset countdown. `scaled_dt` is already game-time-scaled, so frozen
    /// time holds the countdown still.
    pub fn tick(&mut self, scaled_dt: f32) -> Result<()> {
        self.sync_gnome_transforms();
        self.camera.update(&self.world, &self.physics);

        if let Some(remaining) = self.pending_reset.as_mut() {
            *remaining -= scaled_dt;
            if *remaining <= 0.0 {
                self.pending_reset = None;
                self.reset()?;
            }
        }
        Ok(())
    }

    /// Step the physics world once and route trigger contacts to the session
    /// entry points. Only `Player`-tagged entities trigger anything, so a
    /// dead, untagged gnome falls through traps silently.
    pub fn step_physics(&mut self, fixed_dt: f32) -> Result<()> {
        self.physics.step(fixed_dt);
        for event in self.physics.drain_events() {
            if let ContactEvent::TriggerEnter { a, b } = event {
                self.handle_trigger(a, b)?;
                self.handle_trigger(b, a)?;
            }
        }
        Ok(())
    }

    /// Called when the gnome touches a slicing trap.
    pub fn trap_touched(&mut self) -> Result<()> {
        log::debug!("trap touched");
        self.kill_gnome(DamageType::Slicing)
    }

    /// Called when the gnome touches a fire trap.
    pub fn fire_trap_touched(&mut self) -> Result<()> {
        log::debug!("fire trap touched");
        self.kill_gnome(DamageType::Burning)
    }

    /// Called when the gnome picks up the treasure.
    pub fn treasure_collected(&mut self) -> Result<()> {
        let gnome = self.current_gnome.ok_or(SessionError::NoActiveGnome)?;
        log::debug!("treasure collected");
        if let Some(gnome) = self.world.get_mut::<Gnome>(gnome) {
            gnome.holding_treasure = true;
        }
        Ok(())
    }

    /// Called when the gnome touches the exit. Ends the game only for a
    /// treasure-holding gnome; otherwise a silent no-op.
    pub fn exit_reached(&mut self) -> Result<()> {
        let holding = self
            .current_gnome
            .and_then(|g| self.world.get::<Gnome>(g))
            .is_some_and(|g| g.holding_treasure);
        if !holding {
            return Ok(());
        }

        log::debug!("exit reached with treasure: game over");
        self.play_optional_clip(self.config.game_over_clip.as_deref());

        self.time_scale = 0.0;
        self.panels.show(PanelId::GameOver);
        self.panels.hide(PanelId::GameplayHud);
        self.state = SessionState::GameOver;
        Ok(())
    }

    /// Called from the menu/resume buttons. Ignored once the game is over;
    /// the game-over screen is only left through a restart.
    pub fn set_paused(&mut self, paused: bool) {
        if self.state == SessionState::GameOver {
            log::debug!("pause request ignored in game-over");
            return;
        }
        if paused {
            self.time_scale = 0.0;
            self.panels.show(PanelId::MainMenu);
            self.panels.hide(PanelId::GameplayHud);
            self.state = SessionState::Paused;
        } else {
            self.time_scale = 1.0;
            self.panels.hide(PanelId::MainMenu);
            self.panels.show(PanelId::GameplayHud);
            self.state = SessionState::Playing;
        }
    }

    /// Called from the restart button. Destroys the current gnome outright -
    /// no kill path, no invincibility check - then resets.
    pub fn restart_game(&mut self) -> Result<()> {
        self.pending_reset = None;
        if let Some(gnome) = self.current_gnome.take() {
            self.physics.remove_body(gnome);
            for child in children_of(&self.world, gnome) {
                self.world.despawn(child);
            }
            self.world.despawn(gnome);
        }
        self.reset()
    }

    /// Kill the gnome with the given cause. The damage effect always shows;
    /// under invincibility nothing else happens.
    pub fn kill_gnome(&mut self, damage: DamageType) -> Result<()> {
        let gnome = self.current_gnome.ok_or(SessionError::NoActiveGnome)?;

        self.play_optional_clip(self.config.gnome_died_clip.as_deref());

        if let Some(gnome) = self.world.get_mut::<Gnome>(gnome) {
            gnome.last_damage_effect = Some(damage);
        }

        if !self.config.invincible {
            if let Some(gnome) = self.world.get_mut::<Gnome>(gnome) {
                gnome.destroyed_by = Some(damage);
            }
            // The corpse stops being simulated; the swing controller notices
            // the missing body and disables itself.
            self.physics.remove_body(gnome);
            self.remove_gnome();
            self.pending_reset = Some(self.config.delay_after_death);
        }
        Ok(())
    }

    /// Tear down the current gnome and wire up a fresh one.
    fn spawn_gnome(&mut self) -> Result<()> {
        self.remove_gnome();

        let spawn = self.config.spawn_point;
        let root = self.world.spawn();
        self.world.insert(root, Transform::new(spawn));
        self.world.insert(root, Player);

        let rope_anchor = self.world.spawn();
        self.world
            .insert(rope_anchor, Transform::new(spawn + ROPE_ANCHOR_OFFSET).with_parent(root));
        self.world.insert(rope_anchor, Player);

        let camera_target = self.world.spawn();
        self.world
            .insert(camera_target, Transform::new(spawn + CAMERA_TARGET_OFFSET).with_parent(root));
        self.world.insert(camera_target, Player);

        self.world.insert(root, Gnome::new(rope_anchor, camera_target));

        let (hx, hy) = GNOME_HALF_EXTENTS;
        self.physics.create_body(root, BodyKind::Dynamic, spawn, 0.0)?;
        self.physics.add_collider(root, ColliderShape::Box { hx, hy }, Vec2::ZERO)?;

        self.rope.show();
        self.rope.connect(rope_anchor);
        self.rope.reset_length();

        self.camera.follow(camera_target);

        self.current_gnome = Some(root);
        log::debug!("spawned gnome {:?}", root);
        Ok(())
    }

    /// Stop treating the current gnome as the player. Complete no-op while
    /// invincible. The corpse entity stays in the world, untagged so trigger
    /// volumes no longer react to it.
    fn remove_gnome(&mut self) {
        if self.config.invincible {
            return;
        }

        self.rope.hide();
        self.camera.clear_target();

        if let Some(gnome) = self.current_gnome.take() {
            if let Some(gnome) = self.world.get_mut::<Gnome>(gnome) {
                gnome.holding_treasure = false;
            }
            self.world.remove::<Player>(gnome);
            for child in children_of(&self.world, gnome) {
                self.world.remove::<Player>(child);
            }
        }
    }

    /// Keep the rig's transforms riding along with the simulated body so the
    /// camera target and rope anchor stay attached.
    fn sync_gnome_transforms(&mut self) {
        let Some(root) = self.current_gnome else { return };
        let Some(pos) = self.physics.body_position(root) else {
            return;
        };
        let rig = self.world.get::<Gnome>(root).copied();
        if let Some(transform) = self.world.get_mut::<Transform>(root) {
            transform.position = pos;
        }
        if let Some(rig) = rig {
            if let Some(transform) = self.world.get_mut::<Transform>(rig.rope_anchor) {
                transform.position = pos + ROPE_ANCHOR_OFFSET;
            }
            if let Some(transform) = self.world.get_mut::<Transform>(rig.camera_target) {
                transform.position = pos + CAMERA_TARGET_OFFSET;
            }
        }
    }

    fn handle_trigger(&mut self, toucher: EntityId, zone: EntityId) -> Result<()> {
        if !self.world.has::<Player>(toucher) {
            return Ok(());
        }

        if let Some(hazard) = self.world.get::<Hazard>(zone).copied() {
            match hazard.damage {
                DamageType::Slicing => self.trap_touched()?,
                DamageType::Burning => self.fire_trap_touched()?,
            }
        } else if let Some(treasure) = self.world.get::<Treasure>(zone).copied() {
            if !treasure.collected {
                if let Some(treasure) = self.world.get_mut::<Treasure>(zone) {
                    treasure.collected = true;
                }
                self.treasure_collected()?;
            }
        } else if self.world.has::<ExitGate>(zone) {
            self.exit_reached()?;
        }
        Ok(())
    }

    fn play_optional_clip(&self, clip: Option<&[u8]>) {
        let Some(clip) = clip else { return };
        if !self.audio.is_available() {
            return;
        }
        if let Err(e) = self.audio.play_clip(clip) {
            log::warn!("failed to play clip: {e:#}");
        }
    }

    // --- accessors ---

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn is_paused(&self) -> bool {
        self.state == SessionState::Paused
    }

    pub fn current_gnome(&self) -> Option<EntityId> {
        self.current_gnome
    }

    /// Seconds left on the deferred reset, if one is pending.
    pub fn pending_reset(&self) -> Option<f32> {
        self.pending_reset
    }

    pub fn is_invincible(&self) -> bool {
        self.config.invincible
    }

    pub fn set_invincible(&mut self, invincible: bool) {
        self.config.invincible = invincible;
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn rope_mut(&mut self) -> &mut Rope {
        &mut self.rope
    }

    pub fn camera(&self) -> &CameraTracker {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraTracker {
        &mut self.camera
    }

    pub fn panels(&self) -> &MenuPanels {
        &self.panels
    }

    pub fn audio(&self) -> &AudioSystem {
        &self.audio
    }
}
