//! The rope that lowers and raises the gnome.

use crate::math::Vec2;
use crate::world::EntityId;

/// Connector between a fixed top anchor and the gnome's rope-anchor entity.
///
/// The session owns the rope and toggles its visibility; the gameplay HUD's
/// up/down buttons drive the winch. Length is the payout in world units.
#[derive(Clone, Debug)]
pub struct Rope {
    top_anchor: Vec2,
    connected: Option<EntityId>,
    length: f32,
    default_length: f32,
    min_length: f32,
    max_length: f32,
    winch_speed: f32,
    visible: bool,
}

impl Rope {
    pub fn new(top_anchor: Vec2, default_length: f32) -> Self {
        Self {
            top_anchor,
            connected: None,
            length: default_length,
            default_length,
            min_length: 1.0,
            max_length: default_length * 10.0,
            winch_speed: 50.0,
            visible: true,
        }
    }

    pub fn with_limits(mut self, min_length: f32, max_length: f32) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self.length = self.length.clamp(min_length, max_length);
        self
    }

    pub fn with_winch_speed(mut self, speed: f32) -> Self {
        self.winch_speed = speed;
        self
    }

    pub fn top_anchor(&self) -> Vec2 {
        self.top_anchor
    }

    pub fn set_top_anchor(&mut self, anchor: Vec2) {
        self.top_anchor = anchor;
    }

    /// Attach the trailing end to an entity (the gnome's ankle).
    pub fn connect(&mut self, entity: EntityId) {
        self.connected = Some(entity);
    }

    pub fn connected(&self) -> Option<EntityId> {
        self.connected
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn default_length(&self) -> f32 {
        self.default_length
    }

    pub fn set_default_length(&mut self, length: f32) {
        self.default_length = length.clamp(self.min_length, self.max_length);
    }

    /// Put the length back to the default (done for every fresh gnome).
    pub fn reset_length(&mut self) {
        self.length = self.default_length;
    }

    /// Pay out rope, lowering the gnome. Clamped to the maximum.
    pub fn extend(&mut self, dt: f32) {
        self.length = (self.length + self.winch_speed * dt).min(self.max_length);
    }

    /// Reel rope in, raising the gnome. Clamped to the minimum.
    pub fn retract(&mut self, dt: f32) {
        self.length = (self.length - self.winch_speed * dt).max(self.min_length);
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winching_clamps_to_limits() {
        let mut rope = Rope::new(Vec2::ZERO, 10.0).with_limits(2.0, 20.0).with_winch_speed(100.0);

        rope.extend(10.0);
        assert_eq!(rope.length(), 20.0);

        rope.retract(10.0);
        assert_eq!(rope.length(), 2.0);
    }

    #[test]
    fn reset_length_restores_the_default() {
        let mut rope = Rope::new(Vec2::ZERO, 10.0).with_limits(1.0, 50.0);
        rope.extend(0.5);
        assert_ne!(rope.length(), 10.0);
        rope.reset_length();
        assert_eq!(rope.length(), 10.0);
    }

    #[test]
    fn visibility_toggles() {
        let mut rope = Rope::new(Vec2::ZERO, 10.0);
        assert!(rope.is_visible());
        rope.hide();
        assert!(!rope.is_visible());
        rope.show();
        assert!(rope.is_visible());
    }
}
