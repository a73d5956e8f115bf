use std::collections::HashSet;

use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Tracks keyboard state across frames.
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_pressed: HashSet::new(),
        }
    }

    /// Clear per-frame pressed flags.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Handle a keyboard input event from winit.
    pub fn handle_key(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(keycode) = event.physical_key {
            match event.state {
                ElementState::Pressed => self.press(keycode),
                ElementState::Released => self.release(keycode),
            }
        }
    }

    /// Record a key press directly (used by scripted/headless hosts).
    pub fn press(&mut self, key: KeyCode) {
        if !self.keys_down.contains(&key) {
            self.keys_pressed.insert(key);
        }
        self.keys_down.insert(key);
    }

    /// Record a key release directly.
    pub fn release(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    /// Returns true if the key is currently held down.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// A one-dimensional keyboard axis (e.g. -1..1 horizontal movement).
#[derive(Clone, Debug)]
pub struct AxisKeys {
    /// Keys contributing negative direction (e.g. A, Left).
    pub negative: Vec<KeyCode>,
    /// Keys contributing positive direction (e.g. D, Right).
    pub positive: Vec<KeyCode>,
}

impl AxisKeys {
    pub fn new(negative: Vec<KeyCode>, positive: Vec<KeyCode>) -> Self {
        Self { negative, positive }
    }

    /// The usual left/right bindings: A/Left vs D/Right.
    pub fn horizontal() -> Self {
        Self::new(
            vec![KeyCode::KeyA, KeyCode::ArrowLeft],
            vec![KeyCode::KeyD, KeyCode::ArrowRight],
        )
    }

    /// Axis value in [-1.0, 1.0]. Both sides held cancel out.
    pub fn value(&self, input: &InputState) -> f32 {
        let mut value = 0.0;
        if self.negative.iter().any(|&k| input.is_key_down(k)) {
            value -= 1.0;
        }
        if self.positive.iter().any(|&k| input.is_key_down(k)) {
            value += 1.0;
        }
        value
    }
}

/// Where the sideways reading comes from.
///
/// Handheld builds feed accelerometer samples through `Tilt`; everything else
/// uses a keyboard axis. Absence of input hardware reads as 0.0, never an
/// error.
#[derive(Clone, Debug)]
pub enum SidewaysSource {
    Axis(AxisKeys),
    /// Tilt reading written by the platform layer via
    /// [`SidewaysInput::set_tilt`].
    Tilt,
}

/// Translates the platform input source into sideways motion info.
///
/// Sampled once per frame; the stored value is exposed read-only so other
/// components cannot change it. -1.0 = full left, +1.0 = full right.
pub struct SidewaysInput {
    source: SidewaysSource,
    tilt_reading: f32,
    value: f32,
}

impl SidewaysInput {
    pub fn new(source: SidewaysSource) -> Self {
        Self {
            source,
            tilt_reading: 0.0,
            value: 0.0,
        }
    }

    /// Keyboard-driven input with the default horizontal bindings.
    pub fn keyboard() -> Self {
        Self::new(SidewaysSource::Axis(AxisKeys::horizontal()))
    }

    /// Tilt-driven input; readings arrive via [`Self::set_tilt`].
    pub fn tilt() -> Self {
        Self::new(SidewaysSource::Tilt)
    }

    /// Store the latest accelerometer reading. Only meaningful for the
    /// `Tilt` source; picked up at the next `sample`.
    pub fn set_tilt(&mut self, reading: f32) {
        self.tilt_reading = reading;
    }

    /// Sample the input source and store the sideways value. Call once per
    /// frame.
    pub fn sample(&mut self, input: &InputState) {
        let raw = match &self.source {
            SidewaysSource::Axis(axis) => axis.value(input),
            SidewaysSource::Tilt => self.tilt_reading,
        };
        self.value = raw.clamp(-1.0, 1.0);
    }

    /// The sideways value sampled this frame, in [-1.0, 1.0].
    pub fn value(&self) -> f32 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_reads_zero_with_nothing_held() {
        let input = InputState::new();
        let mut sideways = SidewaysInput::keyboard();
        sideways.sample(&input);
        assert_eq!(sideways.value(), 0.0);
    }

    #[test]
    fn axis_reports_direction_and_cancels_out() {
        let mut input = InputState::new();
        let axis = AxisKeys::horizontal();

        input.press(KeyCode::KeyD);
        assert_eq!(axis.value(&input), 1.0);

        input.press(KeyCode::ArrowLeft);
        assert_eq!(axis.value(&input), 0.0);

        input.release(KeyCode::KeyD);
        assert_eq!(axis.value(&input), -1.0);
    }

    #[test]
    fn tilt_readings_are_clamped() {
        let input = InputState::new();
        let mut sideways = SidewaysInput::tilt();

        sideways.set_tilt(3.5);
        sideways.sample(&input);
        assert_eq!(sideways.value(), 1.0);

        sideways.set_tilt(-0.25);
        sideways.sample(&input);
        assert_eq!(sideways.value(), -0.25);
    }

    #[test]
    fn value_only_changes_on_sample() {
        let input = InputState::new();
        let mut sideways = SidewaysInput::tilt();
        sideways.set_tilt(0.5);
        assert_eq!(sideways.value(), 0.0);
        sideways.sample(&input);
        assert_eq!(sideways.value(), 0.5);
    }

    #[test]
    fn pressed_flag_clears_at_frame_start() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyA);
        assert!(input.is_key_pressed(KeyCode::KeyA));
        input.begin_frame();
        assert!(!input.is_key_pressed(KeyCode::KeyA));
        assert!(input.is_key_down(KeyCode::KeyA));
    }
}
