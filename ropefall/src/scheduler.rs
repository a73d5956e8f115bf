//! Explicit frame scheduling: a fixed-timestep accumulator and the wiring
//! that drives one play session through it in a fixed, documented order.

use anyhow::Result;

use crate::input::{InputState, SidewaysInput};
use crate::session::GameSession;
use crate::swing::SwingController;

/// Fixed-timestep accumulator. The host feeds in (already time-scaled) frame
/// deltas; fixed updates fire once per accumulated `fixed_dt`.
pub struct FrameScheduler {
    fixed_dt: f32,
    accumulator: f32,
}

impl FrameScheduler {
    /// 60 Hz fixed timestep.
    pub fn new() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            accumulator: 0.0,
        }
    }

    #[must_use]
    pub fn with_fixed_dt(mut self, fixed_dt: f32) -> Self {
        self.fixed_dt = fixed_dt;
        self
    }

    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Bank a frame's worth of time.
    pub fn accumulate(&mut self, dt: f32) {
        self.accumulator += dt;
    }

    /// Check if a fixed timestep update should run and consume accumulated
    /// time. Call in a loop until it returns `false` to handle multiple
    /// fixed updates per frame.
    pub fn should_run_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            true
        } else {
            false
        }
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a session, its input translation, and its swing forces through a
/// [`FrameScheduler`].
///
/// Each `advance` runs, in order:
/// 1. sideways input sampling (once per frame, wall-clock);
/// 2. per-frame session work (camera, deferred-reset countdown) with
///    game-scaled time;
/// 3. zero or more fixed steps, each applying swing forces, stepping
///    physics, and routing trigger events - frozen time runs none;
/// 4. clearing of per-frame input flags.
///
/// The swing controller is rebound whenever the session spawns a fresh
/// gnome.
pub struct GameLoop {
    scheduler: FrameScheduler,
    session: GameSession,
    input: InputState,
    sideways: SidewaysInput,
    swing: Option<SwingController>,
}

impl GameLoop {
    pub fn new(session: GameSession, sideways: SidewaysInput) -> Self {
        Self {
            scheduler: FrameScheduler::new(),
            session,
            input: InputState::new(),
            sideways,
            swing: None,
        }
    }

    #[must_use]
    pub fn with_scheduler(mut self, scheduler: FrameScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Advance the game by one frame of `raw_dt` wall-clock seconds.
    pub fn advance(&mut self, raw_dt: f32) -> Result<()> {
        self.sideways.sample(&self.input);

        let scale = self.session.time_scale();
        self.session.tick(raw_dt * scale)?;
        self.bind_swing();

        self.scheduler.accumulate(raw_dt * scale);
        while self.scheduler.should_run_fixed_update() {
            if let Some(swing) = &mut self.swing {
                swing.fixed_tick(self.sideways.value(), self.session.physics_mut());
            }
            self.session.step_physics(self.scheduler.fixed_dt())?;
            self.bind_swing();
        }

        self.input.begin_frame();
        Ok(())
    }

    fn bind_swing(&mut self) {
        if let Some(gnome) = self.session.current_gnome() {
            let bound = self.swing.as_ref().map(SwingController::entity);
            if bound != Some(gnome) {
                self.swing = Some(SwingController::new(
                    gnome,
                    self.session.config().swing_sensitivity,
                ));
            }
        }
        // With no gnome the stale controller is left alone; it disables
        // itself when it finds the body gone.
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    /// The host pushes keyboard events here.
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// The host pushes tilt readings here.
    pub fn sideways_mut(&mut self) -> &mut SidewaysInput {
        &mut self.sideways
    }

    pub fn sideways(&self) -> &SidewaysInput {
        &self.sideways
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use winit::keyboard::KeyCode;

    #[test]
    fn accumulated_time_yields_whole_fixed_steps() {
        let mut scheduler = FrameScheduler::new().with_fixed_dt(0.01);
        scheduler.accumulate(0.035);

        let mut steps = 0;
        while scheduler.should_run_fixed_update() {
            steps += 1;
        }
        assert_eq!(steps, 3);

        // The remainder carries over to the next frame.
        scheduler.accumulate(0.005);
        assert!(scheduler.should_run_fixed_update());
        assert!(!scheduler.should_run_fixed_update());
    }

    #[test]
    fn frozen_time_runs_no_fixed_steps() {
        let mut game = GameLoop::new(
            GameSession::new(SessionConfig::default()),
            SidewaysInput::keyboard(),
        );
        game.session_mut().reset().unwrap();
        game.session_mut().set_paused(true);
        let gnome = game.session().current_gnome().unwrap();
        let before = game.session().physics().body_position(gnome).unwrap();

        for _ in 0..30 {
            game.advance(1.0 / 60.0).unwrap();
        }

        let after = game.session().physics().body_position(gnome).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn held_key_swings_the_gnome_sideways() {
        let config = SessionConfig::default().with_swing_sensitivity(50_000.0);
        let mut game = GameLoop::new(GameSession::new(config), SidewaysInput::keyboard());
        game.session_mut().reset().unwrap();
        let gnome = game.session().current_gnome().unwrap();

        game.input_mut().press(KeyCode::KeyD);
        for _ in 0..30 {
            game.advance(1.0 / 60.0).unwrap();
        }

        assert!(game.session().physics().linear_velocity(gnome).unwrap().x > 0.0);
    }

    #[test]
    fn swing_rebinds_to_the_respawned_gnome() {
        let mut game = GameLoop::new(
            GameSession::new(SessionConfig::default()),
            SidewaysInput::keyboard(),
        );
        game.session_mut().reset().unwrap();
        let first = game.session().current_gnome().unwrap();

        game.session_mut().trap_touched().unwrap();
        // Ride out the deferred reset.
        for _ in 0..90 {
            game.advance(1.0 / 60.0).unwrap();
        }

        let second = game.session().current_gnome().unwrap();
        assert_ne!(first, second);
        assert_eq!(game.swing.as_ref().map(SwingController::entity), Some(second));
        assert!(game.swing.as_ref().unwrap().is_enabled());
    }
}
