//! Scripted, headless play-through of a small well.
//!
//! The gnome is lowered in, brushes a fire trap on its first life, respawns
//! after the death delay, then drops straight down to collect the treasure
//! and reach the exit. Run with `RUST_LOG=debug` to watch the session's own
//! transitions.

use anyhow::Result;
use ropefall::{GameLoop, GameSession, Level, SessionState, SidewaysInput};

const WELL: &str = r#"{
    "name": "gnome's well",
    "spawn_point": { "x": 0.0, "y": 0.0 },
    "rope_anchor": { "x": 0.0, "y": -40.0 },
    "rope_length": 200.0,
    "platforms": [
        { "position": { "x": -120.0, "y": 320.0 }, "half_extents": { "x": 60.0, "y": 10.0 } },
        { "position": { "x": 120.0, "y": 480.0 }, "half_extents": { "x": 60.0, "y": 10.0 } }
    ],
    "hazards": [
        { "position": { "x": 70.0, "y": 240.0 },
          "half_extents": { "x": 25.0, "y": 12.0 },
          "damage": "Slicing" },
        { "position": { "x": -70.0, "y": 400.0 },
          "half_extents": { "x": 25.0, "y": 12.0 },
          "damage": "Burning" }
    ],
    "treasures": [ { "x": 0.0, "y": 600.0 } ],
    "exits": [ { "x": 0.0, "y": 760.0 } ]
}"#;

const DT: f32 = 1.0 / 60.0;
const MAX_FRAMES: u32 = 900;

fn main() -> Result<()> {
    env_logger::init();

    let level = Level::from_json(WELL)?;
    let mut config = level.session_config();
    // Headless scale: the gnome's box body is heavy, so lean hard.
    config.swing_sensitivity = 200_000.0;

    let mut session = GameSession::new(config);
    level.build(&mut session)?;
    session.reset()?;

    let mut game = GameLoop::new(session, SidewaysInput::tilt());
    let mut lives = 1;
    let mut last_state = game.session().state();
    let mut last_gnome = game.session().current_gnome();

    for frame in 0..MAX_FRAMES {
        script(&mut game, frame)?;
        game.advance(DT)?;

        let gnome = game.session().current_gnome();
        if gnome.is_none() && last_gnome.is_some() {
            log::info!("frame {frame}: the gnome died, waiting for the rope to come back");
        }
        if let (Some(g), None) = (gnome, last_gnome) {
            if frame > 0 {
                lives += 1;
                log::info!("frame {frame}: fresh gnome {g:?} on the rope (life {lives})");
            }
        }
        last_gnome = gnome;

        let state = game.session().state();
        if state != last_state {
            log::info!("frame {frame}: session is now {state:?}");
            last_state = state;
        }
        if state == SessionState::GameOver {
            break;
        }
    }

    let session = game.session();
    if session.state() == SessionState::GameOver {
        log::info!(
            "won after {lives} lives; rope length ended at {:.0}",
            session.rope().length()
        );
    } else {
        log::warn!("ran out of frames in state {:?}", session.state());
    }
    Ok(())
}

/// Per-frame script: a short pause to show the menu, a tilt to the right, a
/// brush with the fire trap, then a straight drop.
fn script(game: &mut GameLoop, frame: u32) -> Result<()> {
    match frame {
        // Tap the menu button, then resume.
        60 => game.session_mut().set_paused(true),
        90 => game.session_mut().set_paused(false),
        // Lean right on the way down.
        120 => game.sideways_mut().set_tilt(0.8),
        // The first life clips the fire trap.
        150 => {
            if game.session().current_gnome().is_some() {
                game.session_mut().fire_trap_touched()?;
            }
        }
        // Hang straight for the rest of the run.
        180 => game.sideways_mut().set_tilt(0.0),
        _ => {}
    }
    Ok(())
}
