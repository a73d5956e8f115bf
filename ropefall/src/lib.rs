//! Ropefall - game core for a 2D rope-descent platformer.
//!
//! A gnome is lowered into a well on a rope, swings past traps, grabs the
//! treasure, and climbs back out. This crate holds the session lifecycle
//! (reset, death, win, pause, restart), the input-to-sideways translation,
//! and the swing-force physics, plus the small engine substrate they run on.

pub mod audio;
pub mod camera;
pub mod entities;
pub mod input;
pub mod level;
pub mod math;
pub mod physics;
pub mod rope;
pub mod scheduler;
pub mod session;
pub mod swing;
pub mod ui;
pub mod world;

pub use crate::audio::AudioSystem;
pub use crate::camera::CameraTracker;
pub use crate::entities::{DamageType, Gnome, Hazard, Player, Transform, Treasure};
pub use crate::input::{AxisKeys, InputState, SidewaysInput, SidewaysSource};
pub use crate::level::Level;
pub use crate::math::Vec2;
pub use crate::physics::{BodyKind, ColliderShape, ContactEvent, PhysicsWorld};
pub use crate::rope::Rope;
pub use crate::scheduler::{FrameScheduler, GameLoop};
pub use crate::session::{GameSession, Resettable, SessionConfig, SessionError, SessionState};
pub use crate::swing::SwingController;
pub use crate::ui::{MenuPanels, PanelId};
pub use crate::world::{EntityId, World};
pub use winit::keyboard::KeyCode;
