//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one call to `tick` is one 60 Hz step)
//! - Seeded RNG only
//! - Deferred transitions go through the tick-indexed `Schedule`
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod entity;
pub mod level;
pub mod physics;
pub mod schedule;
pub mod state;
pub mod tick;

pub use entity::{Antagonist, Entity, EntityKind, ObstacleShape, Pursuer, Vehicle};
pub use physics::HeldKeys;
pub use schedule::{Schedule, TimedAction};
pub use state::{Arrival, CrashCause, GameEvent, Hud, LevelStatus, Message, SimState};
pub use tick::{TickInput, tick};
