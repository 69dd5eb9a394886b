//! Level simulation state
//!
//! Everything that changes from tick to tick lives in `SimState`, which the frame
//! loop owns and lends out `&mut` to each phase.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::entity::{Antagonist, Entity, EntityKind, Pursuer, Snowflake, Vehicle};
use super::level;
use super::schedule::{Schedule, TimedAction};
use crate::consts::*;
use crate::strings::MessageKey;
use crate::tuning::Tuning;

/// Where the current attempt stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    /// Active gameplay
    Playing,
    /// Touched down; arrival walk running
    Landed,
    /// Crashed; respawn or game over pending
    Crashed,
}

/// Why the sleigh was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashCause {
    OutOfBounds,
    Obstacle,
    /// Platform touched before every gift was collected
    PlatformLocked,
    /// Platform touched too fast
    HardLanding,
    Bird,
    Dog,
    Projectile,
}

/// Notifications for the surrounding layers (session, HUD, logging)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A level instance was (re)built
    LevelStarted { level: u32, attempt: u32 },
    GiftCollected { collected: u32, total: u32 },
    AllGiftsCollected,
    PursuerCaught,
    Crashed { cause: CrashCause, lives_left: u32 },
    Landed,
    LevelWon { elapsed_ticks: u64, seconds: u32 },
    GameOver,
}

/// The banner currently shown across the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub key: MessageKey,
    /// Lets an expiry only clear the message it was scheduled for
    pub serial: u32,
}

/// Landing walk progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrival {
    /// Walker x position
    pub x: f32,
    /// Steps taken so far
    pub steps: u32,
    /// Steps needed to finish
    pub total_steps: u32,
}

impl Arrival {
    pub fn progress(&self) -> f32 {
        (self.steps as f32 / self.total_steps as f32).min(1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.steps >= self.total_steps
    }
}

/// Status values for an on-screen HUD or headless telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub level: u32,
    pub lives: u32,
    pub elapsed_secs: u32,
    pub collected: u32,
    pub total: u32,
}

/// Complete state of one level being played
#[derive(Debug, Clone)]
pub struct SimState {
    /// Level number, 1-based
    pub level: u32,
    /// Whether the elf should appear when the level supports one
    pub spawn_pursuer: bool,
    pub tuning: Tuning,
    pub rng: Pcg32,

    pub lives: u32,
    pub status: LevelStatus,
    /// Manual pause (P key)
    pub paused: bool,
    /// Pause requested by the surrounding layer on the latest tick
    pub external_pause: bool,
    /// Gameplay ticks of the current attempt (frozen while paused or not playing)
    pub elapsed_ticks: u64,
    /// Scheduler clock, advances on every tick call
    pub clock: u64,
    /// How many times this level has been built
    pub attempt: u32,

    pub vehicle: Vehicle,
    /// Platform and static obstacles, in collision order
    pub obstacles: Vec<Entity>,
    pub collectibles: Vec<Entity>,
    pub birds: Vec<Entity>,
    pub dogs: Vec<Entity>,
    pub projectiles: Vec<Entity>,
    pub pursuer: Option<Pursuer>,
    pub antagonist: Option<Antagonist>,
    pub snow: Vec<Snowflake>,

    pub collected_count: u32,
    pub message: Option<Message>,
    message_serial: u32,
    pub arrival: Option<Arrival>,
    /// Set once `LevelWon` or `GameOver` has been reported
    pub finished: bool,

    pub schedule: Schedule,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl SimState {
    /// Build a level with default tuning
    pub fn new(level: u32, lives: u32, spawn_pursuer: bool, seed: u64) -> Self {
        Self::with_tuning(level, lives, spawn_pursuer, seed, Tuning::default())
    }

    pub fn with_tuning(
        level: u32,
        lives: u32,
        spawn_pursuer: bool,
        seed: u64,
        tuning: Tuning,
    ) -> Self {
        let level = level.clamp(1, FINAL_LEVEL);
        let mut state = Self {
            level,
            spawn_pursuer,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            lives,
            status: LevelStatus::Playing,
            paused: false,
            external_pause: false,
            elapsed_ticks: 0,
            clock: 0,
            attempt: 0,
            vehicle: Vehicle::default(),
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            birds: Vec::new(),
            dogs: Vec::new(),
            projectiles: Vec::new(),
            pursuer: None,
            antagonist: None,
            snow: Vec::new(),
            collected_count: 0,
            message: None,
            message_serial: 0,
            arrival: None,
            finished: false,
            schedule: Schedule::new(),
            events: Vec::new(),
            next_id: 1,
        };
        level::build(&mut state);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Restart the entity ID counter (only the level builder calls this)
    pub(crate) fn reset_entity_ids(&mut self) {
        self.next_id = 1;
    }

    /// Show a banner; with `ttl` it clears itself after that many ticks
    pub fn show_message(&mut self, key: MessageKey, ttl: Option<u64>) {
        self.message_serial = self.message_serial.wrapping_add(1);
        let serial = self.message_serial;
        self.message = Some(Message { key, serial });
        if let Some(ttl) = ttl {
            self.schedule
                .push(self.clock + ttl, TimedAction::ClearMessage { serial });
        }
    }

    /// Clear the banner if it is still the one identified by `serial`
    pub fn expire_message(&mut self, serial: u32) {
        if self.message.is_some_and(|m| m.serial == serial) {
            self.message = None;
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand pending notifications to the caller
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether either pause source is active
    pub fn is_paused(&self) -> bool {
        self.paused || self.external_pause
    }

    /// The landing platform of this level
    pub fn platform(&self) -> Option<&Entity> {
        self.obstacles
            .iter()
            .find(|o| matches!(o.kind, EntityKind::Platform))
    }

    /// Platform stays locked until every gift is collected
    pub fn platform_locked(&self) -> bool {
        self.collected_count < TOTAL_COLLECTIBLES
    }

    /// Bonus life granted by the surrounding layer (elf caught)
    pub fn grant_life(&mut self) {
        self.lives += 1;
    }

    pub fn hud(&self) -> Hud {
        Hud {
            level: self.level,
            lives: self.lives,
            elapsed_secs: crate::ticks_to_seconds(self.elapsed_ticks),
            collected: self.collected_count,
            total: TOTAL_COLLECTIBLES,
        }
    }

    /// Cancel everything pending; the state stays readable but never advances again
    pub fn teardown(&mut self) {
        self.schedule.cancel_all();
        self.finished = true;
        log::info!("Level {} torn down", self.level);
    }
}
