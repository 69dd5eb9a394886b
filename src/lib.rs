//! Sleigh Run - a 2D gift-collecting, sleigh-landing arcade game
//!
//! Core modules:
//! - `sim`: Per-level simulation (physics, collisions, level lifecycle)
//! - `renderer`: Tessellation of simulation state + WebGPU pipeline
//! - `platform`: Browser/native input abstraction
//! - `session`: Player progression across levels
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod strings;
pub mod tuning;

pub use error::{SetupError, StorageError};
pub use highscores::{HighScores, Score};
pub use session::{Player, Session};
pub use settings::Settings;
pub use strings::{EnglishStrings, ItalianStrings, Language, MessageKey, StringTable};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation rate; all per-tick tuning values assume this
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICKS_PER_SECOND as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Play field dimensions (canvas units, y grows downward)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Sleigh hit box
    pub const VEHICLE_WIDTH: f32 = 40.0;
    pub const VEHICLE_HEIGHT: f32 = 30.0;
    /// Where the sleigh starts every attempt
    pub const VEHICLE_START_X: f32 = 50.0;
    pub const VEHICLE_START_Y: f32 = 100.0;

    /// Gifts per level
    pub const TOTAL_COLLECTIBLES: u32 = 10;
    pub const COLLECTIBLE_SIZE: f32 = 30.0;

    /// Elf body size (catch box extends `PURSUER_CATCH_PAD` beyond it)
    pub const PURSUER_SIZE: f32 = 30.0;
    pub const PURSUER_CATCH_PAD: f32 = 5.0;

    /// Final level number
    pub const FINAL_LEVEL: u32 = 4;
}

/// Axis-aligned rectangle in canvas space (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Strict overlap test (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.pos.x < other.right()
            && self.right() > other.pos.x
            && self.pos.y < other.bottom()
            && self.bottom() > other.pos.y
    }

    /// Grow the rectangle by `pad` on every side
    #[inline]
    pub fn expand(&self, pad: f32) -> Rect {
        Rect {
            pos: self.pos - Vec2::splat(pad),
            size: self.size + Vec2::splat(pad * 2.0),
        }
    }
}

/// Convert a whole tick count into floored seconds
#[inline]
pub fn ticks_to_seconds(ticks: u64) -> u32 {
    (ticks / consts::TICKS_PER_SECOND as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(a.expand(1.0).overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_ticks_to_seconds_floors() {
        assert_eq!(ticks_to_seconds(0), 0);
        assert_eq!(ticks_to_seconds(59), 0);
        assert_eq!(ticks_to_seconds(60), 1);
        assert_eq!(ticks_to_seconds(179), 2);
    }
}
