//! Entity model
//!
//! Every simulated object shares position/size/color; kind-specific data lives in
//! the `EntityKind` payload so the rule engine can dispatch with a `match`.

use glam::Vec2;

use crate::Rect;
use crate::consts::*;

/// RGBA color, channels in 0.0..=1.0
pub type Color = [f32; 4];

/// Opaque color from a 0xRRGGBB literal
pub const fn rgb(hex: u32) -> Color {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Shape of a static obstacle (drives both placement padding and drawing)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleShape {
    House,
    Chimney,
    Tree,
    /// The final level's triangular mountain
    Mountain,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Platform,
    Obstacle(ObstacleShape),
    Bird { vel: Vec2 },
    Dog,
    Projectile { vel: Vec2 },
    Collectible { icon: &'static str, collected: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub color: Color,
}

impl Entity {
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn velocity(&self) -> Option<Vec2> {
        match self.kind {
            EntityKind::Bird { vel } | EntityKind::Projectile { vel } => Some(vel),
            _ => None,
        }
    }

    pub fn is_collected(&self) -> bool {
        matches!(self.kind, EntityKind::Collectible { collected: true, .. })
    }
}

/// The player's sleigh
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Whether upward thrust was applied on the last integrated tick (flame sprite)
    pub thrusting_up: bool,
}

impl Default for Vehicle {
    fn default() -> Self {
        Self {
            pos: Vec2::new(VEHICLE_START_X, VEHICLE_START_Y),
            vel: Vec2::ZERO,
            thrusting_up: false,
        }
    }
}

impl Vehicle {
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::new(VEHICLE_WIDTH, VEHICLE_HEIGHT),
        }
    }
}

/// One fading sparkle behind the elf
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub alpha: f32,
    pub color: Color,
}

/// Trail sparkle palette
pub const TRAIL_COLORS: [Color; 4] = [rgb(0xff00ff), rgb(0x00ffff), rgb(0xffff00), rgb(0x00ff00)];

/// The bonus-life elf
#[derive(Debug, Clone, PartialEq)]
pub struct Pursuer {
    pub pos: Vec2,
    pub vel: Vec2,
    pub active: bool,
    pub caught: bool,
    /// Cosmetic only, never used for collision
    pub trail: Vec<TrailPoint>,
}

impl Pursuer {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            active: true,
            caught: false,
            trail: Vec::new(),
        }
    }

    pub fn is_live(&self) -> bool {
        self.active && !self.caught
    }

    /// Catch box: the 30x30 body grown by the catch pad
    pub fn catch_rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::splat(PURSUER_SIZE),
        }
        .expand(PURSUER_CATCH_PAD)
    }

    /// Center of the body (where trail samples are dropped)
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(PURSUER_SIZE / 2.0)
    }
}

/// The stationary puller on the final level
#[derive(Debug, Clone, PartialEq)]
pub struct Antagonist {
    pub pos: Vec2,
    pub suction_active: bool,
}

/// Ambient snow, purely cosmetic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snowflake {
    pub pos: Vec2,
    pub speed: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_channels() {
        assert_eq!(rgb(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgb(0x000000)[3], 1.0);
    }

    #[test]
    fn test_pursuer_catch_box_is_padded() {
        let elf = Pursuer::new(Vec2::new(100.0, 100.0), Vec2::ZERO);
        let r = elf.catch_rect();
        assert_eq!(r.pos, Vec2::new(95.0, 95.0));
        assert_eq!(r.size, Vec2::new(40.0, 40.0));
    }

    #[test]
    fn test_velocity_only_on_moving_kinds() {
        let bird = Entity {
            id: 1,
            kind: EntityKind::Bird {
                vel: Vec2::new(2.5, 0.0),
            },
            pos: Vec2::ZERO,
            size: Vec2::new(40.0, 25.0),
            color: rgb(0),
        };
        assert_eq!(bird.velocity(), Some(Vec2::new(2.5, 0.0)));
        let dog = Entity {
            kind: EntityKind::Dog,
            ..bird
        };
        assert_eq!(dog.velocity(), None);
    }
}
