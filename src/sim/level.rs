//! Level construction
//!
//! A fixed per-level layout (house, platform, trees, mountain) plus procedurally
//! scattered gifts and level-gated enemies.

use glam::Vec2;
use rand::Rng;

use super::entity::{
    Antagonist, Color, Entity, EntityKind, ObstacleShape, Pursuer, Snowflake, Vehicle, rgb,
};
use super::state::{GameEvent, LevelStatus, SimState};
use crate::consts::*;
use crate::strings::MessageKey;
use crate::tuning::Tuning;

/// Platform sits on top of the house at this height
const PLATFORM_Y: f32 = 440.0;
const PLATFORM_HEIGHT: f32 = 14.0;
/// Platform overhangs the house by this much on each side
const PLATFORM_OVERHANG: f32 = 20.0;

/// Gift glyphs, cycled by index
pub const GIFT_ICONS: [&str; 4] = ["🎁", "📦", "🧧", "🎀"];
/// Size of the box tested against obstacles when placing a gift
const PLACEMENT_BOX: f32 = 40.0;
/// Gifts stay out of the top margin and the bottom strip (ground clutter)
const PLACEMENT_MARGIN: f32 = 50.0;
const PLACEMENT_BOTTOM_RESERVE: f32 = 250.0;

/// (x, y, scale) of the three trees shared by every level
const TREES: [(f32, f32, f32); 3] = [(200.0, 450.0, 1.0), (400.0, 480.0, 0.8), (30.0, 350.0, 1.2)];

const BIRD_SIZE: Vec2 = Vec2::new(40.0, 25.0);

/// Static, non-random description of a level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelLayout {
    pub house_x: f32,
    pub house_width: f32,
    pub house_height: f32,
    pub house_color: Color,
    /// Final level mountain and the antagonist perched on it
    pub has_mountain: bool,
}

/// Per-level lookup table
pub fn layout(level: u32) -> LevelLayout {
    match level {
        2 => LevelLayout {
            house_x: 580.0,
            house_width: 180.0,
            house_height: 120.0,
            house_color: rgb(0x6d4c41),
            has_mountain: false,
        },
        3 => LevelLayout {
            house_x: 550.0,
            house_width: 220.0,
            house_height: 160.0,
            house_color: rgb(0x5d4037),
            has_mountain: false,
        },
        4 => LevelLayout {
            house_x: 620.0,
            house_width: 160.0,
            house_height: 160.0,
            house_color: rgb(0x4e342e),
            has_mountain: true,
        },
        _ => LevelLayout {
            house_x: 600.0,
            house_width: 140.0,
            house_height: 160.0,
            house_color: rgb(0x8b4513),
            has_mountain: false,
        },
    }
}

/// Where the antagonist stands on the mountain
pub const ANTAGONIST_POS: Vec2 = Vec2::new(400.0, 340.0);

/// Birds patrol from level 2
pub fn has_birds(level: u32) -> bool {
    level >= 2
}

/// Snowball launchers fire on levels 3 and 4
pub fn has_projectiles(level: u32) -> bool {
    level >= 3
}

/// The elf only lives on level 2
pub fn has_pursuer(level: u32) -> bool {
    level == 2
}

/// The dog only runs on the final level
pub fn has_dog(level: u32) -> bool {
    level == FINAL_LEVEL
}

/// (Re)build the level in place, discarding everything from the previous attempt
pub fn build(state: &mut SimState) {
    let level = state.level;

    state.schedule.cancel_all();
    state.reset_entity_ids();
    state.vehicle = Vehicle::default();
    state.status = LevelStatus::Playing;
    state.paused = false;
    state.elapsed_ticks = 0;
    state.collected_count = 0;
    state.message = None;
    state.arrival = None;
    state.finished = false;
    state.pursuer = None;
    state.antagonist = None;
    state.obstacles.clear();
    state.collectibles.clear();
    state.birds.clear();
    state.dogs.clear();
    state.projectiles.clear();
    state.snow.clear();
    state.attempt += 1;

    let obstacles = static_obstacles(state, &layout(level));
    state.obstacles = obstacles;

    let spots = place_collectibles(&mut state.rng, &state.obstacles, &state.tuning);
    for (i, pos) in spots.into_iter().enumerate() {
        let id = state.next_entity_id();
        state.collectibles.push(Entity {
            id,
            kind: EntityKind::Collectible {
                icon: GIFT_ICONS[i % GIFT_ICONS.len()],
                collected: false,
            },
            pos,
            size: Vec2::splat(COLLECTIBLE_SIZE),
            color: rgb(0xffffff),
        });
    }

    if state.spawn_pursuer && has_pursuer(level) {
        let x = state.rng.random::<f32>() * FIELD_WIDTH;
        state.pursuer = Some(Pursuer::new(Vec2::new(x, 50.0), Vec2::new(3.0, 2.0)));
        let ttl = state.tuning.elf_message_ticks;
        state.show_message(MessageKey::ElfAppeared, Some(ttl));
    }

    if has_birds(level) {
        for (pos, vx) in [(Vec2::new(400.0, 100.0), 2.5), (Vec2::new(200.0, 300.0), -3.0)] {
            let id = state.next_entity_id();
            state.birds.push(Entity {
                id,
                kind: EntityKind::Bird {
                    vel: Vec2::new(vx, 0.0),
                },
                pos,
                size: BIRD_SIZE,
                color: rgb(0x000000),
            });
        }
    }

    if layout(level).has_mountain {
        state.antagonist = Some(Antagonist {
            pos: ANTAGONIST_POS,
            suction_active: true,
        });
    }

    let flakes = state.tuning.snowflake_count;
    for _ in 0..flakes {
        let pos = Vec2::new(
            state.rng.random::<f32>() * FIELD_WIDTH,
            state.rng.random::<f32>() * FIELD_HEIGHT,
        );
        let speed = 0.5 + state.rng.random::<f32>() * 2.5;
        state.snow.push(Snowflake { pos, speed });
    }

    log::info!(
        "Level {} built (attempt {}): {} obstacles, {} gifts, {} birds, elf={}, antagonist={}",
        level,
        state.attempt,
        state.obstacles.len(),
        state.collectibles.len(),
        state.birds.len(),
        state.pursuer.is_some(),
        state.antagonist.is_some()
    );
    state.emit(GameEvent::LevelStarted {
        level,
        attempt: state.attempt,
    });
}

/// Platform, house, chimney, trees (and the mountain on the final level), in collision order
fn static_obstacles(state: &mut SimState, layout: &LevelLayout) -> Vec<Entity> {
    let mut objs = Vec::new();

    if layout.has_mountain {
        objs.push(Entity {
            id: state.next_entity_id(),
            kind: EntityKind::Obstacle(ObstacleShape::Mountain),
            pos: Vec2::new(300.0, 350.0),
            size: Vec2::new(200.0, 250.0),
            color: rgb(0x263238),
        });
    }

    objs.push(Entity {
        id: state.next_entity_id(),
        kind: EntityKind::Platform,
        pos: Vec2::new(layout.house_x - PLATFORM_OVERHANG, PLATFORM_Y),
        size: Vec2::new(layout.house_width + PLATFORM_OVERHANG * 2.0, PLATFORM_HEIGHT),
        color: rgb(0xffffff),
    });

    objs.push(Entity {
        id: state.next_entity_id(),
        kind: EntityKind::Obstacle(ObstacleShape::House),
        pos: Vec2::new(layout.house_x, PLATFORM_Y + PLATFORM_HEIGHT),
        size: Vec2::new(layout.house_width, layout.house_height),
        color: layout.house_color,
    });

    objs.push(Entity {
        id: state.next_entity_id(),
        kind: EntityKind::Obstacle(ObstacleShape::Chimney),
        pos: Vec2::new(layout.house_x + layout.house_width - 50.0, PLATFORM_Y - 20.0),
        size: Vec2::new(30.0, 40.0),
        color: rgb(0x424242),
    });

    for (x, y, scale) in TREES {
        objs.push(Entity {
            id: state.next_entity_id(),
            kind: EntityKind::Obstacle(ObstacleShape::Tree),
            pos: Vec2::new(x, y),
            size: Vec2::new(60.0 * scale, 150.0 * scale),
            color: rgb(0x1b5e20),
        });
    }

    objs
}

/// Scatter the level's gifts by rejection sampling.
///
/// Each gift gets up to `placement_attempts` draws; a draw is rejected when its
/// placement box comes within `placement_obstacle_padding` of an obstacle or within
/// `placement_min_spacing` of an earlier gift. If every draw is rejected the last
/// one is kept anyway, so placement always yields `TOTAL_COLLECTIBLES` spots.
pub fn place_collectibles<R: Rng>(rng: &mut R, obstacles: &[Entity], tuning: &Tuning) -> Vec<Vec2> {
    let mut spots: Vec<Vec2> = Vec::with_capacity(TOTAL_COLLECTIBLES as usize);

    for i in 0..TOTAL_COLLECTIBLES {
        let mut candidate = Vec2::ZERO;
        let mut valid = false;
        let mut attempts = 0;

        while !valid && attempts < tuning.placement_attempts.max(1) {
            attempts += 1;
            candidate = Vec2::new(
                PLACEMENT_MARGIN + rng.random::<f32>() * (FIELD_WIDTH - PLACEMENT_MARGIN * 2.0),
                PLACEMENT_MARGIN + rng.random::<f32>() * (FIELD_HEIGHT - PLACEMENT_BOTTOM_RESERVE),
            );

            valid = !placement_rejected(candidate, obstacles, &spots, tuning);
        }

        if !valid {
            log::debug!(
                "Gift {} placed at {:?} after exhausting {} attempts",
                i,
                candidate,
                attempts
            );
        }
        spots.push(candidate);
    }

    spots
}

/// Whether a placement box at `candidate` is too close to an obstacle or an
/// already placed gift
pub fn placement_rejected(
    candidate: Vec2,
    obstacles: &[Entity],
    spots: &[Vec2],
    tuning: &Tuning,
) -> bool {
    let pad = tuning.placement_obstacle_padding;
    let near_obstacle = obstacles.iter().any(|o| {
        candidate.x + PLACEMENT_BOX > o.pos.x - pad
            && candidate.x < o.pos.x + o.size.x + pad
            && candidate.y + PLACEMENT_BOX > o.pos.y - pad
            && candidate.y < o.pos.y + o.size.y + pad
    });
    let near_gift = spots
        .iter()
        .any(|s| s.distance(candidate) < tuning.placement_min_spacing);
    near_obstacle || near_gift
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_every_level_has_ten_gifts() {
        for level in 1..=FINAL_LEVEL {
            let state = SimState::new(level, 3, true, level as u64 * 31);
            assert_eq!(state.collectibles.len(), TOTAL_COLLECTIBLES as usize);
            assert!(state.collectibles.iter().all(|c| !c.is_collected()));
        }
    }

    #[test]
    fn test_platform_is_wider_than_house_and_above_it() {
        for level in 1..=FINAL_LEVEL {
            let state = SimState::new(level, 3, false, 1);
            let lay = layout(level);
            let platform = state.platform().unwrap();
            assert_eq!(platform.size.x, lay.house_width + 40.0);
            assert_eq!(platform.pos.x, lay.house_x - 20.0);
            let house = state
                .obstacles
                .iter()
                .find(|o| o.kind == EntityKind::Obstacle(ObstacleShape::House))
                .unwrap();
            assert_eq!(house.pos.y, platform.pos.y + platform.size.y);
        }
    }

    #[test]
    fn test_level_gating() {
        let l1 = SimState::new(1, 3, true, 5);
        assert!(l1.birds.is_empty());
        assert!(l1.pursuer.is_none());
        assert!(l1.antagonist.is_none());

        let l2 = SimState::new(2, 3, true, 5);
        assert_eq!(l2.birds.len(), 2);
        assert!(l2.pursuer.is_some());
        assert_eq!(l2.message.map(|m| m.key), Some(MessageKey::ElfAppeared));

        let l2_no_elf = SimState::new(2, 3, false, 5);
        assert!(l2_no_elf.pursuer.is_none());

        let l3 = SimState::new(3, 3, true, 5);
        assert!(l3.pursuer.is_none());
        assert!(l3.antagonist.is_none());

        let l4 = SimState::new(4, 3, true, 5);
        assert!(l4.antagonist.is_some());
        assert!(
            l4.obstacles
                .iter()
                .any(|o| o.kind == EntityKind::Obstacle(ObstacleShape::Mountain))
        );
        assert!(l4.dogs.is_empty());
    }

    #[test]
    fn test_mountain_precedes_platform_in_collision_order() {
        let state = SimState::new(4, 3, false, 5);
        assert_eq!(
            state.obstacles[0].kind,
            EntityKind::Obstacle(ObstacleShape::Mountain)
        );
        assert_eq!(state.obstacles[1].kind, EntityKind::Platform);
    }

    #[test]
    fn test_placement_respects_field_bounds() {
        let mut rng = Pcg32::seed_from_u64(99);
        let state = SimState::new(1, 3, false, 99);
        let spots = place_collectibles(&mut rng, &state.obstacles, &Tuning::default());
        assert_eq!(spots.len(), TOTAL_COLLECTIBLES as usize);
        for s in spots {
            assert!(s.x >= 50.0 && s.x < FIELD_WIDTH - 50.0);
            assert!(s.y >= 50.0 && s.y < FIELD_HEIGHT - 200.0);
        }
    }

    fn house(x: f32, y: f32, w: f32, h: f32) -> Entity {
        Entity {
            id: 1,
            kind: EntityKind::Obstacle(ObstacleShape::House),
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
            color: rgb(0),
        }
    }

    #[test]
    fn test_obstacle_padding_boundaries() {
        let t = Tuning::default();
        let obstacles = [house(300.0, 300.0, 100.0, 50.0)];
        let rejected =
            |x: f32, y: f32| placement_rejected(Vec2::new(x, y), &obstacles, &[], &t);

        // Padded box spans x 250..450, y 250..400; the 40-unit gift box must clear it
        assert!(!rejected(210.0, 300.0));
        assert!(rejected(211.0, 300.0));
        assert!(rejected(449.5, 300.0));
        assert!(!rejected(450.0, 300.0));
        assert!(!rejected(350.0, 210.0));
        assert!(rejected(350.0, 211.0));
        assert!(rejected(350.0, 399.5));
        assert!(!rejected(350.0, 400.0));
    }

    #[test]
    fn test_gift_spacing_boundary() {
        let t = Tuning::default();
        let spots = [Vec2::new(100.0, 100.0)];
        assert!(placement_rejected(Vec2::new(100.0, 219.0), &[], &spots, &t));
        assert!(!placement_rejected(Vec2::new(100.0, 220.0), &[], &spots, &t));
    }

    #[test]
    fn test_placement_lands_in_the_only_free_strip() {
        // Everything right of x = 110 is within padding of the blocker
        let obstacles = [house(200.0, 0.0, FIELD_WIDTH - 200.0, FIELD_HEIGHT)];
        let tuning = Tuning {
            placement_attempts: 1000,
            placement_min_spacing: 0.0,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(7);
        let spots = place_collectibles(&mut rng, &obstacles, &tuning);
        assert_eq!(spots.len(), TOTAL_COLLECTIBLES as usize);
        for s in &spots {
            assert!(s.x >= 50.0 && s.x <= 110.0, "gift outside free strip: {:?}", s);
            assert!(!placement_rejected(*s, &obstacles, &[], &tuning));
        }
    }

    #[test]
    fn test_placement_accepts_last_candidate_when_impossible() {
        // An obstacle covering the whole field rejects every draw.
        let blocker = Entity {
            id: 1,
            kind: EntityKind::Obstacle(ObstacleShape::House),
            pos: Vec2::ZERO,
            size: Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
            color: rgb(0),
        };
        let tuning = Tuning {
            placement_attempts: 3,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let spots = place_collectibles(&mut rng, &[blocker], &tuning);
        assert_eq!(spots.len(), TOTAL_COLLECTIBLES as usize);
    }

    #[test]
    fn test_rebuild_discards_previous_attempt() {
        let mut state = SimState::new(3, 3, false, 11);
        let first: Vec<Vec2> = state.collectibles.iter().map(|c| c.pos).collect();
        state.collected_count = 4;
        state.elapsed_ticks = 500;
        state.vehicle.pos = Vec2::new(300.0, 300.0);
        let stray = state.obstacles[0].clone();
        state.projectiles.push(stray);
        state.show_message(MessageKey::CollectFirst, None);

        build(&mut state);

        assert_eq!(state.collected_count, 0);
        assert_eq!(state.elapsed_ticks, 0);
        assert_eq!(state.vehicle, Vehicle::default());
        assert!(state.projectiles.is_empty());
        assert!(state.message.is_none());
        assert_eq!(state.attempt, 2);
        let second: Vec<Vec2> = state.collectibles.iter().map(|c| c.pos).collect();
        assert_ne!(first, second);
    }
}
