//! Demo-mode steering
//!
//! Flies toward the nearest uncollected gift, then lines up over the platform and
//! sinks onto it slowly. Good enough for an attract screen and headless runs.

use glam::Vec2;

use super::physics::HeldKeys;
use super::state::SimState;
use crate::consts::*;

/// Ceiling on the horizontal speed the autopilot asks for
const CRUISE_SPEED: f32 = 2.5;
/// Sink rate used on final approach (well under the safe landing speed)
const APPROACH_SINK: f32 = 0.8;
/// Dead band around the desired velocity before a key is pressed
const DEAD_BAND: f32 = 0.15;
/// How far above the platform the approach point hovers
const APPROACH_HEIGHT: f32 = 60.0;

/// What the autopilot is currently heading for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Goal {
    Gift(Vec2),
    Platform { center_x: f32, top: f32 },
    Idle,
}

pub fn goal(state: &SimState) -> Goal {
    let sleigh = state.vehicle.rect();
    let here = sleigh.pos + sleigh.size / 2.0;

    let nearest = state
        .collectibles
        .iter()
        .filter(|g| !g.is_collected())
        .map(|g| g.pos + g.size / 2.0)
        .min_by(|a, b| {
            a.distance_squared(here)
                .partial_cmp(&b.distance_squared(here))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(center) = nearest {
        return Goal::Gift(center);
    }

    match state.platform() {
        Some(p) => Goal::Platform {
            center_x: p.pos.x + p.size.x / 2.0,
            top: p.pos.y,
        },
        None => Goal::Idle,
    }
}

/// Keys that would move the sleigh toward the current goal
pub fn steer(state: &SimState) -> HeldKeys {
    let v = &state.vehicle;
    let here = v.pos + Vec2::new(VEHICLE_WIDTH, VEHICLE_HEIGHT) / 2.0;

    let (target, sink) = match goal(state) {
        Goal::Gift(center) => (center, None),
        Goal::Platform { center_x, top } => {
            let aligned = (center_x - here.x).abs() < 15.0;
            if aligned {
                (Vec2::new(center_x, top), Some(APPROACH_SINK))
            } else {
                (Vec2::new(center_x, top - APPROACH_HEIGHT), None)
            }
        }
        Goal::Idle => (here, None),
    };

    let delta = target - here;
    let want_vx = (delta.x * 0.03).clamp(-CRUISE_SPEED, CRUISE_SPEED);
    let want_vy = match sink {
        Some(rate) => rate.min(delta.y.max(0.0) * 0.05 + 0.3),
        None => (delta.y * 0.03).clamp(-CRUISE_SPEED, CRUISE_SPEED),
    };

    let mut keys = HeldKeys {
        left: v.vel.x > want_vx + DEAD_BAND,
        right: v.vel.x < want_vx - DEAD_BAND,
        up: v.vel.y > want_vy + DEAD_BAND,
        down: v.vel.y < want_vy - DEAD_BAND * 4.0,
    };

    // Stay clear of the ground clutter unless landing
    if sink.is_none() && v.pos.y + VEHICLE_HEIGHT > FIELD_HEIGHT - 250.0 && delta.y < 0.0 {
        keys.up = true;
        keys.down = false;
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityKind;

    #[test]
    fn test_heads_for_nearest_gift() {
        let mut state = SimState::new(1, 3, false, 9);
        state.collectibles.truncate(1);
        state.collectibles[0].pos = Vec2::new(500.0, 100.0);
        state.vehicle.vel = Vec2::ZERO;
        assert_eq!(goal(&state), Goal::Gift(Vec2::new(515.0, 115.0)));
        let keys = steer(&state);
        assert!(keys.right);
        assert!(!keys.left);
    }

    #[test]
    fn test_targets_platform_once_all_collected() {
        let mut state = SimState::new(1, 3, false, 9);
        for gift in &mut state.collectibles {
            gift.kind = EntityKind::Collectible {
                icon: "🎁",
                collected: true,
            };
        }
        let p = state.platform().unwrap().rect();
        assert_eq!(
            goal(&state),
            Goal::Platform {
                center_x: p.pos.x + p.size.x / 2.0,
                top: p.pos.y
            }
        );
    }

    #[test]
    fn test_brakes_a_fast_descent() {
        let mut state = SimState::new(1, 3, false, 9);
        state.collectibles.truncate(1);
        state.collectibles[0].pos = Vec2::new(50.0, 100.0);
        state.vehicle.pos = Vec2::new(40.0, 80.0);
        state.vehicle.vel = Vec2::new(0.0, 4.0);
        assert!(steer(&state).up);
    }
}
