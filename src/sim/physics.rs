//! Per-tick motion
//!
//! Sleigh thrust/gravity/drag, the antagonist's pull, elf AI, patrol birds, the
//! dog, ballistic snowballs and ambient snow. Collision outcomes are decided in
//! `collision`; the only rule applied here is the out-of-bounds crash.

use glam::Vec2;
use rand::Rng;

use super::entity::{
    Antagonist, Entity, EntityKind, Pursuer, TRAIL_COLORS, TrailPoint, Vehicle, rgb,
};
use super::level::{has_dog, has_projectiles};
use super::state::{CrashCause, SimState};
use crate::consts::*;
use crate::tuning::{PursuerMode, Tuning};

/// Direction keys held during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    /// Sum of the per-axis impulses (canvas space, y down)
    pub fn thrust_vector(&self, thrust: f32) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.up {
            v.y -= thrust;
        }
        if self.down {
            v.y += thrust;
        }
        if self.left {
            v.x -= thrust;
        }
        if self.right {
            v.x += thrust;
        }
        v
    }
}

/// Advance every moving thing by one tick.
///
/// Returns `Some(CrashCause::OutOfBounds)` as soon as the sleigh leaves the field;
/// nothing else moves on that tick.
pub fn integrate(state: &mut SimState, keys: &HeldKeys) -> Option<CrashCause> {
    step_vehicle(&mut state.vehicle, keys, state.antagonist.as_ref(), &state.tuning);
    if out_of_bounds(state.vehicle.pos, state.tuning.out_of_bounds_margin) {
        return Some(CrashCause::OutOfBounds);
    }

    let elapsed = state.elapsed_ticks;
    let target = state.vehicle.pos;

    if let Some(pursuer) = state.pursuer.as_mut() {
        if pursuer.is_live() {
            step_pursuer(pursuer, target, &mut state.rng, elapsed, &state.tuning);
        }
    }

    for bird in &mut state.birds {
        step_bird(bird, state.tuning.bird_wrap_margin);
    }

    if has_dog(state.level) && elapsed > state.tuning.dog_spawn_after_ticks {
        if state.dogs.is_empty() {
            let id = state.next_entity_id();
            state.dogs.push(Entity {
                id,
                kind: EntityKind::Dog,
                pos: Vec2::new(0.0, 100.0),
                size: Vec2::new(40.0, 30.0),
                color: rgb(0x8b4513),
            });
            log::info!("Dog released at tick {}", elapsed);
        }
        for dog in &mut state.dogs {
            step_dog(dog, elapsed, &state.tuning);
        }
    }

    if has_projectiles(state.level)
        && state.tuning.projectile_interval_ticks > 0
        && elapsed % state.tuning.projectile_interval_ticks == 0
    {
        let x = 100.0 + state.rng.random::<f32>() * 500.0;
        let vel = launch_velocity(state.vehicle.pos.x, &state.tuning);
        let id = state.next_entity_id();
        state.projectiles.push(Entity {
            id,
            kind: EntityKind::Projectile { vel },
            pos: Vec2::new(x, 580.0),
            size: Vec2::splat(8.0),
            color: rgb(0xffffff),
        });
    }
    step_projectiles(&mut state.projectiles, state.tuning.projectile_gravity);

    step_snow(state);

    None
}

/// Thrust, antagonist pull, gravity, drag, clamp, then move
pub fn step_vehicle(
    vehicle: &mut Vehicle,
    keys: &HeldKeys,
    antagonist: Option<&Antagonist>,
    t: &Tuning,
) {
    vehicle.vel += keys.thrust_vector(t.thrust);
    vehicle.thrusting_up = keys.up;

    if let Some(a) = antagonist.filter(|a| a.suction_active) {
        vehicle.vel += antagonist_pull(a.pos, vehicle.pos, t);
    }

    vehicle.vel.y += t.gravity;
    vehicle.vel *= t.drag;
    vehicle.vel = vehicle
        .vel
        .clamp(Vec2::splat(-t.max_velocity), Vec2::splat(t.max_velocity));

    vehicle.pos += vehicle.vel;
}

/// Acceleration toward `source`, linear falloff to zero at the pull radius
pub fn antagonist_pull(source: Vec2, pos: Vec2, t: &Tuning) -> Vec2 {
    let delta = source - pos;
    let dist = delta.length();
    if dist <= 0.0 || dist >= t.antagonist_radius {
        return Vec2::ZERO;
    }
    let strength = t.antagonist_strength * (t.antagonist_radius - dist) / t.antagonist_radius;
    delta / dist * strength
}

/// Beyond `margin` outside the field on any side
pub fn out_of_bounds(pos: Vec2, margin: f32) -> bool {
    pos.x < -margin
        || pos.x > FIELD_WIDTH + margin
        || pos.y < -margin
        || pos.y > FIELD_HEIGHT + margin
}

/// Elf AI: steer relative to the sleigh when close, wander otherwise
pub fn step_pursuer<R: Rng>(p: &mut Pursuer, target: Vec2, rng: &mut R, tick: u64, t: &Tuning) {
    let to_target = target - p.pos;
    let dist = to_target.length();

    if dist < t.pursuer_sense_radius && dist > 0.0 {
        let dir = to_target / dist;
        let dir = match t.pursuer_mode {
            PursuerMode::Chase => dir,
            PursuerMode::Flee => -dir,
        };
        p.vel += dir * t.pursuer_accel;
    } else {
        p.vel += Vec2::new(
            (rng.random::<f32>() - 0.5) * t.pursuer_jitter,
            (rng.random::<f32>() - 0.5) * t.pursuer_jitter,
        );
    }

    p.vel = p.vel.clamp(
        Vec2::splat(-t.pursuer_max_speed),
        Vec2::splat(t.pursuer_max_speed),
    );
    p.pos += p.vel;
    p.vel *= t.pursuer_damping;

    // Bounce: velocity always ends up pointing back into the field
    let m = t.pursuer_edge_margin;
    if p.pos.x < m {
        p.vel.x = p.vel.x.abs();
    } else if p.pos.x > FIELD_WIDTH - m {
        p.vel.x = -p.vel.x.abs();
    }
    if p.pos.y < m {
        p.vel.y = p.vel.y.abs();
    } else if p.pos.y > FIELD_HEIGHT - m {
        p.vel.y = -p.vel.y.abs();
    }
    p.pos = p
        .pos
        .clamp(Vec2::ZERO, Vec2::new(FIELD_WIDTH, FIELD_HEIGHT));

    if t.trail_interval_ticks > 0 && tick % t.trail_interval_ticks == 0 {
        let color = TRAIL_COLORS[rng.random_range(0..TRAIL_COLORS.len())];
        p.trail.push(TrailPoint {
            pos: p.center(),
            alpha: 1.0,
            color,
        });
    }
    fade_trail(&mut p.trail, t.trail_fade);
}

/// Linear alpha decay, dropping spent points
pub fn fade_trail(trail: &mut Vec<TrailPoint>, fade: f32) {
    for point in trail.iter_mut() {
        point.alpha -= fade;
    }
    trail.retain(|point| point.alpha > 0.0);
}

/// Constant horizontal patrol with wraparound
pub fn step_bird(bird: &mut Entity, wrap_margin: f32) {
    if let EntityKind::Bird { vel } = bird.kind {
        bird.pos.x += vel.x;
        if bird.pos.x > FIELD_WIDTH + wrap_margin {
            bird.pos.x = -bird.size.x - wrap_margin;
        } else if bird.pos.x < -bird.size.x - wrap_margin {
            bird.pos.x = FIELD_WIDTH + wrap_margin;
        }
    }
}

/// Fast run to the right, bobbing on a sine keyed off elapsed ticks
pub fn step_dog(dog: &mut Entity, tick: u64, t: &Tuning) {
    dog.pos.x += t.dog_speed;
    dog.pos.y = t.dog_base_y + (tick as f32 / t.dog_period_divisor).sin() * t.dog_amplitude;
    if dog.pos.x > FIELD_WIDTH {
        dog.pos.x = -dog.size.x;
    }
}

/// Snowball launch: aimed at the sleigh's horizontal offset from the anchor, strong upward kick
pub fn launch_velocity(vehicle_x: f32, t: &Tuning) -> Vec2 {
    Vec2::new(
        (vehicle_x - t.projectile_aim_anchor_x) / t.projectile_aim_divisor,
        -t.projectile_launch_speed,
    )
}

/// Ballistic motion
pub fn step_projectiles(projectiles: &mut [Entity], gravity: f32) {
    for p in projectiles.iter_mut() {
        if let EntityKind::Projectile { ref mut vel } = p.kind {
            p.pos += *vel;
            vel.y += gravity;
        }
    }
}

/// Drop snowballs that left the field vertically; runs after the hit test
pub fn despawn_projectiles(projectiles: &mut Vec<Entity>) {
    projectiles.retain(|p| p.pos.y < FIELD_HEIGHT && p.pos.y > 0.0);
}

/// Falling snow with a shared sway; wraps on every edge
pub fn step_snow(state: &mut SimState) {
    let sway = (state.elapsed_ticks as f32 / 50.0).sin() * 0.5;
    for flake in &mut state.snow {
        flake.pos.y += flake.speed;
        flake.pos.x += sway;
        if flake.pos.y > FIELD_HEIGHT {
            flake.pos.y = 0.0;
        }
        if flake.pos.x > FIELD_WIDTH {
            flake.pos.x = 0.0;
        }
        if flake.pos.x < 0.0 {
            flake.pos.x = FIELD_WIDTH;
        }
    }
}
