//! Collision rules and the crash/landing transitions they trigger
//!
//! Rules run against the post-integration sleigh box in a fixed priority:
//! static obstacles (platform included, in insertion order), gifts, the elf,
//! birds, the dog, snowballs. A crash or a landing ends the pass for that tick.

use glam::Vec2;

use super::entity::EntityKind;
use super::schedule::TimedAction;
use super::state::{Arrival, CrashCause, GameEvent, LevelStatus, SimState};
use crate::consts::*;
use crate::strings::MessageKey;

/// What touching the platform amounts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformContact {
    /// Gifts still missing
    Locked,
    /// Slow enough on both axes
    Land,
    /// Too fast on at least one axis
    Hard,
}

/// Classify a platform touch from the gift count and the sleigh velocity
pub fn platform_contact(collected: u32, vel: Vec2, safe_speed: f32) -> PlatformContact {
    if collected < TOTAL_COLLECTIBLES {
        PlatformContact::Locked
    } else if vel.x.abs() < safe_speed && vel.y.abs() < safe_speed {
        PlatformContact::Land
    } else {
        PlatformContact::Hard
    }
}

/// Run every rule once for the current tick
pub fn evaluate(state: &mut SimState) {
    let sleigh = state.vehicle.rect();

    let hit = state
        .obstacles
        .iter()
        .find(|o| sleigh.overlaps(&o.rect()))
        .map(|o| matches!(o.kind, EntityKind::Platform));
    match hit {
        Some(true) => {
            let safe = state.tuning.safe_landing_velocity;
            match platform_contact(state.collected_count, state.vehicle.vel, safe) {
                PlatformContact::Locked => crash(state, CrashCause::PlatformLocked),
                PlatformContact::Land => land(state),
                PlatformContact::Hard => crash(state, CrashCause::HardLanding),
            }
            return;
        }
        Some(false) => {
            crash(state, CrashCause::Obstacle);
            return;
        }
        None => {}
    }

    let mut picked = 0;
    for gift in &mut state.collectibles {
        let gift_rect = gift.rect();
        if let EntityKind::Collectible {
            ref mut collected, ..
        } = gift.kind
        {
            if !*collected && sleigh.overlaps(&gift_rect) {
                *collected = true;
                picked += 1;
            }
        }
    }
    for _ in 0..picked {
        state.collected_count += 1;
        state.emit(GameEvent::GiftCollected {
            collected: state.collected_count,
            total: TOTAL_COLLECTIBLES,
        });
        if state.collected_count == TOTAL_COLLECTIBLES {
            log::info!("All gifts collected on level {}", state.level);
            let ttl = state.tuning.can_land_message_ticks;
            state.show_message(MessageKey::CanLand, Some(ttl));
            state.emit(GameEvent::AllGiftsCollected);
        }
    }

    let caught = match state.pursuer.as_mut() {
        Some(elf) if elf.is_live() && elf.catch_rect().overlaps(&sleigh) => {
            elf.caught = true;
            elf.active = false;
            true
        }
        _ => false,
    };
    if caught {
        log::info!("Elf caught on level {}", state.level);
        state.emit(GameEvent::PursuerCaught);
    }

    if state.birds.iter().any(|b| sleigh.overlaps(&b.rect())) {
        crash(state, CrashCause::Bird);
        return;
    }

    if state.dogs.iter().any(|d| sleigh.overlaps(&d.rect())) {
        crash(state, CrashCause::Dog);
        return;
    }

    if let Some(i) = state
        .projectiles
        .iter()
        .position(|p| sleigh.overlaps(&p.rect()))
    {
        state.projectiles.remove(i);
        crash(state, CrashCause::Projectile);
    }
}

/// Lose the sleigh: take a life and queue either a respawn or the game over
pub fn crash(state: &mut SimState, cause: CrashCause) {
    if state.status != LevelStatus::Playing {
        return;
    }
    state.status = LevelStatus::Crashed;
    state.vehicle.thrusting_up = false;

    if cause == CrashCause::PlatformLocked {
        state.show_message(MessageKey::CollectFirst, None);
    }

    let due = state.clock + state.tuning.crash_delay_ticks;
    if state.lives <= 1 {
        state.lives = 0;
        state.schedule.push(due, TimedAction::GameOver);
    } else {
        state.lives -= 1;
        state.schedule.push(due, TimedAction::Respawn);
    }

    log::info!(
        "Crash on level {} ({:?}), {} lives left",
        state.level,
        cause,
        state.lives
    );
    state.emit(GameEvent::Crashed {
        cause,
        lives_left: state.lives,
    });
}

/// Touch down: park on the platform and start the arrival walk
pub fn land(state: &mut SimState) {
    if state.status != LevelStatus::Playing {
        return;
    }
    state.status = LevelStatus::Landed;
    state.vehicle.vel = Vec2::ZERO;
    state.vehicle.thrusting_up = false;
    if let Some(platform_y) = state.platform().map(|p| p.pos.y) {
        state.vehicle.pos.y = platform_y - VEHICLE_HEIGHT;
    }

    state.arrival = Some(Arrival {
        x: state.vehicle.pos.x + VEHICLE_WIDTH / 2.0,
        steps: 0,
        total_steps: state.tuning.arrival_steps(),
    });
    let due = state.clock + state.tuning.arrival_interval_ticks;
    state.schedule.push(due, TimedAction::ArrivalStep);

    log::info!(
        "Landed on level {} after {} ticks",
        state.level,
        state.elapsed_ticks
    );
    state.emit(GameEvent::Landed);
}
