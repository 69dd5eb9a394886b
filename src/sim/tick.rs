//! Fixed timestep simulation tick
//!
//! One call advances the level by exactly one 60 Hz step: due scheduled actions
//! fire first, then pause handling, then (while playing) motion and rules.

use super::autopilot;
use super::collision;
use super::level;
use super::physics::{self, HeldKeys};
use super::schedule::TimedAction;
use super::state::{GameEvent, LevelStatus, SimState};
use crate::ticks_to_seconds;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Direction keys currently held
    pub held: HeldKeys,
    /// Pause toggle pressed since the last tick
    pub toggle_pause: bool,
    /// Pause imposed by the surrounding layer (overlays)
    pub external_pause: bool,
    /// Demo mode - steering is computed instead of read from `held`
    pub autopilot: bool,
}

/// Advance the level by one fixed timestep
pub fn tick(state: &mut SimState, input: &TickInput) {
    if state.finished {
        return;
    }

    state.clock += 1;
    for action in state.schedule.take_due(state.clock) {
        let respawned = matches!(action, TimedAction::Respawn);
        apply_action(state, action);
        // A rebuild or a terminal event ends the tick; the new state is seen next tick
        if respawned || state.finished {
            return;
        }
    }

    if input.toggle_pause && state.status == LevelStatus::Playing {
        state.paused = !state.paused;
        log::debug!("Paused: {}", state.paused);
    }
    state.external_pause = input.external_pause;

    if state.status != LevelStatus::Playing || state.is_paused() {
        return;
    }

    state.elapsed_ticks += 1;

    let keys = if input.autopilot {
        autopilot::steer(state)
    } else {
        input.held
    };

    match physics::integrate(state, &keys) {
        Some(cause) => collision::crash(state, cause),
        None => collision::evaluate(state),
    }
    physics::despawn_projectiles(&mut state.projectiles);
}

fn apply_action(state: &mut SimState, action: TimedAction) {
    match action {
        TimedAction::Respawn => {
            log::info!("Respawning level {} with {} lives", state.level, state.lives);
            level::build(state);
        }
        TimedAction::GameOver => {
            log::info!("Game over on level {}", state.level);
            state.emit(GameEvent::GameOver);
            state.teardown();
        }
        TimedAction::ArrivalStep => advance_arrival(state),
        TimedAction::ClearMessage { serial } => state.expire_message(serial),
    }
}

fn advance_arrival(state: &mut SimState) {
    let walk = state.tuning.arrival_walk_speed;
    let Some(arrival) = state.arrival.as_mut() else {
        return;
    };
    arrival.steps += 1;
    arrival.x += walk;

    if arrival.is_complete() {
        let elapsed_ticks = state.elapsed_ticks;
        let seconds = ticks_to_seconds(elapsed_ticks);
        log::info!("Level {} won in {}s", state.level, seconds);
        state.emit(GameEvent::LevelWon {
            elapsed_ticks,
            seconds,
        });
        state.teardown();
    } else {
        let due = state.clock + state.tuning.arrival_interval_ticks;
        state.schedule.push(due, TimedAction::ArrivalStep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::entity::EntityKind;
    use crate::sim::state::CrashCause;
    use crate::strings::MessageKey;
    use glam::Vec2;
    use proptest::prelude::*;

    fn idle(state: &mut SimState, ticks: u32) {
        let input = TickInput::default();
        for _ in 0..ticks {
            tick(state, &input);
        }
    }

    #[test]
    fn test_elapsed_advances_only_while_playing() {
        let mut state = SimState::new(1, 3, false, 5);
        idle(&mut state, 10);
        assert_eq!(state.elapsed_ticks, 10);
        assert_eq!(state.clock, 10);

        tick(
            &mut state,
            &TickInput {
                toggle_pause: true,
                ..Default::default()
            },
        );
        assert!(state.paused);
        let frozen = state.vehicle.pos;
        idle(&mut state, 30);
        assert_eq!(state.elapsed_ticks, 10);
        assert_eq!(state.clock, 41);
        assert_eq!(state.vehicle.pos, frozen);

        tick(
            &mut state,
            &TickInput {
                toggle_pause: true,
                ..Default::default()
            },
        );
        assert!(!state.paused);
        assert_eq!(state.elapsed_ticks, 11);
    }

    #[test]
    fn test_external_pause_suspends_without_toggling() {
        let mut state = SimState::new(1, 3, false, 5);
        let input = TickInput {
            external_pause: true,
            ..Default::default()
        };
        for _ in 0..20 {
            tick(&mut state, &input);
        }
        assert_eq!(state.elapsed_ticks, 0);
        assert!(!state.paused);
        assert!(state.is_paused());

        idle(&mut state, 1);
        assert!(!state.is_paused());
        assert_eq!(state.elapsed_ticks, 1);
    }

    #[test]
    fn test_message_expires_while_paused() {
        let mut state = SimState::new(2, 3, true, 5);
        assert_eq!(state.message.map(|m| m.key), Some(MessageKey::ElfAppeared));
        let input = TickInput {
            external_pause: true,
            ..Default::default()
        };
        for _ in 0..state.tuning.elf_message_ticks {
            tick(&mut state, &input);
        }
        assert_eq!(state.message, None);
    }

    #[test]
    fn test_crash_with_spare_lives_rebuilds_after_delay() {
        let mut state = SimState::new(1, 3, false, 5);
        state.vehicle.pos = state.collectibles[0].pos;
        collision::evaluate(&mut state);
        assert!(state.collected_count > 0);

        collision::crash(&mut state, CrashCause::Obstacle);
        assert_eq!(state.lives, 2);

        idle(&mut state, 119);
        assert_eq!(state.status, LevelStatus::Crashed);
        assert_eq!(state.attempt, 1);

        idle(&mut state, 1);
        assert_eq!(state.status, LevelStatus::Playing);
        assert_eq!(state.attempt, 2);
        assert_eq!(state.collected_count, 0);
        assert_eq!(state.lives, 2);
        assert_eq!(state.elapsed_ticks, 0);
        assert_eq!(state.vehicle.pos, Vec2::new(VEHICLE_START_X, VEHICLE_START_Y));
        assert!(state.collectibles.iter().all(|g| !g.is_collected()));
    }

    #[test]
    fn test_crash_on_last_life_ends_run() {
        let mut state = SimState::new(1, 1, false, 5);
        collision::crash(&mut state, CrashCause::HardLanding);
        assert_eq!(state.lives, 0);

        idle(&mut state, 119);
        assert!(!state.finished);
        idle(&mut state, 1);
        assert!(state.finished);
        assert_eq!(state.attempt, 1, "never rebuilt");
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::GameOver));

        idle(&mut state, 500);
        assert_eq!(state.attempt, 1);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_landing_walk_reports_win() {
        let mut state = SimState::new(1, 3, false, 5);
        for gift in &mut state.collectibles {
            gift.kind = EntityKind::Collectible {
                icon: "🎁",
                collected: true,
            };
        }
        state.collected_count = TOTAL_COLLECTIBLES;
        state.elapsed_ticks = 125;
        collision::land(&mut state);
        let start_x = state.arrival.unwrap().x;

        idle(&mut state, 99);
        assert!(!state.finished);
        let arrival = state.arrival.unwrap();
        assert_eq!(arrival.steps, 49);
        assert!((arrival.x - (start_x + 49.0 * 1.5)).abs() < 1e-3);
        assert_eq!(state.elapsed_ticks, 125, "clock frozen while landed");

        idle(&mut state, 1);
        assert!(state.finished);
        assert!(state.drain_events().contains(&GameEvent::LevelWon {
            elapsed_ticks: 125,
            seconds: 2
        }));
    }

    #[test]
    fn test_pause_toggle_ignored_after_crash() {
        let mut state = SimState::new(1, 3, false, 5);
        collision::crash(&mut state, CrashCause::Bird);
        tick(
            &mut state,
            &TickInput {
                toggle_pause: true,
                ..Default::default()
            },
        );
        assert!(!state.paused);
    }

    #[test]
    fn test_free_fall_eventually_crashes() {
        let mut state = SimState::new(1, 3, false, 5);
        for _ in 0..600 {
            tick(&mut state, &TickInput::default());
            if state.status != LevelStatus::Playing {
                break;
            }
        }
        assert_eq!(state.status, LevelStatus::Crashed);
    }

    #[test]
    fn test_spent_snowballs_cleared_after_rules() {
        let mut state = SimState::new(3, 3, false, 5);
        let id = state.next_entity_id();
        state.projectiles.push(crate::sim::entity::Entity {
            id,
            kind: EntityKind::Projectile { vel: Vec2::ZERO },
            pos: Vec2::new(700.0, -5.0),
            size: Vec2::splat(8.0),
            color: crate::sim::entity::rgb(0xffffff),
        });
        idle(&mut state, 1);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_autopilot_input_drives_the_sleigh() {
        let mut state = SimState::new(1, 3, false, 5);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..30 {
            tick(&mut state, &input);
        }
        assert_ne!(state.vehicle.pos, Vec2::new(VEHICLE_START_X, VEHICLE_START_Y));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_random_play_keeps_invariants(
            seed in any::<u64>(),
            level in 1u32..=4,
            keys in proptest::collection::vec(0u8..16, 1..400),
        ) {
            let mut state = SimState::new(level, 3, true, seed);
            let mut last_attempt = state.attempt;
            let mut last_count = 0;
            for k in keys {
                let input = TickInput {
                    held: HeldKeys {
                        up: k & 1 != 0,
                        down: k & 2 != 0,
                        left: k & 4 != 0,
                        right: k & 8 != 0,
                    },
                    ..Default::default()
                };
                tick(&mut state, &input);

                prop_assert!(state.vehicle.vel.x.abs() <= state.tuning.max_velocity);
                prop_assert!(state.vehicle.vel.y.abs() <= state.tuning.max_velocity);
                prop_assert_eq!(state.collectibles.len(), TOTAL_COLLECTIBLES as usize);
                prop_assert!(state.collected_count <= TOTAL_COLLECTIBLES);
                if state.attempt == last_attempt {
                    prop_assert!(state.collected_count >= last_count);
                }
                if let Some(elf) = state.pursuer.as_ref() {
                    prop_assert!(elf.pos.x >= 0.0 && elf.pos.x <= FIELD_WIDTH);
                    prop_assert!(elf.pos.y >= 0.0 && elf.pos.y <= FIELD_HEIGHT);
                }
                last_attempt = state.attempt;
                last_count = state.collected_count;
            }
        }
    }
}
