//! Data-driven game balance
//!
//! Every value is expressed per simulation tick (60 Hz). Defaults reproduce the
//! shipped game; a JSON blob may override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Sleigh ===
    /// Velocity added per held direction key per tick
    pub thrust: f32,
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Velocity multiplier applied every tick
    pub drag: f32,
    /// Per-axis speed cap
    pub max_velocity: f32,
    /// Both axes must be strictly below this to land
    pub safe_landing_velocity: f32,
    /// How far outside the field the sleigh may drift before crashing
    pub out_of_bounds_margin: f32,

    // === Placement ===
    pub placement_attempts: u32,
    pub placement_obstacle_padding: f32,
    pub placement_min_spacing: f32,

    // === Elf ===
    pub pursuer_sense_radius: f32,
    pub pursuer_accel: f32,
    pub pursuer_jitter: f32,
    pub pursuer_max_speed: f32,
    pub pursuer_damping: f32,
    pub pursuer_edge_margin: f32,
    pub pursuer_mode: PursuerMode,
    pub trail_interval_ticks: u64,
    pub trail_fade: f32,

    // === Antagonist ===
    pub antagonist_radius: f32,
    pub antagonist_strength: f32,

    // === Birds ===
    pub bird_wrap_margin: f32,

    // === Dog ===
    pub dog_spawn_after_ticks: u64,
    pub dog_speed: f32,
    pub dog_base_y: f32,
    pub dog_amplitude: f32,
    pub dog_period_divisor: f32,

    // === Projectiles ===
    pub projectile_interval_ticks: u64,
    pub projectile_gravity: f32,
    pub projectile_launch_speed: f32,
    pub projectile_aim_anchor_x: f32,
    pub projectile_aim_divisor: f32,

    // === Snow ===
    pub snowflake_count: usize,

    // === Transitions (ticks) ===
    pub crash_delay_ticks: u64,
    pub arrival_interval_ticks: u64,
    pub arrival_step: f32,
    pub arrival_walk_speed: f32,
    pub can_land_message_ticks: u64,
    pub elf_message_ticks: u64,
}

/// How the elf reacts once the sleigh is within its sense radius
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PursuerMode {
    /// Accelerate toward the sleigh
    #[default]
    Chase,
    /// Accelerate away from the sleigh (makes the bonus life harder to earn)
    Flee,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            thrust: 0.25,
            gravity: 0.08,
            drag: 0.985,
            max_velocity: 6.0,
            safe_landing_velocity: 1.7,
            out_of_bounds_margin: 20.0,

            placement_attempts: 100,
            placement_obstacle_padding: 50.0,
            placement_min_spacing: 120.0,

            pursuer_sense_radius: 220.0,
            pursuer_accel: 0.45,
            pursuer_jitter: 0.25,
            pursuer_max_speed: 5.0,
            pursuer_damping: 0.99,
            pursuer_edge_margin: 20.0,
            pursuer_mode: PursuerMode::Chase,
            trail_interval_ticks: 3,
            trail_fade: 0.02,

            antagonist_radius: 450.0,
            antagonist_strength: 0.09,

            bird_wrap_margin: 50.0,

            dog_spawn_after_ticks: 600,
            dog_speed: 4.5,
            dog_base_y: 200.0,
            dog_amplitude: 160.0,
            dog_period_divisor: 20.0,

            projectile_interval_ticks: 90,
            projectile_gravity: 0.07,
            projectile_launch_speed: 6.5,
            projectile_aim_anchor_x: 300.0,
            projectile_aim_divisor: 100.0,

            snowflake_count: 120,

            crash_delay_ticks: 120,
            arrival_interval_ticks: 2,
            arrival_step: 0.02,
            arrival_walk_speed: 1.5,
            can_land_message_ticks: 180,
            elf_message_ticks: 240,
        }
    }
}

impl Tuning {
    /// Parse overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of arrival steps needed to go from 0 to 1
    pub fn arrival_steps(&self) -> u32 {
        (1.0 / self.arrival_step).round().max(1.0) as u32
    }
}
