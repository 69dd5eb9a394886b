//! Keyboard state
//!
//! DOM `KeyboardEvent.key` strings are folded into held directions plus two
//! latched one-shot commands (pause toggle, confirm) consumed once per tick.

use crate::sim::{HeldKeys, TickInput};

/// What a key does in game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Up,
    Down,
    Left,
    Right,
    Pause,
    Confirm,
}

impl KeyAction {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "w" | "W" => Some(KeyAction::Up),
            "ArrowDown" | "s" | "S" => Some(KeyAction::Down),
            "ArrowLeft" | "a" | "A" => Some(KeyAction::Left),
            "ArrowRight" | "d" | "D" => Some(KeyAction::Right),
            "p" | "P" => Some(KeyAction::Pause),
            " " | "Enter" => Some(KeyAction::Confirm),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HeldKeys,
    pause_pressed: bool,
    confirm_pressed: bool,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a keydown; returns whether the key is one the game uses
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(action) = KeyAction::from_key(key) else {
            return false;
        };
        match action {
            KeyAction::Up => self.held.up = true,
            KeyAction::Down => self.held.down = true,
            KeyAction::Left => self.held.left = true,
            KeyAction::Right => self.held.right = true,
            KeyAction::Pause => self.pause_pressed = true,
            KeyAction::Confirm => self.confirm_pressed = true,
        }
        true
    }

    pub fn key_up(&mut self, key: &str) {
        match KeyAction::from_key(key) {
            Some(KeyAction::Up) => self.held.up = false,
            Some(KeyAction::Down) => self.held.down = false,
            Some(KeyAction::Left) => self.held.left = false,
            Some(KeyAction::Right) => self.held.right = false,
            _ => {}
        }
    }

    pub fn held(&self) -> HeldKeys {
        self.held
    }

    /// Release everything (window lost focus)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn take_confirm(&mut self) -> bool {
        std::mem::take(&mut self.confirm_pressed)
    }

    /// Input for the next tick; the pause latch is consumed
    pub fn tick_input(&mut self, autopilot: bool) -> TickInput {
        TickInput {
            held: self.held,
            toggle_pause: std::mem::take(&mut self.pause_pressed),
            external_pause: false,
            autopilot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrows_and_wasd_both_steer() {
        let mut keys = KeyState::new();
        assert!(keys.key_down("ArrowUp"));
        assert!(keys.key_down("D"));
        let held = keys.held();
        assert!(held.up && held.right && !held.left && !held.down);

        keys.key_up("ArrowUp");
        keys.key_up("d");
        assert_eq!(keys.held(), HeldKeys::default());
        assert!(!keys.key_down("q"));
    }

    #[test]
    fn test_pause_latch_fires_once() {
        let mut keys = KeyState::new();
        keys.key_down("p");
        assert!(keys.tick_input(false).toggle_pause);
        assert!(!keys.tick_input(false).toggle_pause);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut keys = KeyState::new();
        keys.key_down("a");
        keys.key_down("Enter");
        keys.clear();
        assert_eq!(keys.held(), HeldKeys::default());
        assert!(!keys.take_confirm());
    }
}
