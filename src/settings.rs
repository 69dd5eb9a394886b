//! Game settings and preferences
//!
//! Persisted separately from the leaderboard in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::strings::{Language, StringTable};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Text language for in-canvas messages
    pub language: Language,

    // === Gameplay ===
    /// Let the bonus-life elf appear on the levels that have one
    pub spawn_pursuer: bool,
    /// Lives at the start of a run
    pub starting_lives: u32,

    // === Visual Effects ===
    /// Ambient falling snow
    pub snow: bool,

    // === Accessibility ===
    /// Reduced motion (no snow, no elf trail)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::En,
            spawn_pursuer: true,
            starting_lives: 3,
            snow: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective snow (respects reduced_motion)
    pub fn effective_snow(&self) -> bool {
        self.snow && !self.reduced_motion
    }

    /// Effective elf trail (respects reduced_motion)
    pub fn effective_trail(&self) -> bool {
        !self.reduced_motion
    }

    pub fn strings(&self) -> &'static dyn StringTable {
        self.language.table()
    }

    /// Starting lives, never zero
    pub fn lives(&self) -> u32 {
        self.starting_lives.max(1)
    }

    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(json)?)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "sleigh_run_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<(), StorageError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)?;

        let json = serde_json::to_string(self)?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| StorageError::Unavailable)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<(), StorageError> {
        // No-op for native
        Ok(())
    }
}
