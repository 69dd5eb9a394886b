//! Best-times leaderboard
//!
//! Persisted to LocalStorage. One list for every level, kept in ascending time
//! order and capped at `MAX_SCORES`; per-level views show the fastest few.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Maximum number of scores kept across all levels
pub const MAX_SCORES: usize = 100;
/// Entries shown per level
pub const LEVEL_BOARD_LEN: usize = 10;
/// Longest accepted player name
pub const MAX_NAME_LEN: usize = 10;
/// Name used when a score is recorded without one
pub const DEFAULT_NAME: &str = "SANTA";

/// A single completed level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub name: String,
    pub level: u32,
    /// Whole seconds
    pub time: u32,
    /// Display date, already formatted
    pub date: String,
}

impl Score {
    pub fn new(name: &str, level: u32, time: u32, date: impl Into<String>) -> Self {
        let name = if name.is_empty() { DEFAULT_NAME } else { name };
        Self {
            name: name.to_string(),
            level,
            time,
            date: date.into(),
        }
    }
}

/// Leaderboard plus the lifetime game counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<Score>,
    #[serde(default)]
    pub games_played: u64,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "sleigh_run_scores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping ascending time order; ties keep arrival order.
    ///
    /// Returns the 1-based rank, or `None` when the list was full and the new
    /// entry fell off the end.
    pub fn add_score(&mut self, score: Score) -> Option<usize> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.time > score.time)
            .unwrap_or(self.entries.len());
        log::info!(
            "Score: {} level {} in {}s (rank {})",
            score.name,
            score.level,
            score.time,
            pos + 1
        );
        self.entries.insert(pos, score);
        self.entries.truncate(MAX_SCORES);
        (pos < MAX_SCORES).then_some(pos + 1)
    }

    /// The fastest entries for one level
    pub fn for_level(&self, level: u32) -> Vec<&Score> {
        self.entries
            .iter()
            .filter(|s| s.level == level)
            .take(LEVEL_BOARD_LEN)
            .collect()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.iter().any(|s| s.name == name)
    }

    /// `name`, or `name_1`, `name_2`, ... if it is already on the board
    pub fn unique_name(&self, name: &str) -> String {
        if !self.contains_name(name) {
            return name.to_string();
        }
        let mut counter = 1;
        loop {
            let candidate = format!("{}_{}", name, counter);
            if !self.contains_name(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Count a started run
    pub fn record_game(&mut self) -> u64 {
        self.games_played += 1;
        self.games_played
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best time on a level (if any)
    pub fn best_time(&self, level: u32) -> Option<u32> {
        self.for_level(level).first().map(|s| s.time)
    }

    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        // Stored data may predate the ordering rule
        scores.entries.sort_by_key(|s| s.time);
        scores.entries.truncate(MAX_SCORES);
        Ok(scores)
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(scores) => {
                        log::info!("Loaded {} high scores", scores.entries.len());
                        return scores;
                    }
                    Err(e) => log::warn!("Discarding stored high scores: {}", e),
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<(), StorageError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)?;

        let json = self.to_json()?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| StorageError::Unavailable)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<(), StorageError> {
        // No-op for native
        Ok(())
    }
}

/// Today's date in the browser's short locale format
#[cfg(target_arch = "wasm32")]
pub fn today() -> String {
    let date = js_sys::Date::new_0();
    String::from(date.to_locale_date_string("default", &wasm_bindgen::JsValue::UNDEFINED))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn today() -> String {
    "N/A".to_string()
}
