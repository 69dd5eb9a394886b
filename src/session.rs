//! Player progression across levels
//!
//! A `Session` owns the running level and turns its drained events into run-level
//! consequences: bonus lives, recorded times, level advancement, game over.

use crate::consts::FINAL_LEVEL;
use crate::highscores::{self, HighScores, MAX_NAME_LEN, Score};
use crate::settings::Settings;
use crate::strings::Language;
use crate::sim::{GameEvent, Hud, SimState, TickInput, tick};
use crate::tuning::Tuning;

/// Where the run stands between and during levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a player name
    NameEntry,
    Playing,
    /// Between levels, waiting for `next_level`
    LevelWon,
    GameOver,
    /// Final level completed
    Victory,
}

/// Modal screens drawn over a running level; any of them pauses it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    ElfCaught,
    FinalLevelIntro,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub lives: u32,
    pub current_level: u32,
    /// Sum of the winning times so far
    pub total_seconds: u32,
}

impl Player {
    fn new(name: String, lives: u32) -> Self {
        Self {
            name,
            lives,
            current_level: 1,
            total_seconds: 0,
        }
    }
}

/// Normalize a typed name: trimmed, upper-cased, at most `MAX_NAME_LEN` characters
pub fn normalize_name(raw: &str) -> Option<String> {
    let name: String = raw.trim().to_uppercase().chars().take(MAX_NAME_LEN).collect();
    let name = name.trim_end().to_string();
    (!name.is_empty()).then_some(name)
}

pub struct Session {
    pub phase: Phase,
    pub overlay: Option<Overlay>,
    pub player: Player,
    pub scores: HighScores,
    pub settings: Settings,
    pub tuning: Tuning,
    /// The level being played (kept after it finishes so it can still be drawn)
    pub sim: Option<SimState>,
    seed: u64,
    levels_started: u64,
}

impl Session {
    pub fn new(settings: Settings, scores: HighScores, seed: u64) -> Self {
        Self {
            phase: Phase::NameEntry,
            overlay: None,
            player: Player::new(String::new(), settings.lives()),
            scores,
            settings,
            tuning: Tuning::default(),
            sim: None,
            seed,
            levels_started: 0,
        }
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Accept a player name and start level 1.
    ///
    /// Returns the name actually used (suffixed if already on the board), or `None`
    /// if the input was blank.
    pub fn confirm_name(&mut self, raw: &str) -> Option<&str> {
        self.begin(raw, 1)
    }

    /// Start a run at `level` (clamped to the playable range)
    pub fn begin(&mut self, raw: &str, level: u32) -> Option<&str> {
        let name = normalize_name(raw)?;
        let name = self.scores.unique_name(&name);
        let games = self.scores.record_game();
        if let Err(e) = self.scores.save() {
            log::warn!("Could not persist game counter: {}", e);
        }
        log::info!("Player {} starting run #{}", name, games);

        self.player = Player::new(name, self.settings.lives());
        self.player.current_level = level.clamp(1, FINAL_LEVEL);
        self.overlay = None;
        self.start_level();
        Some(&self.player.name)
    }

    fn start_level(&mut self) {
        self.levels_started += 1;
        let seed = self.seed.wrapping_add(self.levels_started);
        self.sim = Some(SimState::with_tuning(
            self.player.current_level,
            self.player.lives,
            self.settings.spawn_pursuer,
            seed,
            self.tuning.clone(),
        ));
        self.phase = Phase::Playing;
    }

    /// Advance the running level one tick and apply what it reported.
    ///
    /// Returns the events for logging.
    pub fn tick(&mut self, input: &TickInput) -> Vec<GameEvent> {
        let Some(sim) = self.sim.as_mut() else {
            return Vec::new();
        };
        let input = TickInput {
            external_pause: input.external_pause || self.overlay.is_some(),
            ..input.clone()
        };
        tick(sim, &input);
        let events = sim.drain_events();
        for event in &events {
            self.apply(*event);
        }
        events
    }

    fn apply(&mut self, event: GameEvent) {
        match event {
            GameEvent::PursuerCaught => {
                self.player.lives += 1;
                if let Some(sim) = self.sim.as_mut() {
                    sim.grant_life();
                }
                self.overlay = Some(Overlay::ElfCaught);
            }
            GameEvent::Crashed { lives_left, .. } => {
                self.player.lives = lives_left;
            }
            GameEvent::LevelWon { seconds, .. } => {
                let level = self.player.current_level;
                let score = Score::new(&self.player.name, level, seconds, highscores::today());
                self.scores.add_score(score);
                if let Err(e) = self.scores.save() {
                    log::warn!("Could not persist high scores: {}", e);
                }
                self.player.total_seconds += seconds;
                self.phase = if level < FINAL_LEVEL {
                    Phase::LevelWon
                } else {
                    log::info!(
                        "{} finished every level in {}s",
                        self.player.name,
                        self.player.total_seconds
                    );
                    Phase::Victory
                };
            }
            GameEvent::GameOver => {
                self.player.lives = 0;
                self.phase = Phase::GameOver;
            }
            _ => {}
        }
    }

    /// Move on after a won level; entering the final level raises its intro
    pub fn next_level(&mut self) -> bool {
        if self.phase != Phase::LevelWon {
            return false;
        }
        self.player.current_level += 1;
        if self.player.current_level == FINAL_LEVEL {
            self.overlay = Some(Overlay::FinalLevelIntro);
        }
        self.start_level();
        true
    }

    pub fn dismiss_overlay(&mut self) -> bool {
        self.overlay.take().is_some()
    }

    /// Confirm key (Space/Enter): close an overlay, continue after a won level, or
    /// leave the end-of-run screen for name entry
    pub fn confirm(&mut self) {
        if self.dismiss_overlay() {
            return;
        }
        match self.phase {
            Phase::LevelWon => {
                self.next_level();
            }
            Phase::GameOver | Phase::Victory => self.reset(),
            Phase::NameEntry | Phase::Playing => {}
        }
    }

    /// Enter pressed with `typed` in the name field: starts a run from name entry,
    /// acts as `confirm` anywhere else
    pub fn submit(&mut self, typed: &str) {
        if self.phase != Phase::NameEntry {
            self.confirm();
            return;
        }
        match self.confirm_name(typed) {
            Some(name) => log::info!("Welcome, {}", name),
            None => log::info!("Name required"),
        }
    }

    /// Switch the message language from a code such as `"it"` and persist it
    pub fn set_language(&mut self, code: &str) -> bool {
        let Some(language) = Language::from_code(code) else {
            log::warn!("Unknown language code {:?}", code);
            return false;
        };
        self.settings.language = language;
        if let Err(e) = self.settings.save() {
            log::warn!("Could not persist settings: {}", e);
        }
        true
    }

    /// Back to name entry with a fresh player
    pub fn reset(&mut self) {
        if let Some(sim) = self.sim.as_mut() {
            sim.teardown();
        }
        self.sim = None;
        self.overlay = None;
        self.player = Player::new(String::new(), self.settings.lives());
        self.phase = Phase::NameEntry;
    }

    pub fn hud(&self) -> Option<Hud> {
        self.sim.as_ref().map(|s| s.hud())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::collision;
    use crate::sim::entity::{EntityKind, Pursuer};
    use glam::Vec2;

    fn session() -> Session {
        Session::new(Settings::default(), HighScores::new(), 42)
    }

    fn win_current_level(s: &mut Session) {
        let sim = s.sim.as_mut().unwrap();
        for gift in &mut sim.collectibles {
            gift.kind = EntityKind::Collectible {
                icon: "🎁",
                collected: true,
            };
        }
        sim.collected_count = TOTAL_COLLECTIBLES;
        sim.elapsed_ticks = 600;
        collision::land(sim);
        for _ in 0..200 {
            s.tick(&TickInput::default());
        }
    }

    #[test]
    fn test_name_normalization() {
        assert_eq!(normalize_name("  rudolph "), Some("RUDOLPH".to_string()));
        assert_eq!(normalize_name("   "), None);
        assert_eq!(normalize_name(""), None);
        assert_eq!(
            normalize_name("abcdefghijklmn"),
            Some("ABCDEFGHIJ".to_string())
        );
    }

    #[test]
    fn test_confirm_name_dedupes_and_starts() {
        let mut scores = HighScores::new();
        scores.add_score(Score::new("BLITZEN", 1, 30, "d"));
        let mut s = Session::new(Settings::default(), scores, 1);
        assert_eq!(s.confirm_name(""), None);
        assert_eq!(s.phase, Phase::NameEntry);

        assert_eq!(s.confirm_name("blitzen"), Some("BLITZEN_1"));
        assert_eq!(s.phase, Phase::Playing);
        assert_eq!(s.player.lives, 3);
        assert_eq!(s.sim.as_ref().unwrap().level, 1);
        assert_eq!(s.scores.games_played, 1);
    }

    #[test]
    fn test_begin_at_later_level() {
        let mut s = session();
        assert_eq!(s.begin("prancer", 3), Some("PRANCER"));
        assert_eq!(s.sim.as_ref().unwrap().level, 3);
        s.begin("prancer", 99);
        assert_eq!(s.player.current_level, FINAL_LEVEL);
    }

    #[test]
    fn test_elf_catch_grants_life_and_pauses() {
        let mut s = Session::new(Settings::default(), HighScores::new(), 1);
        s.confirm_name("comet");
        let sim = s.sim.as_mut().unwrap();
        sim.vehicle.pos = Vec2::new(100.0, 100.0);
        sim.collectibles.clear();
        sim.pursuer = Some(Pursuer::new(Vec2::new(100.0, 100.0), Vec2::ZERO));
        s.tick(&TickInput::default());

        assert_eq!(s.player.lives, 4);
        assert_eq!(s.sim.as_ref().unwrap().lives, 4);
        assert_eq!(s.overlay, Some(Overlay::ElfCaught));

        let frozen = s.sim.as_ref().unwrap().elapsed_ticks;
        s.tick(&TickInput::default());
        assert_eq!(s.sim.as_ref().unwrap().elapsed_ticks, frozen);

        s.confirm();
        assert_eq!(s.overlay, None);
        s.tick(&TickInput::default());
        assert_eq!(s.sim.as_ref().unwrap().elapsed_ticks, frozen + 1);
    }

    #[test]
    fn test_level_win_records_score_and_advances() {
        let mut s = session();
        s.confirm_name("dasher");
        win_current_level(&mut s);
        assert_eq!(s.phase, Phase::LevelWon);
        assert_eq!(s.scores.for_level(1).len(), 1);
        assert_eq!(s.scores.for_level(1)[0].time, 10);
        assert_eq!(s.player.total_seconds, 10);

        s.confirm();
        assert_eq!(s.phase, Phase::Playing);
        assert_eq!(s.player.current_level, 2);
        assert_eq!(s.sim.as_ref().unwrap().level, 2);
    }

    #[test]
    fn test_final_level_intro_and_victory() {
        let mut s = session();
        s.confirm_name("vixen");
        for _ in 1..FINAL_LEVEL {
            win_current_level(&mut s);
            assert!(s.next_level());
        }
        assert_eq!(s.player.current_level, FINAL_LEVEL);
        assert_eq!(s.overlay, Some(Overlay::FinalLevelIntro));
        s.dismiss_overlay();

        win_current_level(&mut s);
        assert_eq!(s.phase, Phase::Victory);
        assert!(!s.next_level());
        assert_eq!(s.scores.entries.len(), FINAL_LEVEL as usize);
    }

    #[test]
    fn test_enter_submits_typed_name() {
        let mut s = session();
        s.submit("   ");
        assert_eq!(s.phase, Phase::NameEntry);
        s.submit("donner");
        assert_eq!(s.phase, Phase::Playing);
        assert_eq!(s.player.name, "DONNER");
    }

    #[test]
    fn test_confirm_after_victory_returns_to_name_entry() {
        let mut s = session();
        s.begin("vixen", FINAL_LEVEL);
        s.dismiss_overlay();
        win_current_level(&mut s);
        assert_eq!(s.phase, Phase::Victory);
        s.confirm();
        assert_eq!(s.phase, Phase::NameEntry);
        assert_eq!(s.scores.for_level(FINAL_LEVEL).len(), 1);
    }

    #[test]
    fn test_language_switch() {
        let mut s = session();
        assert!(s.set_language("it"));
        assert_eq!(s.settings.language, Language::It);
        assert!(!s.set_language("xx"));
        assert_eq!(s.settings.language, Language::It);
    }

    #[test]
    fn test_crashes_carry_lives_and_end_run() {
        let mut s = Session::new(
            Settings {
                starting_lives: 1,
                ..Default::default()
            },
            HighScores::new(),
            3,
        );
        s.confirm_name("cupid");
        let sim = s.sim.as_mut().unwrap();
        collision::crash(sim, crate::sim::CrashCause::Obstacle);
        for _ in 0..200 {
            s.tick(&TickInput::default());
        }
        assert_eq!(s.phase, Phase::GameOver);
        assert_eq!(s.player.lives, 0);

        s.confirm();
        assert_eq!(s.phase, Phase::NameEntry);
        assert!(s.sim.is_none());
        assert_eq!(s.player.lives, 1);
    }
}
