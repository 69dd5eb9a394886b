//! In-canvas message lookup
//!
//! The simulation stores `MessageKey`s; text is resolved at draw time through a
//! `StringTable`, so the screen layer can swap languages without touching state.

use serde::{Deserialize, Serialize};

/// Every string the play field may draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKey {
    /// Touched the platform before collecting every gift
    CollectFirst,
    /// All gifts collected
    CanLand,
    /// The elf showed up on this level
    ElfAppeared,
    /// Label drawn over a crashed sleigh
    Crash,
    Paused,
    ResumeHint,
    /// Shout drawn over the arrival walk
    Arrival,
}

/// Read-only lookup by key
pub trait StringTable {
    fn lookup(&self, key: MessageKey) -> &str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishStrings;

impl StringTable for EnglishStrings {
    fn lookup(&self, key: MessageKey) -> &str {
        match key {
            MessageKey::CollectFirst => "COLLECT ALL THE GIFTS BEFORE LANDING!",
            MessageKey::CanLand => "ALL GIFTS COLLECTED! YOU MAY LAND",
            MessageKey::ElfAppeared => "A WILD ELF APPEARED! CATCH HIM FOR AN EXTRA LIFE",
            MessageKey::Crash => "CRASH!",
            MessageKey::Paused => "PAUSED",
            MessageKey::ResumeHint => "PRESS P TO RESUME",
            MessageKey::Arrival => "OH OH OH",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ItalianStrings;

impl StringTable for ItalianStrings {
    fn lookup(&self, key: MessageKey) -> &str {
        match key {
            MessageKey::CollectFirst => "RACCOGLI TUTTI I REGALI PRIMA DI ATTERRARE!",
            MessageKey::CanLand => "REGALI RACCOLTI! PUOI ATTERRARE",
            MessageKey::ElfAppeared => "UN ELFO SELVATICO! PRENDILO PER UNA VITA EXTRA",
            MessageKey::Crash => "SCHIANTO!",
            MessageKey::Paused => "PAUSA",
            MessageKey::ResumeHint => "PREMI P PER RIPRENDERE",
            MessageKey::Arrival => "OH OH OH",
        }
    }
}

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    En,
    It,
}

impl Language {
    pub fn table(self) -> &'static dyn StringTable {
        match self {
            Language::En => &EnglishStrings,
            Language::It => &ItalianStrings,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "en" | "english" => Some(Language::En),
            "it" | "italian" | "italiano" => Some(Language::It),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_platform_text_differs_from_crash_text() {
        let t = EnglishStrings;
        assert_ne!(t.lookup(MessageKey::CollectFirst), t.lookup(MessageKey::Crash));
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("IT"), Some(Language::It));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::It.table().lookup(MessageKey::Paused), "PAUSA");
    }
}
