//! Verification settings

use linkword_domain::word_key;
use serde::{Deserialize, Serialize};

/// How a generated clue is compared against the input words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClueCollision {
    /// Trim both sides and compare lowercased text
    #[default]
    CaseInsensitive,
    /// Trim both sides and compare exactly
    CaseSensitive,
}

impl ClueCollision {
    /// Whether `clue` counts as the same text as `word`
    pub fn collides(self, clue: &str, word: &str) -> bool {
        match self {
            ClueCollision::CaseInsensitive => word_key(clue) == word_key(word),
            ClueCollision::CaseSensitive => clue.trim() == word.trim(),
        }
    }
}
