//! Words - the shared, independently owned vocabulary of the puzzle

use std::fmt;

/// Identifier of a word in the pool
///
/// Assigned by the store on ingestion and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordId(i64);

impl WordId {
    /// Create a WordId from a raw value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A word in the pool
///
/// Words are created once on ingestion and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word {
    /// Unique identifier
    pub id: WordId,

    /// Canonical text, as first ingested
    pub text: String,
}

impl Word {
    /// Create a new word
    pub fn new(id: WordId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Key used for case-insensitive uniqueness
    pub fn key(&self) -> String {
        word_key(&self.text)
    }
}

/// Normalize raw word text for ingestion
///
/// Returns `None` for blank input, which callers skip silently.
///
/// # Examples
///
/// ```
/// use linkword_domain::normalize_word_text;
///
/// assert_eq!(normalize_word_text("  golf \n"), Some("golf".to_string()));
/// assert_eq!(normalize_word_text("   "), None);
/// ```
pub fn normalize_word_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Case-folded form of a word's text
pub fn word_key(text: &str) -> String {
    text.trim().to_lowercase()
}
