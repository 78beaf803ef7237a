//! Clues and the rules for attaching them
//!
//! Attaching a clue is planned here as a pure function of the current
//! connection state and the submission. The store runs the plan inside its
//! transaction, so every rule is evaluated against the state it commits.

use crate::{Connection, ConnectionId, PuzzleError, Selection, WordId};
use std::fmt;

/// Identifier of a clue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClueId(i64);

impl ClueId {
    /// Create a ClueId from a raw value
    pub fn from_value(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ClueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A clue attached to a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clue {
    /// Unique identifier
    pub id: ClueId,

    /// Owning connection
    pub connection_id: ConnectionId,

    /// The single-token clue, trimmed
    pub text: String,

    /// Number of selected links when the clue was committed
    pub clue_word_count: usize,

    /// Creation timestamp (seconds since Unix epoch)
    pub created_at: u64,
}

/// Check that a clue is exactly one whitespace-free token
///
/// Surrounding whitespace is ignored.
///
/// # Examples
///
/// ```
/// use linkword_domain::is_valid_clue_text;
///
/// assert!(is_valid_clue_text("rights"));
/// assert!(is_valid_clue_text(" rights "));
/// assert!(!is_valid_clue_text("civil rights"));
/// assert!(!is_valid_clue_text("   "));
/// ```
pub fn is_valid_clue_text(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && !trimmed.chars().any(char::is_whitespace)
}

/// Proposed flag for one word of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionUpdate {
    /// Word to update
    pub word_id: WordId,

    /// New flag value
    pub selected: Selection,
}

impl SelectionUpdate {
    /// Create an update
    pub fn new(word_id: WordId, selected: impl Into<Selection>) -> Self {
        Self {
            word_id,
            selected: selected.into(),
        }
    }
}

/// A request to clue a connection, as supplied by a player or the oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClueSubmission {
    /// Connection to clue
    pub connection_id: ConnectionId,

    /// Flag updates applied before counting
    pub updates: Vec<SelectionUpdate>,

    /// Clue text, untrimmed
    pub clue_text: String,

    /// Number of words the submitter claims are selected
    pub declared_count: usize,
}

/// The validated outcome of a submission, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClueAttachment {
    /// Connection being clued
    pub connection_id: ConnectionId,

    /// Trimmed clue text
    pub clue_text: String,

    /// Number of selected words recorded on the clue
    pub clue_word_count: usize,

    /// Final flag of every link, in play order
    pub flags: Vec<(WordId, Selection)>,
}

impl ClueSubmission {
    /// Evaluate the submission against the connection's current state
    ///
    /// Checks run in a fixed order: clue text, connection existence, clue
    /// absence, update membership, then the selected count after the updates
    /// are applied. Nothing is mutated; on success the caller persists the
    /// returned attachment as one unit.
    pub fn plan(&self, connection: Option<&Connection>) -> Result<ClueAttachment, PuzzleError> {
        if !is_valid_clue_text(&self.clue_text) {
            return Err(PuzzleError::InvalidClueText(self.clue_text.clone()));
        }

        let connection = connection.ok_or(PuzzleError::ConnectionNotFound(self.connection_id))?;

        if connection.is_clued() {
            return Err(PuzzleError::ClueAlreadyExists(connection.id));
        }

        // Reject the whole batch before applying any of it
        if let Some(stray) = self
            .updates
            .iter()
            .find(|u| !connection.contains_word(u.word_id))
        {
            return Err(PuzzleError::WordNotInSelection {
                connection_id: connection.id,
                word_id: stray.word_id,
            });
        }

        let mut flags: Vec<(WordId, Selection)> = connection
            .links
            .iter()
            .map(|l| (l.word.id, l.selected))
            .collect();

        for update in &self.updates {
            if let Some(slot) = flags.iter_mut().find(|(id, _)| *id == update.word_id) {
                slot.1 = update.selected;
            }
        }

        let actual = flags.iter().filter(|(_, s)| s.is_selected()).count();
        if actual != self.declared_count {
            return Err(PuzzleError::SelectionCountMismatch {
                declared: self.declared_count,
                actual,
            });
        }

        Ok(ClueAttachment {
            connection_id: connection.id,
            clue_text: self.clue_text.trim().to_string(),
            clue_word_count: self.declared_count,
            flags,
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: trimming never changes the verdict
        #[test]
        fn test_clue_text_trim_invariant(s in "\\PC*") {
            prop_assert_eq!(is_valid_clue_text(&s), is_valid_clue_text(s.trim()));
        }

        /// Property: any single token survives arbitrary surrounding whitespace
        #[test]
        fn test_clue_text_padding(token in "[a-zA-Z]{1,12}", left in "[ \t\n]{0,4}", right in "[ \t\n]{0,4}") {
            let padded = format!("{}{}{}", left, token, right);
            prop_assert!(is_valid_clue_text(&padded));
        }

        /// Property: joining two tokens with whitespace is always invalid
        #[test]
        fn test_clue_text_two_tokens(a in "[a-z]{1,8}", b in "[a-z]{1,8}", sep in "[ \t]{1,3}") {
            let joined = format!("{}{}{}", a, sep, b);
            prop_assert!(!is_valid_clue_text(&joined));
        }
    }
}
