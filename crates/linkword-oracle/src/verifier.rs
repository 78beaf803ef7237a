//! Closed-world verification of parsed oracle output
//!
//! Every check is a pure function of the words the oracle was shown and what
//! it returned. Nothing here touches the store.

use crate::config::ClueCollision;
use crate::parser::{ClueResponse, GuessEntry};
use linkword_domain::{is_valid_clue_text, ClueSubmission, ConnectionId, PuzzleError, Selection, SelectionUpdate, Word, WordId};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// A generated clue that survived verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClue {
    /// The clue word, trimmed
    pub clue: String,
    /// Flag for every input word, in the oracle's order
    pub selections: Vec<(WordId, bool)>,
}

impl VerifiedClue {
    /// Number of words flagged as selected
    pub fn selected_count(&self) -> usize {
        self.selections.iter().filter(|(_, selected)| *selected).count()
    }

    /// Turn the verified clue into a submission for the clue validator
    ///
    /// The declared count is the number of selected entries, so the
    /// validator re-checks it against the connection after the updates apply.
    pub fn into_submission(self, connection_id: ConnectionId) -> ClueSubmission {
        let declared_count = self.selected_count();
        ClueSubmission {
            connection_id,
            updates: self
                .selections
                .into_iter()
                .map(|(word_id, selected)| SelectionUpdate::new(word_id, Selection::from(selected)))
                .collect(),
            clue_text: self.clue,
            declared_count,
        }
    }
}

/// One word of a verified guess, with its id taken from the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessedWord {
    /// The input word the entry named
    pub word: Word,
    /// Whether the oracle picked it
    pub selected: bool,
}

/// Verify a generated clue against the words the oracle was shown
///
/// Checks, in order:
/// - no id appears twice
/// - the id set equals the input id set
/// - the word set equals the input word set
/// - every id is paired with its own word
/// - the clue is a single token
/// - the clue does not collide with any input word
pub fn verify_clue_response(
    input: &[Word],
    response: ClueResponse,
    collision: ClueCollision,
) -> Result<VerifiedClue, PuzzleError> {
    let mut seen = HashSet::new();
    for entry in &response.selected_words {
        if !seen.insert(entry.id) {
            return Err(reject(PuzzleError::OracleIdentityViolation(format!(
                "id {} returned more than once",
                entry.id
            ))));
        }
    }

    let expected_ids: HashSet<i64> = input.iter().map(|w| w.id.value()).collect();
    if seen != expected_ids {
        let mut invented: Vec<i64> = seen.difference(&expected_ids).copied().collect();
        let mut missing: Vec<i64> = expected_ids.difference(&seen).copied().collect();
        invented.sort_unstable();
        missing.sort_unstable();
        return Err(reject(PuzzleError::OracleIdentityViolation(format!(
            "id set differs from input (invented {:?}, missing {:?})",
            invented, missing
        ))));
    }

    let expected_words: HashSet<&str> = input.iter().map(|w| w.text.as_str()).collect();
    let returned_words: HashSet<&str> = response
        .selected_words
        .iter()
        .map(|e| e.word.as_str())
        .collect();
    if returned_words != expected_words {
        return Err(reject(PuzzleError::OracleIdentityViolation(
            "word set differs from input".to_string(),
        )));
    }

    let by_id: HashMap<i64, &str> = input.iter().map(|w| (w.id.value(), w.text.as_str())).collect();
    for entry in &response.selected_words {
        if by_id.get(&entry.id) != Some(&entry.word.as_str()) {
            return Err(reject(PuzzleError::OracleIdentityViolation(format!(
                "id {} is paired with {:?}",
                entry.id, entry.word
            ))));
        }
    }

    let clue = check_clue_word(input, &response.clue, collision)?;

    Ok(VerifiedClue {
        clue,
        selections: response
            .selected_words
            .into_iter()
            .map(|e| (WordId::from_value(e.id), e.selected))
            .collect(),
    })
}

/// Verify a linking word generated for an existing selection
///
/// `input` is every word of the connection, selected or not; the clue may
/// collide with none of them. Returns the trimmed clue.
pub fn verify_linking_word(
    input: &[Word],
    clue: &str,
    collision: ClueCollision,
) -> Result<String, PuzzleError> {
    check_clue_word(input, clue, collision)
}

/// The clue must be one token and must not collide with any input word
fn check_clue_word(input: &[Word], clue: &str, collision: ClueCollision) -> Result<String, PuzzleError> {
    if !is_valid_clue_text(clue) {
        return Err(reject(PuzzleError::OracleFormatError(format!(
            "clue {:?} is not a single word",
            clue
        ))));
    }

    if let Some(word) = input.iter().find(|w| collision.collides(clue, &w.text)) {
        warn!("Oracle clue {:?} collides with input word {:?}", clue, word.text);
        return Err(PuzzleError::OracleClueCollision(clue.to_string()));
    }

    Ok(clue.trim().to_string())
}

/// Verify a guess against the words the oracle was shown
///
/// Every entry must name an input word, no word may appear twice, and exactly
/// `count_to_select` entries may be selected. Ids are re-attached from the
/// input by word text.
pub fn verify_guess(
    input: &[Word],
    entries: Vec<GuessEntry>,
    count_to_select: usize,
) -> Result<Vec<GuessedWord>, PuzzleError> {
    let by_text: HashMap<&str, &Word> = input.iter().map(|w| (w.text.as_str(), w)).collect();
    let mut seen = HashSet::new();
    let mut guessed = Vec::with_capacity(entries.len());

    for entry in entries {
        let word = by_text.get(entry.word.as_str()).copied().ok_or_else(|| {
            reject(PuzzleError::OracleIdentityViolation(format!(
                "{:?} is not one of the input words",
                entry.word
            )))
        })?;

        if !seen.insert(word.id) {
            return Err(reject(PuzzleError::OracleIdentityViolation(format!(
                "{:?} returned more than once",
                entry.word
            ))));
        }

        guessed.push(GuessedWord {
            word: word.clone(),
            selected: entry.selected,
        });
    }

    let actual = guessed.iter().filter(|g| g.selected).count();
    if actual != count_to_select {
        return Err(reject(PuzzleError::OracleSelectionCountMismatch {
            expected: count_to_select,
            actual,
        }));
    }

    Ok(guessed)
}

fn reject(err: PuzzleError) -> PuzzleError {
    warn!("Oracle response rejected: {}", err);
    err
}
