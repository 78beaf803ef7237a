//! Error taxonomy shared by every layer
//!
//! These are rule violations, detected before any persisted mutation. Store
//! and transport failures are wrapped by the crates that own them.

use crate::{ConnectionId, WordId};
use thiserror::Error;

/// A puzzle rule was violated, or an oracle response failed verification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    /// The word pool holds fewer words than were requested
    #[error("Insufficient pool: requested {requested} words, only {available} available")]
    InsufficientPool {
        /// Number of words requested
        requested: usize,
        /// Number of words in the pool
        available: usize,
    },

    /// An initial selection pattern does not match the word count
    #[error("Length mismatch: expected {expected} entries, got {actual}")]
    LengthMismatch {
        /// Expected length
        expected: usize,
        /// Length supplied
        actual: usize,
    },

    /// The same word was supplied twice for one connection
    #[error("Word {0} appears more than once in the connection")]
    DuplicateWordInConnection(WordId),

    /// The clue is not a single whitespace-free token
    #[error("Invalid clue text: {0:?}")]
    InvalidClueText(String),

    /// No connection with this id exists
    #[error("Connection not found: {0}")]
    ConnectionNotFound(ConnectionId),

    /// The connection already carries a clue
    #[error("A clue already exists for connection {0}")]
    ClueAlreadyExists(ConnectionId),

    /// A selection update names a word outside the connection
    #[error("Word {word_id} is not part of connection {connection_id}")]
    WordNotInSelection {
        /// The connection being updated
        connection_id: ConnectionId,
        /// The offending word
        word_id: WordId,
    },

    /// The declared clue word count disagrees with the applied selection
    #[error("Declared count {declared} does not match number of selected words {actual}")]
    SelectionCountMismatch {
        /// Count declared by the caller
        declared: usize,
        /// Count of selected links after applying updates
        actual: usize,
    },

    /// Oracle output could not be parsed into the expected structure
    #[error("Oracle format error: {0}")]
    OracleFormatError(String),

    /// Oracle output invented, dropped or altered a word or id
    #[error("Oracle identity violation: {0}")]
    OracleIdentityViolation(String),

    /// Oracle clue equals one of the input words
    #[error("Oracle clue {0:?} collides with an input word")]
    OracleClueCollision(String),

    /// Oracle guess selected the wrong number of words
    #[error("Oracle selected {actual} words, expected {expected}")]
    OracleSelectionCountMismatch {
        /// Number of words the oracle was asked to select
        expected: usize,
        /// Number of words it selected
        actual: usize,
    },

    /// The oracle failed, hung past its timeout, or could not be reached
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// Generic lookup miss
    #[error("Not found: {0}")]
    NotFound(String),
}

impl PuzzleError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            PuzzleError::InsufficientPool { .. } => "insufficient_pool",
            PuzzleError::LengthMismatch { .. } => "length_mismatch",
            PuzzleError::DuplicateWordInConnection(_) => "duplicate_word_in_connection",
            PuzzleError::InvalidClueText(_) => "invalid_clue_text",
            PuzzleError::ConnectionNotFound(_) => "connection_not_found",
            PuzzleError::ClueAlreadyExists(_) => "clue_already_exists",
            PuzzleError::WordNotInSelection { .. } => "word_not_in_selection",
            PuzzleError::SelectionCountMismatch { .. } => "selection_count_mismatch",
            PuzzleError::OracleFormatError(_) => "oracle_format_error",
            PuzzleError::OracleIdentityViolation(_) => "oracle_identity_violation",
            PuzzleError::OracleClueCollision(_) => "oracle_clue_collision",
            PuzzleError::OracleSelectionCountMismatch { .. } => "oracle_selection_count_mismatch",
            PuzzleError::OracleUnavailable(_) => "oracle_unavailable",
            PuzzleError::NotFound(_) => "not_found",
        }
    }

    /// Whether this error came from verifying or reaching the oracle
    pub fn is_oracle_failure(&self) -> bool {
        matches!(
            self,
            PuzzleError::OracleFormatError(_)
                | PuzzleError::OracleIdentityViolation(_)
                | PuzzleError::OracleClueCollision(_)
                | PuzzleError::OracleSelectionCountMismatch { .. }
                | PuzzleError::OracleUnavailable(_)
        )
    }
}
