//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{
    Clue, ClueId, ClueSubmission, Connection, ConnectionId, NewConnection, PuzzleError, Word,
    WordId, WordLink,
};

/// Classification of store failures
///
/// Callers may retry only failures that are not rule violations.
pub trait StoreFailure: std::error::Error {
    /// The rule violation behind this failure, if that is what it is
    fn rejection(&self) -> Option<&PuzzleError>;

    /// Whether the operation can be retried unchanged (lock contention,
    /// concurrent writers)
    fn is_retryable(&self) -> bool;
}

/// Trait for persisting words, connections and clues
///
/// Implemented by the infrastructure layer (linkword-store)
pub trait PuzzleStore {
    /// Error type for store operations
    type Error: StoreFailure;

    /// Fetch words by id, skipping ids that do not exist
    fn get_words_by_ids(&self, ids: &[WordId]) -> Result<Vec<Word>, Self::Error>;

    /// Insert a batch of words, returning how many were new
    ///
    /// Blank entries and case-insensitive duplicates are skipped silently.
    fn insert_words<S: AsRef<str>>(&mut self, batch: &[S]) -> Result<usize, Self::Error>;

    /// Draw `k` distinct words uniformly at random
    ///
    /// Fails with [`PuzzleError::InsufficientPool`] when the pool is too small.
    fn sample_words(&self, k: usize) -> Result<Vec<Word>, Self::Error>;

    /// Number of words in the pool
    fn word_count(&self) -> Result<usize, Self::Error>;

    /// Persist a validated connection with all of its links
    fn create_connection(&mut self, connection: &NewConnection) -> Result<Connection, Self::Error>;

    /// Get a connection with its links and clue
    fn get_connection_by_id(&self, id: ConnectionId) -> Result<Option<Connection>, Self::Error>;

    /// Connections a word takes part in, via the link table
    fn connections_for_word(&self, word_id: WordId) -> Result<Vec<ConnectionId>, Self::Error>;

    /// Apply a clue submission as one transaction
    ///
    /// The flag updates and the clue insert commit together or not at all,
    /// and concurrent attaches to the same connection are serialized so that
    /// at most one succeeds.
    fn attach_clue_atomically(&mut self, submission: &ClueSubmission) -> Result<Clue, Self::Error>;

    /// Get a clue by id
    fn get_clue_by_id(&self, id: ClueId) -> Result<Option<Clue>, Self::Error>;
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (linkword-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;
}

/// The text-generation oracle used to invent clues and guess selections
///
/// Output is untrusted free text; it must be parsed and verified before use.
pub trait TextOracle {
    /// Error type for oracle calls
    type Error;

    /// Ask for a clue and a selection over the given words
    fn generate_clue_for_selection(&self, words: &[Word]) -> Result<String, Self::Error>;

    /// Ask for one word linking the selected links of a connection
    fn generate_linking_word(&self, links: &[WordLink]) -> Result<String, Self::Error>;

    /// Ask for exactly `count_to_select` words matching the clue
    fn generate_guess_for_clue(
        &self,
        words: &[Word],
        clue: &str,
        count_to_select: usize,
    ) -> Result<String, Self::Error>;
}
