//! Linkword Oracle
//!
//! Prompts an LLM for clues and guesses, then parses and verifies what comes
//! back before anything else may act on it.
//!
//! # Architecture
//!
//! ```text
//! Words → PromptOracle → LLM → raw text → parser → verifier → ClueSubmission / guess
//! ```
//!
//! The oracle is untrusted. The parser turns its text into typed responses or
//! an `OracleFormatError`; the verifier re-derives identity, count and
//! clue/word disjointness from the raw output and the input words alone.
//!
//! # Example Usage
//!
//! ```
//! use linkword_domain::traits::TextOracle;
//! use linkword_domain::{Word, WordId};
//! use linkword_llm::MockProvider;
//! use linkword_oracle::{parse_clue_response, verify_clue_response, ClueCollision, PromptOracle};
//!
//! let words = vec![
//!     Word::new(WordId::from_value(1), "golf"),
//!     Word::new(WordId::from_value(2), "budget"),
//! ];
//! let oracle = PromptOracle::new(MockProvider::new(
//!     r#"{"clue": "club", "selected_words": [
//!         {"id": 1, "word": "golf", "selected": true},
//!         {"id": 2, "word": "budget", "selected": false}]}"#,
//! ));
//!
//! let raw = oracle.generate_clue_for_selection(&words).unwrap();
//! let parsed = parse_clue_response(&raw, words.len()).unwrap();
//! let verified = verify_clue_response(&words, parsed, ClueCollision::default()).unwrap();
//! assert_eq!(verified.clue, "club");
//! assert_eq!(verified.selected_count(), 1);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod oracle;
mod parser;
mod prompt;
mod verifier;

pub use config::ClueCollision;
pub use error::OracleError;
pub use oracle::PromptOracle;
pub use parser::{
    parse_clue_response, parse_guess_response, parse_linking_word, ClueEntry, ClueResponse,
    GuessEntry,
};
pub use prompt::{CluePromptBuilder, GuessPromptBuilder, LinkingPromptBuilder};
pub use verifier::{
    verify_clue_response, verify_guess, verify_linking_word, GuessedWord, VerifiedClue,
};
