//! Linkword Domain Layer
//!
//! This crate contains the data model and rules of the word-connection puzzle.
//! Its only external dependency is `thiserror` for the shared error taxonomy;
//! everything else here is pure logic that the infrastructure crates build on.
//!
//! ## Key Concepts
//!
//! - **Word**: an opaque, case-insensitively unique string in the pool
//! - **Connection**: one puzzle instance, a fixed ordered set of word-links
//! - **Word-link**: the association joining a word to a connection, carrying
//!   the tri-state `selected` flag
//! - **Clue**: a single-token hint attached at most once to a connection
//!
//! ## Architecture
//!
//! - Pure business rules only (clue text, connection construction, clue
//!   attachment planning)
//! - Trait definitions for the store and the text-generation oracle
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clue;
pub mod connection;
pub mod error;
pub mod traits;
pub mod word;

// Re-exports for convenience
pub use clue::{is_valid_clue_text, Clue, ClueAttachment, ClueId, ClueSubmission, SelectionUpdate};
pub use connection::{Connection, ConnectionId, NewConnection, Selection, WordLink, DEFAULT_CONNECTION_SIZE};
pub use error::PuzzleError;
pub use word::{normalize_word_text, word_key, Word, WordId};
