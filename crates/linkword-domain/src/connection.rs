//! Connections - one play instance of the puzzle
//!
//! A connection is an ordered, fixed-length sequence of word-links. The only
//! way to obtain one is through [`NewConnection`], which checks the word set
//! before the store persists it.

use crate::{Clue, PuzzleError, Word, WordId};
use std::collections::HashSet;
use std::fmt;

/// Number of words in a connection for the default game variant
pub const DEFAULT_CONNECTION_SIZE: usize = 9;

/// Identifier of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(i64);

impl ConnectionId {
    /// Create a ConnectionId from a raw value
    pub fn from_value(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tri-state selection flag of a word-link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    /// The word belongs to the clued group
    Selected,
    /// The word is a decoy
    Unselected,
    /// Nobody has decided yet
    #[default]
    Unset,
}

impl Selection {
    /// Whether the flag is `true`
    pub fn is_selected(self) -> bool {
        matches!(self, Selection::Selected)
    }

    /// Nullable boolean form, as stored and serialized
    pub fn as_option(self) -> Option<bool> {
        match self {
            Selection::Selected => Some(true),
            Selection::Unselected => Some(false),
            Selection::Unset => None,
        }
    }
}

impl From<Option<bool>> for Selection {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Selection::Selected,
            Some(false) => Selection::Unselected,
            None => Selection::Unset,
        }
    }
}

impl From<bool> for Selection {
    fn from(value: bool) -> Self {
        Selection::from(Some(value))
    }
}

/// Association between a word and a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordLink {
    /// The linked word
    pub word: Word,

    /// Selection flag for this word in this connection
    pub selected: Selection,
}

/// A persisted connection with its links and, once clued, its clue
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Unique identifier
    pub id: ConnectionId,

    /// Word-links in play order
    pub links: Vec<WordLink>,

    /// The clue, if one has been attached
    pub clue: Option<Clue>,
}

impl Connection {
    /// Number of links whose flag is `true`
    pub fn selected_count(&self) -> usize {
        self.links.iter().filter(|l| l.selected.is_selected()).count()
    }

    /// Whether the word is linked to this connection
    pub fn contains_word(&self, word_id: WordId) -> bool {
        self.links.iter().any(|l| l.word.id == word_id)
    }

    /// The link for a word, if present
    pub fn link(&self, word_id: WordId) -> Option<&WordLink> {
        self.links.iter().find(|l| l.word.id == word_id)
    }

    /// Words in play order
    pub fn words(&self) -> Vec<Word> {
        self.links.iter().map(|l| l.word.clone()).collect()
    }

    /// Whether a clue has been attached
    pub fn is_clued(&self) -> bool {
        self.clue.is_some()
    }
}

/// A validated, not yet persisted connection
///
/// Construction fails if the initial pattern length differs from the word
/// count, or if a word appears twice.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConnection {
    links: Vec<WordLink>,
}

impl NewConnection {
    /// Pair each word with its initial flag
    ///
    /// Without an initial pattern every flag starts [`Selection::Unset`].
    ///
    /// # Examples
    ///
    /// ```
    /// use linkword_domain::{NewConnection, Selection, Word, WordId};
    ///
    /// let words = vec![
    ///     Word::new(WordId::from_value(1), "golf"),
    ///     Word::new(WordId::from_value(2), "budget"),
    /// ];
    /// let conn = NewConnection::new(words, None).unwrap();
    /// assert!(conn.links().iter().all(|l| l.selected == Selection::Unset));
    /// ```
    pub fn new(words: Vec<Word>, initial: Option<Vec<Selection>>) -> Result<Self, PuzzleError> {
        let flags = match initial {
            Some(flags) => {
                if flags.len() != words.len() {
                    return Err(PuzzleError::LengthMismatch {
                        expected: words.len(),
                        actual: flags.len(),
                    });
                }
                flags
            }
            None => vec![Selection::Unset; words.len()],
        };

        let mut seen = HashSet::with_capacity(words.len());
        for word in &words {
            if !seen.insert(word.id) {
                return Err(PuzzleError::DuplicateWordInConnection(word.id));
            }
        }

        let links = words
            .into_iter()
            .zip(flags)
            .map(|(word, selected)| WordLink { word, selected })
            .collect();

        Ok(Self { links })
    }

    /// Links in play order
    pub fn links(&self) -> &[WordLink] {
        &self.links
    }

    /// Number of words
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether there are no words
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
