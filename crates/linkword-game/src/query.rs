//! Read-side views of connections and clues

use crate::error::GameError;
use crate::shared::SharedStore;
use linkword_domain::traits::PuzzleStore;
use linkword_domain::{Clue, ClueId, Connection, ConnectionId, PuzzleError, Word, WordLink};
use serde::Serialize;

/// One word of a view, with its flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordView {
    /// Word id
    pub id: i64,
    /// Word text
    pub word: String,
    /// `null` while unset
    pub selected: Option<bool>,
}

impl From<&WordLink> for WordView {
    fn from(link: &WordLink) -> Self {
        Self {
            id: link.word.id.value(),
            word: link.word.text.clone(),
            selected: link.selected.as_option(),
        }
    }
}

impl WordView {
    /// View of a word with a decided flag
    pub fn flagged(word: &Word, selected: bool) -> Self {
        Self {
            id: word.id.value(),
            word: word.text.clone(),
            selected: Some(selected),
        }
    }
}

/// Clue fields shown inside a connection view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClueSummary {
    /// Clue id
    pub id: i64,
    /// Clue text
    pub clue: String,
    /// Number of selected words when the clue was committed
    pub number_of_selected_words: usize,
    /// Creation timestamp (seconds since Unix epoch)
    pub created_at: u64,
}

impl From<&Clue> for ClueSummary {
    fn from(clue: &Clue) -> Self {
        Self {
            id: clue.id.value(),
            clue: clue.text.clone(),
            number_of_selected_words: clue.clue_word_count,
            created_at: clue.created_at,
        }
    }
}

/// A connection with its words and, once clued, its clue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionView {
    /// Connection id
    pub id: i64,
    /// Words in play order
    pub words: Vec<WordView>,
    /// The clue, if attached
    pub clue: Option<ClueSummary>,
}

impl From<&Connection> for ConnectionView {
    fn from(connection: &Connection) -> Self {
        Self {
            id: connection.id.value(),
            words: connection.links.iter().map(WordView::from).collect(),
            clue: connection.clue.as_ref().map(ClueSummary::from),
        }
    }
}

/// A clue with its connection's words resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClueView {
    /// Clue id
    pub id: i64,
    /// Owning connection id
    pub connection_id: i64,
    /// Clue text
    pub clue: String,
    /// Number of selected words when the clue was committed
    pub number_of_selected_words: usize,
    /// Creation timestamp (seconds since Unix epoch)
    pub created_at: u64,
    /// Words in play order
    pub words: Vec<WordView>,
}

impl ClueView {
    fn assemble(clue: &Clue, connection: &Connection) -> Self {
        Self {
            id: clue.id.value(),
            connection_id: connection.id.value(),
            clue: clue.text.clone(),
            number_of_selected_words: clue.clue_word_count,
            created_at: clue.created_at,
            words: connection.links.iter().map(WordView::from).collect(),
        }
    }
}

/// Read-only projections of stored connections and clues
pub struct QueryService<S> {
    store: SharedStore<S>,
}

impl<S: PuzzleStore> QueryService<S> {
    /// Create a query service over a shared store
    pub fn new(store: SharedStore<S>) -> Self {
        Self { store }
    }

    /// A connection with all its links and clue
    pub fn get_connection(&self, id: ConnectionId) -> Result<ConnectionView, GameError> {
        let connection = self
            .store
            .with(|s| s.get_connection_by_id(id))?
            .ok_or_else(|| PuzzleError::NotFound(format!("connection {}", id)))?;
        Ok(ConnectionView::from(&connection))
    }

    /// A clue with its owning connection's links
    pub fn get_clue(&self, id: ClueId) -> Result<ClueView, GameError> {
        let (clue, connection) = self.store.with(|s| {
            let Some(clue) = s.get_clue_by_id(id)? else {
                return Ok(None);
            };
            let connection = s.get_connection_by_id(clue.connection_id)?;
            Ok(connection.map(|c| (clue, c)))
        })?
        .ok_or_else(|| PuzzleError::NotFound(format!("clue {}", id)))?;

        Ok(ClueView::assemble(&clue, &connection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkword_domain::{ClueSubmission, NewConnection, Selection, SelectionUpdate, WordId};
    use linkword_store::SqliteStore;

    #[test]
    fn test_word_view_serializes_unset_as_null() {
        let link = WordLink {
            word: Word::new(WordId::from_value(5), "pen"),
            selected: Selection::Unset,
        };
        let json = serde_json::to_value(WordView::from(&link)).unwrap();
        assert_eq!(json, serde_json::json!({"id": 5, "word": "pen", "selected": null}));
    }

    #[test]
    fn test_connection_and_clue_views() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        store.insert_words(&["golf", "league", "pen"]).unwrap();
        let words = store.sample_words(3).unwrap();
        let connection = store
            .create_connection(&NewConnection::new(words, None).unwrap())
            .unwrap();
        let shared = SharedStore::new(store);
        let query = QueryService::new(shared.clone());

        let view = query.get_connection(connection.id).unwrap();
        assert_eq!(view.words.len(), 3);
        assert!(view.clue.is_none());

        let submission = ClueSubmission {
            connection_id: connection.id,
            updates: vec![SelectionUpdate::new(connection.links[1].word.id, true)],
            clue_text: "sport".to_string(),
            declared_count: 1,
        };
        let clue = shared
            .with(|s| s.attach_clue_atomically(&submission))
            .unwrap();

        let view = query.get_connection(connection.id).unwrap();
        assert_eq!(view.clue.as_ref().unwrap().clue, "sport");
        assert_eq!(view.words[1].selected, Some(true));
        assert_eq!(view.words[0].selected, None);

        let clue_view = query.get_clue(clue.id).unwrap();
        assert_eq!(clue_view.connection_id, connection.id.value());
        assert_eq!(clue_view.number_of_selected_words, 1);
        assert_eq!(clue_view.words, view.words);
    }

    #[test]
    fn test_missing_entities() {
        let query = QueryService::new(SharedStore::new(SqliteStore::new(":memory:").unwrap()));

        let err = query.get_connection(ConnectionId::from_value(1)).unwrap_err();
        assert_eq!(err.kind(), "not_found");
        let err = query.get_clue(ClueId::from_value(1)).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}
