//! Attaching clues to connections

use crate::error::GameError;
use crate::shared::SharedStore;
use linkword_domain::traits::PuzzleStore;
use linkword_domain::{is_valid_clue_text, Clue, ClueSubmission, PuzzleError};
use tracing::{info, warn};

/// Validates clue submissions and attaches them atomically
pub struct ClueValidator<S> {
    store: SharedStore<S>,
}

impl<S: PuzzleStore> ClueValidator<S> {
    /// Create a validator over a shared store
    pub fn new(store: SharedStore<S>) -> Self {
        Self { store }
    }

    /// Attach a clue, applying the submission's flag updates first
    ///
    /// The text check runs here so that obviously bad input never reaches
    /// the store; every other rule runs inside the store transaction. On any
    /// failure nothing is persisted.
    pub fn attach_clue(&self, submission: &ClueSubmission) -> Result<Clue, GameError> {
        if !is_valid_clue_text(&submission.clue_text) {
            return Err(PuzzleError::InvalidClueText(submission.clue_text.clone()).into());
        }

        match self.store.with(|s| s.attach_clue_atomically(submission)) {
            Ok(clue) => {
                info!(
                    "Attached clue {} to connection {} ({} selected)",
                    clue.id, clue.connection_id, clue.clue_word_count
                );
                Ok(clue)
            }
            Err(e) => {
                warn!(
                    "Clue for connection {} rejected: {}",
                    submission.connection_id, e
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkword_domain::{Connection, ConnectionId, NewConnection, SelectionUpdate};
    use linkword_store::SqliteStore;

    fn setup() -> (ClueValidator<SqliteStore>, SharedStore<SqliteStore>, Connection) {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let texts: Vec<String> = (0..9).map(|i| format!("word{}", i)).collect();
        store.insert_words(&texts).unwrap();
        let words = store.sample_words(9).unwrap();
        let connection = store
            .create_connection(&NewConnection::new(words, None).unwrap())
            .unwrap();
        let shared = SharedStore::new(store);
        (ClueValidator::new(shared.clone()), shared, connection)
    }

    fn submission(connection: &Connection, k: usize, clue: &str, declared: usize) -> ClueSubmission {
        ClueSubmission {
            connection_id: connection.id,
            updates: connection
                .links
                .iter()
                .enumerate()
                .map(|(i, l)| SelectionUpdate::new(l.word.id, i < k))
                .collect(),
            clue_text: clue.to_string(),
            declared_count: declared,
        }
    }

    #[test]
    fn test_attach_then_reattach() {
        let (validator, _, connection) = setup();

        let clue = validator
            .attach_clue(&submission(&connection, 4, "rights", 4))
            .unwrap();
        assert_eq!(clue.clue_word_count, 4);

        let err = validator
            .attach_clue(&submission(&connection, 1, "anything", 1))
            .unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&PuzzleError::ClueAlreadyExists(connection.id))
        );
    }

    #[test]
    fn test_count_mismatch_leaves_nothing_behind() {
        let (validator, shared, connection) = setup();

        let err = validator
            .attach_clue(&submission(&connection, 4, "rights", 3))
            .unwrap_err();
        assert!(matches!(
            err.rejection(),
            Some(PuzzleError::SelectionCountMismatch {
                declared: 3,
                actual: 4
            })
        ));

        let fetched = shared
            .with(|s| s.get_connection_by_id(connection.id))
            .unwrap()
            .unwrap();
        assert!(fetched.clue.is_none());
        assert_eq!(fetched.selected_count(), 0);
    }

    #[test]
    fn test_invalid_text_checked_first() {
        let (validator, _, connection) = setup();
        let mut sub = submission(&connection, 1, "two words", 1);
        sub.connection_id = ConnectionId::from_value(999);

        let err = validator.attach_clue(&sub).unwrap_err();
        assert!(matches!(
            err.rejection(),
            Some(PuzzleError::InvalidClueText(_))
        ));
    }
}
