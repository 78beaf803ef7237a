//! Connection construction

use crate::error::GameError;
use crate::shared::SharedStore;
use linkword_domain::traits::PuzzleStore;
use linkword_domain::{Connection, NewConnection, PuzzleError, Selection, Word};
use rand::Rng;
use tracing::info;

/// Creates connections from dealt words
pub struct ConnectionBuilder<S> {
    store: SharedStore<S>,
}

impl<S: PuzzleStore> ConnectionBuilder<S> {
    /// Create a builder over a shared store
    pub fn new(store: SharedStore<S>) -> Self {
        Self { store }
    }

    /// Create and persist a connection
    ///
    /// One link per word, in the given order. Without an initial pattern
    /// every flag starts unset.
    pub fn create(
        &self,
        words: Vec<Word>,
        initial: Option<Vec<Selection>>,
    ) -> Result<Connection, GameError> {
        let new = NewConnection::new(words, initial)?;
        let connection = self.store.with(|s| s.create_connection(&new))?;
        info!(
            "Created connection {} with {} words",
            connection.id,
            connection.links.len()
        );
        Ok(connection)
    }
}

/// A pattern with exactly `selected_count` selected positions, the rest
/// unselected
pub fn random_pattern(size: usize, selected_count: usize) -> Result<Vec<Selection>, PuzzleError> {
    random_pattern_with(&mut rand::thread_rng(), size, selected_count)
}

/// Like [`random_pattern`], with a caller-supplied generator
pub fn random_pattern_with<R: Rng + ?Sized>(
    rng: &mut R,
    size: usize,
    selected_count: usize,
) -> Result<Vec<Selection>, PuzzleError> {
    if selected_count > size {
        return Err(PuzzleError::LengthMismatch {
            expected: size,
            actual: selected_count,
        });
    }

    let mut pattern = vec![Selection::Unselected; size];
    for index in rand::seq::index::sample(rng, size, selected_count) {
        pattern[index] = Selection::Selected;
    }
    Ok(pattern)
}
