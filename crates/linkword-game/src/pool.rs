//! The word pool: every playable word

use crate::error::GameError;
use crate::shared::SharedStore;
use linkword_domain::traits::PuzzleStore;
use linkword_domain::Word;
use tracing::{debug, info};

/// Uniqueness-preserving insertion and uniform sampling over the pool
pub struct WordPool<S> {
    store: SharedStore<S>,
}

impl<S: PuzzleStore> WordPool<S> {
    /// Create a pool over a shared store
    pub fn new(store: SharedStore<S>) -> Self {
        Self { store }
    }

    /// Add one word
    ///
    /// Returns `false` when the text is blank or already in the pool in any
    /// casing.
    pub fn add(&self, text: &str) -> Result<bool, GameError> {
        let added = self.store.with(|s| s.insert_words(&[text]))?;
        Ok(added == 1)
    }

    /// Add a batch of words, returning how many were new
    pub fn add_batch<T: AsRef<str>>(&self, batch: &[T]) -> Result<usize, GameError> {
        let added = self.store.with(|s| s.insert_words(batch))?;
        info!("Added {} of {} words to the pool", added, batch.len());
        Ok(added)
    }

    /// Draw `k` distinct words uniformly at random
    pub fn sample(&self, k: usize) -> Result<Vec<Word>, GameError> {
        debug!("Sampling {} words", k);
        self.store.with(|s| s.sample_words(k))
    }

    /// Number of words in the pool
    pub fn size(&self) -> Result<usize, GameError> {
        self.store.with(|s| s.word_count())
    }
}
