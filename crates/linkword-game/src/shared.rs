//! Store handle shared by the services

use crate::error::GameError;
use linkword_domain::traits::PuzzleStore;
use std::sync::{Arc, Mutex};

/// One store, shared by every service of a game
pub struct SharedStore<S> {
    inner: Arc<Mutex<S>>,
}

impl<S: PuzzleStore> SharedStore<S> {
    /// Wrap a store
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run one store operation under the lock
    ///
    /// The guard never outlives the closure, so callers in async code do not
    /// hold it across an await.
    pub fn with<T>(&self, f: impl FnOnce(&mut S) -> Result<T, S::Error>) -> Result<T, GameError> {
        let mut store = self
            .inner
            .lock()
            .map_err(|e| GameError::Store(format!("Store lock error: {}", e)))?;
        f(&mut store).map_err(GameError::from_store)
    }
}

impl<S> Clone for SharedStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
