//! Error types for the game services

use linkword_domain::traits::StoreFailure;
use linkword_domain::PuzzleError;
use thiserror::Error;

/// Errors that can occur in a game operation
#[derive(Error, Debug)]
pub enum GameError {
    /// A puzzle rule rejected the operation, or the oracle failed
    #[error(transparent)]
    Rejected(#[from] PuzzleError),

    /// Concurrent writers collided; the operation may be retried
    #[error("Store conflict: {0}")]
    Conflict(String),

    /// The store failed for a reason unrelated to the rules
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GameError {
    /// Classify a store failure
    pub fn from_store<E: StoreFailure>(err: E) -> Self {
        if let Some(rejection) = err.rejection() {
            return GameError::Rejected(rejection.clone());
        }
        if err.is_retryable() {
            GameError::Conflict(err.to_string())
        } else {
            GameError::Store(err.to_string())
        }
    }

    /// The rule violation behind this error, if any
    pub fn rejection(&self) -> Option<&PuzzleError> {
        match self {
            GameError::Rejected(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the caller may retry unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::Conflict(_))
    }

    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::Rejected(e) => e.kind(),
            GameError::Conflict(_) => "store_conflict",
            GameError::Store(_) => "store_error",
            GameError::Config(_) => "config_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    enum FakeStoreError {
        Rejected(PuzzleError),
        Busy,
        Broken,
    }

    impl fmt::Display for FakeStoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    impl std::error::Error for FakeStoreError {}

    impl StoreFailure for FakeStoreError {
        fn rejection(&self) -> Option<&PuzzleError> {
            match self {
                FakeStoreError::Rejected(e) => Some(e),
                _ => None,
            }
        }

        fn is_retryable(&self) -> bool {
            matches!(self, FakeStoreError::Busy)
        }
    }

    #[test]
    fn test_store_failures_are_classified() {
        let rejected = GameError::from_store(FakeStoreError::Rejected(PuzzleError::NotFound(
            "word 3".to_string(),
        )));
        assert_eq!(rejected.kind(), "not_found");
        assert!(!rejected.is_retryable());

        let busy = GameError::from_store(FakeStoreError::Busy);
        assert!(busy.is_retryable());
        assert_eq!(busy.kind(), "store_conflict");

        let broken = GameError::from_store(FakeStoreError::Broken);
        assert!(matches!(broken, GameError::Store(_)));
        assert!(broken.rejection().is_none());
    }
}
