//! Error types for the oracle

use linkword_domain::PuzzleError;
use thiserror::Error;

/// Errors raised while calling the text-generation backend
///
/// Verification failures are not here; they are [`PuzzleError`] kinds
/// returned by the pure verifier.
#[derive(Error, Debug)]
pub enum OracleError {
    /// The LLM provider failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// The provider answered with nothing
    #[error("Empty response from LLM")]
    EmptyResponse,
}

impl From<OracleError> for PuzzleError {
    fn from(e: OracleError) -> Self {
        PuzzleError::OracleUnavailable(e.to_string())
    }
}
