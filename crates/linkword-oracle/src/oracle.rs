//! Text oracle backed by an LLM provider

use crate::error::OracleError;
use crate::prompt::{CluePromptBuilder, GuessPromptBuilder, LinkingPromptBuilder};
use linkword_domain::traits::{LlmProvider, TextOracle};
use linkword_domain::{Word, WordLink};
use tracing::debug;

/// Builds prompts and forwards them to an [`LlmProvider`]
///
/// Returns the raw text untouched; callers parse and verify it.
pub struct PromptOracle<L: LlmProvider> {
    llm_provider: L,
}

impl<L> PromptOracle<L>
where
    L: LlmProvider,
    L::Error: std::fmt::Display,
{
    /// Create a new oracle around a provider
    pub fn new(llm_provider: L) -> Self {
        Self { llm_provider }
    }

    /// The wrapped provider
    pub fn provider(&self) -> &L {
        &self.llm_provider
    }

    fn call_llm(&self, prompt: &str) -> Result<String, OracleError> {
        debug!("Prompt length: {} chars", prompt.len());

        let response = self
            .llm_provider
            .generate(prompt)
            .map_err(|e| OracleError::Llm(e.to_string()))?;

        if response.trim().is_empty() {
            return Err(OracleError::EmptyResponse);
        }

        debug!("LLM response length: {} chars", response.len());
        debug!("LLM raw response: {}", response);
        Ok(response)
    }
}

impl<L> TextOracle for PromptOracle<L>
where
    L: LlmProvider,
    L::Error: std::fmt::Display,
{
    type Error = OracleError;

    fn generate_clue_for_selection(&self, words: &[Word]) -> Result<String, Self::Error> {
        self.call_llm(&CluePromptBuilder::new(words).build())
    }

    fn generate_linking_word(&self, links: &[WordLink]) -> Result<String, Self::Error> {
        self.call_llm(&LinkingPromptBuilder::new(links).build())
    }

    fn generate_guess_for_clue(
        &self,
        words: &[Word],
        clue: &str,
        count_to_select: usize,
    ) -> Result<String, Self::Error> {
        self.call_llm(&GuessPromptBuilder::new(words, clue, count_to_select).build())
    }
}
