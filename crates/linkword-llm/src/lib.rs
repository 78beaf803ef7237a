//! Linkword LLM Provider Layer
//!
//! Pluggable text-generation backends behind the `LlmProvider` trait from
//! `linkword-domain`. The oracle crate builds prompts on top of these and
//! never trusts what comes back.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `OpenAiProvider`: OpenAI Responses API
//!
//! # Examples
//!
//! ```
//! use linkword_llm::MockProvider;
//! use linkword_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod ollama;
pub mod openai;

use linkword_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use config::{ProviderConfig, ProviderKind};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider is misconfigured
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Drive an async provider call to completion from synchronous code
///
/// The oracle calls providers from a blocking worker thread, so a private
/// current-thread runtime is enough.
pub(crate) fn block_on<F, T>(future: F) -> Result<T, LlmError>
where
    F: Future<Output = Result<T, LlmError>>,
{
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?
        .block_on(future)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network calls.
/// Queued responses are served first, in order; then per-prompt responses;
/// then the default.
///
/// # Examples
///
/// ```
/// use linkword_llm::MockProvider;
/// use linkword_domain::traits::LlmProvider;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt").unwrap(), "Fixed response");
///
/// // Queued responses
/// let provider = MockProvider::default();
/// provider.push_response("first");
/// provider.push_response("second");
/// assert_eq!(provider.generate("a").unwrap(), "first");
/// assert_eq!(provider.generate("b").unwrap(), "second");
/// assert_eq!(provider.generate("c").unwrap(), "Default mock response");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    queue: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), response.into());
    }

    /// Queue a response for the next call, whatever its prompt
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.queue).push_back(response.into());
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        lock(&self.prompts).clear();
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), "ERROR".to_string());
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        lock(&self.prompts).push(prompt.to_string());

        if let Some(queued) = lock(&self.queue).pop_front() {
            return Ok(queued);
        }

        // Check if we have a specific response for this prompt
        let responses = lock(&self.responses);
        if let Some(response) = responses.get(prompt) {
            if response == "ERROR" {
                return Err(LlmError::Other("Mock error".to_string()));
            }
            return Ok(response.clone());
        }

        // Return default response
        Ok(self.default_response.clone())
    }
}

/// Any configured provider, selected at startup
pub enum Provider {
    /// Canned responses
    Mock(MockProvider),
    /// Local Ollama server
    Ollama(OllamaProvider),
    /// OpenAI Responses API
    OpenAi(OpenAiProvider),
}

impl Provider {
    /// Build the provider named by the configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self, LlmError> {
        config.validate().map_err(LlmError::Config)?;

        let provider = match config.kind {
            ProviderKind::Mock => Provider::Mock(MockProvider::new(
                config.mock_response.clone().unwrap_or_default(),
            )),
            ProviderKind::Ollama => Provider::Ollama(OllamaProvider::from_config(config)),
            ProviderKind::OpenAi => Provider::OpenAi(OpenAiProvider::from_config(config)?),
        };
        Ok(provider)
    }

    /// Short provider name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Mock(_) => "mock",
            Provider::Ollama(_) => "ollama",
            Provider::OpenAi(_) => "openai",
        }
    }
}

impl LlmProviderTrait for Provider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        match self {
            Provider::Mock(p) => p.generate(prompt),
            Provider::Ollama(p) => LlmProviderTrait::generate(p, prompt),
            Provider::OpenAi(p) => LlmProviderTrait::generate(p, prompt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("hello").unwrap(), "world");
        assert_eq!(provider.generate("foo").unwrap(), "bar");
        assert_eq!(provider.generate("unknown").unwrap(), "Default mock response");
    }

    #[test]
    fn test_mock_provider_queue_takes_priority() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.push_response("queued");

        assert_eq!(provider.generate("hello").unwrap(), "queued");
        assert_eq!(provider.generate("hello").unwrap(), "world");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1").unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.generate("prompt2").unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.prompts(), vec!["prompt1", "prompt2"]);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.generate("bad prompt");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[test]
    fn test_mock_provider_clone() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test").unwrap();

        // Both should share the same call count due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_provider_from_mock_config() {
        let config = ProviderConfig {
            kind: ProviderKind::Mock,
            mock_response: Some("[]".to_string()),
            ..ProviderConfig::default()
        };
        let provider = Provider::from_config(&config).unwrap();
        assert_eq!(provider.name(), "mock");
        assert_eq!(provider.generate("anything").unwrap(), "[]");
    }

    #[test]
    fn test_openai_without_key_is_rejected() {
        let config = ProviderConfig {
            kind: ProviderKind::OpenAi,
            api_key: None,
            ..ProviderConfig::default()
        };
        assert!(matches!(
            Provider::from_config(&config),
            Err(LlmError::Config(_))
        ));
    }
}
