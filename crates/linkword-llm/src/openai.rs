//! OpenAI Responses API provider
//!
//! Sends a single non-streaming request per prompt and concatenates the
//! `output_text` parts of the reply.

use crate::{LlmError, ProviderConfig};
use linkword_domain::traits::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default OpenAI API base URL
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// System instructions sent with every request
pub const DEFAULT_INSTRUCTIONS: &str = "You are the oracle for a word connection game.";

/// OpenAI provider using the `/v1/responses` endpoint
pub struct OpenAiProvider {
    endpoint: String,
    api_key: String,
    model: String,
    instructions: String,
    temperature: f32,
    max_output_tokens: u32,
    max_retries: u32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesReply {
    fn output_text(&self) -> String {
        self.output
            .iter()
            .flat_map(|item| item.content.iter())
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

impl OpenAiProvider {
    /// Create a provider from shared provider settings
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` when no API key is configured.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::Config("OpenAI provider requires an api_key".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key,
            model: config.model.clone(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            max_retries: config.max_retries.max(1),
            client,
        })
    }

    /// Replace the system instructions
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    fn url(&self) -> String {
        format!("{}/v1/responses", self.endpoint.trim_end_matches('/'))
    }

    /// Generate text for a prompt
    ///
    /// Transport failures and 5xx replies are retried with exponential
    /// backoff. 404 and 429 are reported immediately.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ResponsesRequest {
            model: &self.model,
            instructions: &self.instructions,
            input: prompt,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        };
        let url = self.url();

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            let sent = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            match sent {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let reply: ResponsesReply = response.json().await.map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        })?;
                        let text = reply.output_text();
                        if text.trim().is_empty() {
                            return Err(LlmError::InvalidResponse(
                                "Response contained no output_text".to_string(),
                            ));
                        }
                        return Ok(text);
                    }

                    match status {
                        reqwest::StatusCode::NOT_FOUND => {
                            return Err(LlmError::ModelNotAvailable(self.model.clone()))
                        }
                        reqwest::StatusCode::TOO_MANY_REQUESTS => {
                            return Err(LlmError::RateLimitExceeded)
                        }
                        _ => {}
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    let err = LlmError::Communication(format!("HTTP {}: {}", status, error_text));
                    if status.is_client_error() {
                        return Err(err);
                    }
                    last_error = Some(err);
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                debug!("OpenAI attempt {} failed, retrying in {:?}", attempts, delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

impl LlmProviderTrait for OpenAiProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        crate::block_on(OpenAiProvider::generate(self, prompt))
    }
}
