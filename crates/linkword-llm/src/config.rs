//! Provider configuration

use serde::{Deserialize, Serialize};

/// Which backend generates oracle text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Canned responses, no network
    #[default]
    Mock,
    /// Local Ollama server
    Ollama,
    /// OpenAI Responses API
    OpenAi,
}

/// Settings shared by every provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Backend to use
    pub kind: ProviderKind,

    /// Model name (e.g. "gpt-4o-mini", "llama3")
    pub model: String,

    /// API base URL; each provider has its own default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// API key, required for OpenAI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_output_tokens: u32,

    /// HTTP request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Attempts for transient transport failures
    pub max_retries: u32,

    /// Fixed reply for the mock provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_response: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Mock,
            model: "gpt-4o-mini".to_string(),
            endpoint: None,
            api_key: None,
            temperature: 0.2,
            max_output_tokens: 500,
            request_timeout_secs: 30,
            max_retries: 3,
            mock_response: None,
        }
    }
}

impl ProviderConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature {} out of range [0.0, 2.0]", self.temperature));
        }
        if self.max_output_tokens == 0 {
            return Err("max_output_tokens must be greater than 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".to_string());
        }
        if self.kind == ProviderKind::OpenAi
            && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err("api_key is required for the openai provider".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ProviderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_temperature() {
        let config = ProviderConfig {
            temperature: 3.5,
            ..ProviderConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            kind = "openai"
            model = "gpt-4o-mini"
            api_key = "sk-test"
            temperature = 0.2
        "#;
        let config: ProviderConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.kind, ProviderKind::OpenAi);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.max_output_tokens, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_ollama_kind() {
        let config: ProviderConfig = toml::from_str("kind = \"ollama\"\nmodel = \"llama3\"").unwrap();
        assert_eq!(config.kind, ProviderKind::Ollama);
        assert_eq!(config.model, "llama3");
    }
}
