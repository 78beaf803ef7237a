//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files including bind address, database path,
//! API key, game settings and the oracle provider. A few settings can be
//! overridden from the environment.

use linkword_game::GameConfig;
use linkword_llm::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the static API key
pub const API_KEY_ENV: &str = "LINKWORD_API_KEY";

/// Environment variable holding the OpenAI key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the database path
pub const DATABASE_ENV: &str = "LINKWORD_DATABASE";

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A section failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Static key expected in the `x-api-key` header
    #[serde(default)]
    pub api_key: String,

    /// Default log filter when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Game settings
    #[serde(default)]
    pub game: GameConfig,

    /// Oracle provider settings
    #[serde(default)]
    pub oracle: ProviderConfig,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8080
}

fn default_database_path() -> PathBuf {
    PathBuf::from("linkword.db")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServerConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&contents)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from a variable lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.api_key = key;
        }
        if let Some(path) = lookup(DATABASE_ENV).filter(|v| !v.is_empty()) {
            self.database_path = PathBuf::from(path);
        }
        if self.oracle.api_key.is_none() {
            self.oracle.api_key = lookup(OPENAI_API_KEY_ENV).filter(|v| !v.is_empty());
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingField("api_key".to_string()));
        }
        self.game
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("[game] {}", e)))?;
        self.oracle
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("[oracle] {}", e)))?;
        Ok(())
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            database_path: PathBuf::from(":memory:"),
            api_key: "test-key-do-not-use-in-production".to_string(),
            log_level: default_log_level(),
            game: GameConfig::default(),
            oracle: ProviderConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
